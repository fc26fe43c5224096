pub mod annotate;
pub mod extractor;
pub mod manager;
pub mod scripts;

pub use annotate::{annotate, AnnotateOptions, Annotation};
pub use extractor::{clear_live_page, mark_live_page, remove_live_overlays, PagePass};
pub use manager::BrowserManager;

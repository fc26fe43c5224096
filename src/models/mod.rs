pub mod requests;
pub mod responses;
pub mod viewport;

pub use requests::*;
pub use responses::*;
pub use viewport::*;

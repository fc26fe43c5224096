pub mod api;
pub mod browser;
pub mod config;
pub mod dom;
pub mod error;
pub mod marker;
pub mod models;

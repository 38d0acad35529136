//! Web form front end: collect location/time fields, classify, render the result.

pub mod config;
pub mod render;
pub mod routes;

pub use config::Args;
pub use routes::configure;

//! Application initialization and resource setup.
//!
//! - HTTP client
//! - Logger (plain or JSON lines)

mod client;
mod logger;

pub use client::init_client;
pub use logger::init_logger_with;

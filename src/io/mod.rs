//! Network I/O.
//!
//! - [`http`] - The HTTP intake that validates submissions and hands them to the worker queue

pub mod http;

pub use http::router;

pub mod config;
pub mod content;
pub mod db;
pub mod domain;
pub mod paths;
pub mod session;
pub mod speech;
pub mod srs;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

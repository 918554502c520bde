pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod storage;

pub use domain::*;
pub use storage::Store;

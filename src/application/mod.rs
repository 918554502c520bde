// Application layer - use cases on top of the store.
// Input validation lives here so rejected requests never reach the write queue.

pub mod error;
mod service;
pub mod validation;

pub use error::*;
pub use service::*;

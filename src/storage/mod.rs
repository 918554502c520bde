mod store;

pub use store::*;

/// File name used when no data path is configured.
pub const DEFAULT_DATA_FILE: &str = "db.json";

mod document;
mod expense;
mod ledger;
mod money;
mod party;
mod settings;
mod transaction;

pub use document::*;
pub use expense::*;
pub use ledger::*;
pub use money::*;
pub use party::*;
pub use settings::*;
pub use transaction::*;

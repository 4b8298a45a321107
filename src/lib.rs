pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod hash;
pub mod logging;
pub mod store;

pub use config::Config;
pub use diff::{diff, DiffLine, DiffStats, EditScript, LineChange};
pub use error::{StoreError, StoreResult};
pub use store::{Commit, Comparison, History, PromptStore, PromptSummary};

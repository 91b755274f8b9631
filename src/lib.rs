pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod meta;
pub mod remote;
pub mod session;
pub mod transfer;

pub use error::SyncError;
pub use remote::MkdirOutcome;

//! Command implementations for the `promptvc` binary

pub mod checkout;
pub mod commit;
pub mod diff;
pub mod display;
pub mod list;
pub mod log;
pub mod status;
pub mod tag;

//! Platform abstraction facilities

pub mod process;
pub mod signal;

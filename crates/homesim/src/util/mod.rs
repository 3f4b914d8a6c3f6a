//! Shared helpers for the command line front end

pub mod format;
pub mod io;

pub use format::{format_compact_currency, format_currency, format_percentage};
pub use io::atomic_write;

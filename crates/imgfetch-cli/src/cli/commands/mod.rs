//! CLI command handlers, one file per command.

mod clear;
mod completions;
mod get;
mod inspect;
mod key;
mod prefetch;

pub use clear::run_clear;
pub use completions::run_completions;
pub use get::run_get;
pub use inspect::run_inspect;
pub use key::run_key;
pub use prefetch::run_prefetch;

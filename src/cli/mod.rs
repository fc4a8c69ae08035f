//! CLI command handling

pub mod codec;
pub mod invoke;
pub mod output;

pub use codec::*;
pub use invoke::*;
pub use output::*;

//! CLI command handling

pub mod classify;
pub mod input;
pub mod output;
pub mod replay;

pub use classify::*;
pub use input::*;
pub use output::*;
pub use replay::*;

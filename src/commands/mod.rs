//! Command implementations for ecoscore CLI

mod analyze;
mod misc;

pub use analyze::*;
pub use misc::*;

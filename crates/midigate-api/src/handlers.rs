//! Request handlers.

pub mod health;
pub mod relay;
pub mod transcribe;

pub use health::*;
pub use relay::*;
pub use transcribe::*;

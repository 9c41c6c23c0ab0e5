//! Built-in tools.

mod clock;
mod echo;

pub use clock::ClockTool;
pub use echo::EchoTool;

//! TUI state

mod input;
mod scroll;

pub use input::InputState;
pub use scroll::ScrollState;

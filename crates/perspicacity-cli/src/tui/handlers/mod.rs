//! Event handlers for the App
//!
//! Each file adds `impl App` methods for one concern.

mod commands;
mod effects;
mod keyboard;
mod mouse;
mod rendering;
mod turns;

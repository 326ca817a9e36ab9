//! Terminal UI

mod app;
mod components;
mod handlers;
mod markup;
mod state;
mod theme;
mod transcript;
mod utils;

pub use app::App;

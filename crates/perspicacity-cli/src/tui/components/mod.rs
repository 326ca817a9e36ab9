//! UI components: status bar, toasts and popups

pub mod popup;
pub mod status_bar;
pub mod toast;

pub use popup::{render_popup, Popup};
pub use status_bar::render_status_bar;
pub use toast::{render_toasts, Toast, ToastQueue};

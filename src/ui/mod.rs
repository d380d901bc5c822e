//! Terminal rendering: shared components, the color theme and the doctype views.

pub mod components;
pub mod theme;
mod views;

pub use components::{
    render_context_help, HintContext, Notification, NotificationManager, NotificationType,
    Spinner,
};
pub use theme::{init_theme, theme, Theme};
pub use views::{DoctypeView, Fetch, ViewAction};

//! Reusable UI components.

mod help_bar;
mod loading;
mod multiselect;
mod notification;
mod popup;

pub use help_bar::{render_context_help, HintContext};
pub use loading::Spinner;
pub use multiselect::{MultiSelect, SelectItem};
pub use notification::{Notification, NotificationManager, NotificationType};
pub use popup::centered_rect;

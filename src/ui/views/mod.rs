//! Application views.

mod list;

pub use list::{DoctypeView, Fetch, ViewAction};

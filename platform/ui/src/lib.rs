//! Front-end plumbing shared by every page.
//!
//! - [`NotificationCenter`]: transient toast messages with a lifetime.
//! - [`ErrorBoundary`]: turns a failing render into a fallback screen.
//! - [`ViewScope`]: ties in-flight requests to the lifetime of a page.
//! - [`LoadingState`]: spinner while a page waits on data.

mod boundary;
mod loading;
mod notify;
mod scope;

pub use boundary::{CaughtError, ErrorBoundary};
pub use loading::LoadingState;
pub use notify::{
    DEFAULT_DURATION, EXIT_WINDOW, Notification, NotificationCenter, NotificationKind,
    render_stack,
};
pub use scope::ViewScope;

//! HR pages.
//!
//! Each page owns its data and a [`platform_ui::ViewScope`]; services come in
//! through an explicit [`AppContext`] rather than ambient lookups.

pub mod dashboard;
pub mod hierarchy;
pub mod team;

use platform_api::ApiClient;
use platform_authn::SessionStore;
use platform_ui::NotificationCenter;

pub use dashboard::{ClockError, Dashboard, DashboardSummary};
pub use hierarchy::{Hierarchy, OrgNode, build_forest};
pub use team::{NewMember, TeamDirectory};

/// Services shared by every page for the lifetime of the application.
#[derive(Clone)]
pub struct AppContext {
    pub api: ApiClient,
    pub session: SessionStore,
    pub notifications: NotificationCenter,
}

impl AppContext {
    pub fn new(api: ApiClient, session: SessionStore, notifications: NotificationCenter) -> Self {
        Self {
            api,
            session,
            notifications,
        }
    }
}

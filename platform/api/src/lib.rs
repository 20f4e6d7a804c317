//! REST client for the PeoplePulse API.
//!
//! One [`ApiClient`] per application; resource groups hang off it as cheap
//! borrowed handles (`client.employees().list()`). Every call is a single
//! attempt and surfaces failures as [`ApiError`].

mod client;
mod resources;
pub mod schema;
mod timestamp;

use std::sync::Arc;

use thiserror::Error;

pub use client::ApiClient;
pub use resources::{Auth, Collection};
pub use schema::{
    Attendance, DashboardStats, Employee, EmployeeRef, LoginResponse, OnboardingTask, Performance,
    RecentActivity, Role, TopPerformer, User,
};

/// Shared client result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error, Clone)]
pub enum ApiError {
    /// Non-2xx response. `message` is the server's `message` field when the
    /// body carried one.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(Arc<reqwest::Error>),
    #[error("failed to decode {resource} payload: {source}")]
    Decode {
        resource: &'static str,
        source: Arc<serde_json::Error>,
    },
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Status { .. } => "HTTP_STATUS",
            ApiError::Transport(_) => "NETWORK",
            ApiError::Decode { .. } => "DECODE",
            ApiError::InvalidUrl(_) => "INVALID_URL",
            ApiError::Cancelled => "CANCELLED",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub(crate) fn transport(err: reqwest::Error) -> Self {
        Self::Transport(Arc::new(err))
    }

    pub(crate) fn decode(resource: &'static str, err: serde_json::Error) -> Self {
        Self::Decode {
            resource,
            source: Arc::new(err),
        }
    }
}

use chrono::NaiveDate;
use platform_api::{ApiError, Employee, Role, User};
use serde::{Deserialize, Serialize};

/// Signed-in identity as persisted under the session key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    pub employee: Profile,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<NaiveDate>,
}

impl Profile {
    pub fn from_employee(id: i64, employee: Employee) -> Self {
        Self {
            id: employee.id.unwrap_or(id),
            name: employee.name,
            designation: employee.designation,
            department: employee.department,
            join_date: employee.join_date,
        }
    }

    /// Profile derived from the account alone, used when the directory has no
    /// employee record for the user.
    pub fn from_user(id: i64, user: &User) -> Self {
        Self {
            id,
            name: user.username.clone(),
            designation: Some(user.role.label().to_string()),
            department: None,
            join_date: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginFailure {
    /// The server answered and refused the credentials.
    Rejected,
    /// The request never produced a response.
    Network,
    /// The server answered with something that is not a login response.
    Malformed,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoginOutcome {
    Success(Identity),
    Failure { kind: LoginFailure, error: String },
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoginOutcome::Success(_) => None,
            LoginOutcome::Failure { error, .. } => Some(error),
        }
    }

    pub(crate) fn rejected(message: Option<String>) -> Self {
        LoginOutcome::Failure {
            kind: LoginFailure::Rejected,
            error: message
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| "Login failed".to_string()),
        }
    }

    pub(crate) fn malformed(error: impl Into<String>) -> Self {
        LoginOutcome::Failure {
            kind: LoginFailure::Malformed,
            error: error.into(),
        }
    }
}

impl From<ApiError> for LoginOutcome {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { message, .. } => LoginOutcome::rejected(Some(message)),
            ApiError::Decode { .. } => LoginOutcome::malformed(err.to_string()),
            ApiError::Transport(_) | ApiError::InvalidUrl(_) | ApiError::Cancelled => {
                let error = err.to_string();
                LoginOutcome::Failure {
                    kind: LoginFailure::Network,
                    error: if error.is_empty() {
                        "Network error occurred".to_string()
                    } else {
                        error
                    },
                }
            }
        }
    }
}

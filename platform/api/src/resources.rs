use std::marker::PhantomData;

use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};
use tracing::info;

use crate::{
    ApiClient, ApiResult,
    schema::{
        Attendance, DashboardStats, Employee, LoginResponse, OnboardingTask, Performance, User,
    },
};

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// `auth/*` endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Auth<'a> {
    client: &'a ApiClient,
}

impl Auth<'_> {
    /// `POST auth/login`. A rejected login comes back as
    /// [`crate::ApiError::Status`] carrying the server's message.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        info!(%username, "submitting login");
        self.client
            .send(
                Method::POST,
                &["auth", "login"],
                Some(&Credentials { username, password }),
                "login response",
            )
            .await
    }

    pub async fn user(&self, id: i64) -> ApiResult<User> {
        self.client
            .get(&["auth", "user", &id.to_string()], "user")
            .await
    }
}

/// CRUD handle over one resource group (`employees`, `attendance`, ...).
#[derive(Debug)]
pub struct Collection<'a, T> {
    client: &'a ApiClient,
    path: &'static str,
    resource: &'static str,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Collection<'_, T> {}

impl<'a, T> Collection<'a, T>
where
    T: Serialize + DeserializeOwned,
{
    fn new(client: &'a ApiClient, path: &'static str, resource: &'static str) -> Self {
        Self {
            client,
            path,
            resource,
            _record: PhantomData,
        }
    }

    pub async fn list(&self) -> ApiResult<Vec<T>> {
        self.client.get(&[self.path], self.resource).await
    }

    pub async fn get(&self, id: i64) -> ApiResult<T> {
        self.client
            .get(&[self.path, &id.to_string()], self.resource)
            .await
    }

    pub async fn create(&self, record: &T) -> ApiResult<T> {
        self.client
            .send(Method::POST, &[self.path], Some(record), self.resource)
            .await
    }

    /// `PUT {path}/{id}`. The body may be a partial document such as
    /// `{"clockOut": ...}`; the server merges it.
    pub async fn update<P>(&self, id: i64, patch: &P) -> ApiResult<T>
    where
        P: Serialize + ?Sized,
    {
        self.client
            .send(
                Method::PUT,
                &[self.path, &id.to_string()],
                Some(patch),
                self.resource,
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.client
            .send::<(), ()>(
                Method::DELETE,
                &[self.path, &id.to_string()],
                None,
                self.resource,
            )
            .await
    }

    async fn list_below(&self, segments: &[&str]) -> ApiResult<Vec<T>> {
        let mut full = Vec::with_capacity(segments.len() + 1);
        full.push(self.path);
        full.extend_from_slice(segments);
        self.client.get(&full, self.resource).await
    }
}

impl Collection<'_, Employee> {
    pub async fn by_manager(&self, manager_id: i64) -> ApiResult<Vec<Employee>> {
        self.list_below(&["manager", &manager_id.to_string()]).await
    }

    pub async fn by_department(&self, department: &str) -> ApiResult<Vec<Employee>> {
        self.list_below(&["department", department]).await
    }

    pub async fn active(&self) -> ApiResult<Vec<Employee>> {
        self.list_below(&["active"]).await
    }
}

impl Collection<'_, Attendance> {
    pub async fn for_employee(&self, employee_id: i64) -> ApiResult<Vec<Attendance>> {
        self.list_below(&["employee", &employee_id.to_string()])
            .await
    }

    pub async fn today(&self) -> ApiResult<Vec<Attendance>> {
        self.list_below(&["today"]).await
    }
}

impl Collection<'_, Performance> {
    pub async fn for_employee(&self, employee_id: i64) -> ApiResult<Vec<Performance>> {
        self.list_below(&["employee", &employee_id.to_string()])
            .await
    }
}

impl Collection<'_, OnboardingTask> {
    pub async fn for_employee(&self, employee_id: i64) -> ApiResult<Vec<OnboardingTask>> {
        self.list_below(&["employee", &employee_id.to_string()])
            .await
    }
}

impl ApiClient {
    pub fn auth(&self) -> Auth<'_> {
        Auth { client: self }
    }

    pub fn employees(&self) -> Collection<'_, Employee> {
        Collection::new(self, "employees", "employee")
    }

    pub fn users(&self) -> Collection<'_, User> {
        Collection::new(self, "users", "user")
    }

    pub fn attendance(&self) -> Collection<'_, Attendance> {
        Collection::new(self, "attendance", "attendance")
    }

    pub fn performance(&self) -> Collection<'_, Performance> {
        Collection::new(self, "performance", "performance")
    }

    pub fn onboarding(&self) -> Collection<'_, OnboardingTask> {
        Collection::new(self, "onboarding", "onboarding task")
    }

    /// `GET dashboard/stats`, the server-side aggregate used by the dashboard.
    pub async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        self.get(&["dashboard", "stats"], "dashboard stats").await
    }
}

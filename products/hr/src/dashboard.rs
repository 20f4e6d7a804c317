use std::{collections::VecDeque, fmt::Write as _};

use chrono::{NaiveDate, NaiveDateTime};
use platform_api::{ApiError, Attendance, Employee, EmployeeRef, Performance};
use platform_authn::Profile;
use platform_ui::{NotificationKind, ViewScope};
use thiserror::Error;
use tracing::{info, warn};

use crate::AppContext;

const ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("sign in to record attendance")]
    NotSignedIn,
    #[error("already clocked in since {0}")]
    AlreadyClockedIn(NaiveDateTime),
    #[error("not clocked in")]
    NotClockedIn,
    #[error("attendance record was returned without an id")]
    MissingRecordId,
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClockAction {
    In,
    Out,
}

impl ClockAction {
    fn label(self) -> &'static str {
        match self {
            ClockAction::In => "Clock in",
            ClockAction::Out => "Clock out",
        }
    }

    fn done(self) -> &'static str {
        match self {
            ClockAction::In => "Successfully clocked in!",
            ClockAction::Out => "Successfully clocked out!",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Activity {
    pub at: NaiveDateTime,
    pub kind: NotificationKind,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct OpenShift {
    attendance_id: i64,
    clock_in: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DashboardSummary {
    pub total_employees: usize,
    pub clocked_in: usize,
    /// Share of employees currently clocked in, in percent.
    pub attendance_rate: Option<u32>,
    /// Mean review score on a ten-point scale.
    pub performance_rating: Option<f64>,
    pub reviews: usize,
}

/// Dashboard page: headline figures, the signed-in user's attendance state
/// and a short log of what the page did.
#[derive(Debug)]
pub struct Dashboard {
    scope: ViewScope,
    profile: Option<Profile>,
    employees: Vec<Employee>,
    attendance: Vec<Attendance>,
    performance: Vec<Performance>,
    shift: Option<OpenShift>,
    activity: VecDeque<Activity>,
    offline: bool,
}

impl Dashboard {
    pub fn new(profile: Option<Profile>) -> Self {
        Self {
            scope: ViewScope::new("dashboard"),
            profile,
            employees: Vec::new(),
            attendance: Vec::new(),
            performance: Vec::new(),
            shift: None,
            activity: VecDeque::new(),
            offline: false,
        }
    }

    /// Fetch employees, attendance and performance together. A failed load
    /// leaves the page empty in offline mode instead of failing.
    pub async fn load(&mut self, ctx: &AppContext, now: NaiveDateTime) {
        let api = &ctx.api;
        let employees = api.employees();
        let attendance = api.attendance();
        let performance = api.performance();
        let fetched = self
            .scope
            .request(async {
                tokio::try_join!(employees.list(), attendance.list(), performance.list())
            })
            .await;

        match fetched {
            Ok((employees, attendance, performance)) => {
                self.employees = employees;
                self.attendance = attendance;
                self.performance = performance;
                self.offline = false;
                self.shift = self.find_open_shift(now.date());
                info!(
                    employees = self.employees.len(),
                    attendance = self.attendance.len(),
                    reviews = self.performance.len(),
                    "dashboard loaded"
                );
                self.record(now, NotificationKind::Success, "Data fetched successfully");
                ctx.notifications.info("Dashboard data loaded successfully");
            }
            Err(ApiError::Cancelled) => {}
            Err(err) => {
                warn!(error = %err, "dashboard load failed; showing offline view");
                self.employees.clear();
                self.attendance.clear();
                self.performance.clear();
                self.shift = None;
                self.offline = true;
                self.record(
                    now,
                    NotificationKind::Warning,
                    "API connection failed, showing offline data",
                );
                ctx.notifications
                    .error("Failed to load dashboard data. Using offline mode.");
            }
        }
    }

    pub async fn clock_in(
        &mut self,
        ctx: &AppContext,
        now: NaiveDateTime,
    ) -> Result<(), ClockError> {
        let result = self.try_clock_in(ctx, now).await;
        self.report(ctx, now, ClockAction::In, &result);
        result
    }

    pub async fn clock_out(
        &mut self,
        ctx: &AppContext,
        now: NaiveDateTime,
    ) -> Result<(), ClockError> {
        let result = self.try_clock_out(ctx, now).await;
        self.report(ctx, now, ClockAction::Out, &result);
        result
    }

    async fn try_clock_in(
        &mut self,
        ctx: &AppContext,
        now: NaiveDateTime,
    ) -> Result<(), ClockError> {
        let profile = self.profile.as_ref().ok_or(ClockError::NotSignedIn)?;
        if let Some(shift) = self.shift {
            return Err(ClockError::AlreadyClockedIn(shift.clock_in));
        }
        let record = Attendance {
            employee: Some(EmployeeRef::new(profile.id)),
            date: Some(now.date()),
            clock_in: Some(now),
            ..Attendance::default()
        };
        let created = self
            .scope
            .request(ctx.api.attendance().create(&record))
            .await?;
        let attendance_id = created.id.ok_or(ClockError::MissingRecordId)?;
        self.shift = Some(OpenShift {
            attendance_id,
            clock_in: created.clock_in.unwrap_or(now),
        });

        match self.scope.request(ctx.api.attendance().list()).await {
            Ok(list) => self.attendance = list,
            Err(err) => {
                warn!(error = %err, "attendance refresh failed after clock in");
                self.attendance.push(created);
            }
        }
        Ok(())
    }

    async fn try_clock_out(
        &mut self,
        ctx: &AppContext,
        now: NaiveDateTime,
    ) -> Result<(), ClockError> {
        let shift = self.shift.ok_or(ClockError::NotClockedIn)?;
        let patch = Attendance {
            clock_out: Some(now),
            ..Attendance::default()
        };
        let updated = self
            .scope
            .request(ctx.api.attendance().update(shift.attendance_id, &patch))
            .await?;
        if let Some(existing) = self
            .attendance
            .iter_mut()
            .find(|record| record.id == Some(shift.attendance_id))
        {
            *existing = updated;
        }
        self.shift = None;
        Ok(())
    }

    fn report(
        &mut self,
        ctx: &AppContext,
        now: NaiveDateTime,
        action: ClockAction,
        result: &Result<(), ClockError>,
    ) {
        let label = action.label();
        match result {
            Ok(()) => {
                self.record(now, NotificationKind::Success, format!("{label} recorded"));
                ctx.notifications.success(action.done());
            }
            Err(ClockError::Api(ApiError::Cancelled)) => {}
            Err(err @ (ClockError::Api(_) | ClockError::MissingRecordId)) => {
                warn!(action = label, error = %err, "attendance update failed");
                self.record(now, NotificationKind::Error, format!("{label} failed: {err}"));
                ctx.notifications
                    .error("Failed to update attendance. Please try again.");
            }
            Err(err) => {
                ctx.notifications.emit(
                    NotificationKind::Warning,
                    err.to_string(),
                    Some(label.to_string()),
                    None,
                );
            }
        }
    }

    fn find_open_shift(&self, today: NaiveDate) -> Option<OpenShift> {
        let profile = self.profile.as_ref()?;
        self.attendance
            .iter()
            .filter(|record| record.owner_id() == Some(profile.id))
            .filter(|record| record.date == Some(today) || record.date.is_none())
            .filter(|record| record.is_open())
            .filter_map(|record| {
                Some(OpenShift {
                    attendance_id: record.id?,
                    clock_in: record.clock_in?,
                })
            })
            .filter(|shift| shift.clock_in.date() == today)
            .max_by_key(|shift| shift.clock_in)
    }

    fn record(&mut self, at: NaiveDateTime, kind: NotificationKind, message: impl Into<String>) {
        self.activity.push_front(Activity {
            at,
            kind,
            message: message.into(),
        });
        self.activity.truncate(ACTIVITY_LIMIT);
    }

    pub fn clocked_in_since(&self) -> Option<NaiveDateTime> {
        self.shift.map(|shift| shift.clock_in)
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn activity(&self) -> impl Iterator<Item = &Activity> {
        self.activity.iter()
    }

    pub fn attendance(&self) -> &[Attendance] {
        &self.attendance
    }

    pub fn summary(&self) -> DashboardSummary {
        let total_employees = self.employees.len();
        let clocked_in = self.attendance.iter().filter(|record| record.is_open()).count();
        let scores = self
            .performance
            .iter()
            .filter_map(|review| review.score)
            .collect::<Vec<_>>();
        let performance_rating = (!scores.is_empty())
            .then(|| scores.iter().sum::<f64>() / scores.len() as f64 / 10.0);
        let attendance_rate = (total_employees > 0)
            .then(|| ((clocked_in as f64 / total_employees as f64) * 100.0).round() as u32);
        DashboardSummary {
            total_employees,
            clocked_in,
            attendance_rate,
            performance_rating,
            reviews: self.performance.len(),
        }
    }

    pub fn render(&self) -> anyhow::Result<String> {
        let mut out = String::new();
        match &self.profile {
            Some(profile) => {
                writeln!(out, "Welcome back, {}", profile.name)?;
                let role_line = [profile.designation.as_deref(), profile.department.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" · ");
                if !role_line.is_empty() {
                    writeln!(out, "{role_line}")?;
                }
            }
            None => writeln!(out, "Dashboard")?,
        }
        if self.offline {
            writeln!(out, "(offline: figures below are unavailable)")?;
        }
        match self.clocked_in_since() {
            Some(since) => writeln!(out, "Status: clocked in since {}", since.format("%H:%M"))?,
            None => writeln!(out, "Status: not clocked in")?,
        }

        let summary = self.summary();
        writeln!(out)?;
        writeln!(out, "Team members      {}", summary.total_employees)?;
        writeln!(out, "Clocked in now    {}", summary.clocked_in)?;
        match summary.attendance_rate {
            Some(rate) => writeln!(out, "Attendance rate   {rate}%")?,
            None => writeln!(out, "Attendance rate   n/a")?,
        }
        match summary.performance_rating {
            Some(rating) => writeln!(out, "Performance       {rating:.1}/10")?,
            None => writeln!(out, "Performance       n/a")?,
        }
        writeln!(out, "Reviews on file   {}", summary.reviews)?;

        if !self.activity.is_empty() {
            writeln!(out)?;
            writeln!(out, "Recent activity")?;
            for entry in &self.activity {
                writeln!(
                    out,
                    "  {} [{}] {}",
                    entry.at.format("%H:%M:%S"),
                    entry.kind.as_str(),
                    entry.message
                )?;
            }
        }
        Ok(out)
    }
}

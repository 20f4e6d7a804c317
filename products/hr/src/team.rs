use std::{collections::BTreeMap, fmt::Write as _};

use chrono::NaiveDate;
use platform_api::{ApiError, ApiResult, Employee};
use platform_ui::ViewScope;
use tracing::{info, warn};

use crate::AppContext;

/// Fields collected by the "add member" form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewMember {
    pub name: String,
    pub designation: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub join_date: Option<NaiveDate>,
}

impl NewMember {
    fn into_employee(self) -> Employee {
        Employee {
            name: self.name.trim().to_string(),
            designation: self.designation,
            department: self.department,
            email: self.email,
            phone: self.phone,
            join_date: self.join_date,
            is_active: Some(true),
            ..Employee::default()
        }
    }
}

#[derive(Debug)]
pub struct TeamDirectory {
    scope: ViewScope,
    members: Vec<Employee>,
    search: String,
    department: Option<String>,
}

impl Default for TeamDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl TeamDirectory {
    pub fn new() -> Self {
        Self {
            scope: ViewScope::new("team"),
            members: Vec::new(),
            search: String::new(),
            department: None,
        }
    }

    pub fn with_members(members: Vec<Employee>) -> Self {
        Self {
            members,
            ..Self::new()
        }
    }

    pub async fn load(&mut self, ctx: &AppContext) -> ApiResult<()> {
        match self.scope.request(ctx.api.employees().list()).await {
            Ok(members) => {
                info!(count = members.len(), "team loaded");
                self.members = members;
                Ok(())
            }
            Err(ApiError::Cancelled) => Err(ApiError::Cancelled),
            Err(err) => {
                warn!(error = %err, "team load failed");
                ctx.notifications.error(format!("Failed to load team members: {err}"));
                Err(err)
            }
        }
    }

    pub async fn add_member(&mut self, ctx: &AppContext, member: NewMember) -> ApiResult<Employee> {
        let employee = member.into_employee();
        match self.scope.request(ctx.api.employees().create(&employee)).await {
            Ok(created) => {
                ctx.notifications
                    .success(format!("{} added to the team", created.name));
                self.members.push(created.clone());
                Ok(created)
            }
            Err(err) => {
                if !matches!(err, ApiError::Cancelled) {
                    ctx.notifications.error(format!("Failed to add {}: {err}", employee.name));
                }
                Err(err)
            }
        }
    }

    pub async fn remove_member(&mut self, ctx: &AppContext, id: i64) -> ApiResult<()> {
        match self.scope.request(ctx.api.employees().delete(id)).await {
            Ok(()) => {
                self.members.retain(|member| member.id != Some(id));
                ctx.notifications.success("Team member removed");
                Ok(())
            }
            Err(err) => {
                if !matches!(err, ApiError::Cancelled) {
                    ctx.notifications.error(format!("Failed to remove team member: {err}"));
                }
                Err(err)
            }
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// `None` (or "all") shows every department.
    pub fn set_department(&mut self, department: Option<String>) {
        self.department =
            department.filter(|d| !d.trim().is_empty() && !d.eq_ignore_ascii_case("all"));
    }

    pub fn members(&self) -> &[Employee] {
        &self.members
    }

    pub fn filtered(&self) -> Vec<&Employee> {
        let needle = self.search.trim().to_lowercase();
        self.members
            .iter()
            .filter(|member| match &self.department {
                Some(wanted) => member
                    .department
                    .as_deref()
                    .is_some_and(|department| department.eq_ignore_ascii_case(wanted)),
                None => true,
            })
            .filter(|member| {
                needle.is_empty()
                    || [
                        Some(member.name.as_str()),
                        member.email.as_deref(),
                        member.designation.as_deref(),
                    ]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn departments(&self) -> Vec<String> {
        self.department_counts().into_keys().collect()
    }

    pub fn department_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for department in self.members.iter().filter_map(|m| m.department.as_deref()) {
            *counts.entry(department.to_string()).or_insert(0) += 1;
        }
        counts
    }

    pub fn render(&self) -> anyhow::Result<String> {
        let shown = self.filtered();
        let mut out = String::new();
        writeln!(out, "Team ({} of {})", shown.len(), self.members.len())?;
        if let Some(department) = &self.department {
            writeln!(out, "Department: {department}")?;
        }
        if !self.search.trim().is_empty() {
            writeln!(out, "Search: {}", self.search.trim())?;
        }
        writeln!(out)?;
        if shown.is_empty() {
            writeln!(out, "No team members match.")?;
        }
        for member in shown {
            writeln!(
                out,
                "{:<5} {:<24} {:<26} {:<14} {}",
                member.id.map(|id| id.to_string()).unwrap_or_default(),
                member.name,
                member.designation.as_deref().unwrap_or("-"),
                member.department.as_deref().unwrap_or("-"),
                member.email.as_deref().unwrap_or("-"),
            )?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: i64, name: &str, designation: &str, department: &str) -> Employee {
        Employee {
            id: Some(id),
            name: name.into(),
            designation: Some(designation.into()),
            department: Some(department.into()),
            email: Some(format!(
                "{}@company.com",
                name.split(' ').next().unwrap().to_lowercase()
            )),
            ..Employee::default()
        }
    }

    fn directory() -> TeamDirectory {
        TeamDirectory::with_members(vec![
            member(1, "Sarah Johnson", "Senior Software Engineer", "Engineering"),
            member(2, "Michael Chen", "Product Manager", "Product"),
            member(3, "Emily Rodriguez", "UX Designer", "Design"),
            member(6, "James Wilson", "DevOps Engineer", "Engineering"),
        ])
    }

    fn names(team: &TeamDirectory) -> Vec<&str> {
        team.filtered().iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn search_matches_name_email_or_designation() {
        let mut team = directory();
        team.set_search("ENGINEER");
        assert_eq!(names(&team), vec!["Sarah Johnson", "James Wilson"]);
        team.set_search("michael@");
        assert_eq!(names(&team), vec!["Michael Chen"]);
        team.set_search("  ");
        assert_eq!(names(&team).len(), 4);
    }

    #[test]
    fn department_filter_combines_with_search() {
        let mut team = directory();
        team.set_department(Some("engineering".into()));
        assert_eq!(names(&team), vec!["Sarah Johnson", "James Wilson"]);
        team.set_search("devops");
        assert_eq!(names(&team), vec!["James Wilson"]);
        team.set_department(Some("All".into()));
        assert_eq!(names(&team), vec!["James Wilson"]);
    }

    #[test]
    fn departments_are_sorted_and_counted() {
        let team = directory();
        assert_eq!(team.departments(), vec!["Design", "Engineering", "Product"]);
        assert_eq!(team.department_counts()["Engineering"], 2);
    }

    #[test]
    fn render_lists_matches() {
        let mut team = directory();
        team.set_search("nobody");
        let text = team.render().unwrap();
        assert!(text.starts_with("Team (0 of 4)"));
        assert!(text.contains("No team members match."));
    }

    #[test]
    fn new_members_are_trimmed_and_active() {
        let employee = NewMember {
            name: "  Lisa Wang ".into(),
            department: Some("Marketing".into()),
            ..NewMember::default()
        }
        .into_employee();
        assert_eq!(employee.name, "Lisa Wang");
        assert_eq!(employee.is_active, Some(true));
        assert_eq!(employee.id, None);
    }
}

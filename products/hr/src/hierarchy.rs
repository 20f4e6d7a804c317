use std::{
    collections::{HashMap, HashSet},
    fmt::Write as _,
};

use platform_api::{ApiError, ApiResult, Employee};
use platform_ui::ViewScope;
use tracing::warn;

use crate::AppContext;

#[derive(Clone, Debug, PartialEq)]
pub struct OrgNode {
    pub employee: Employee,
    pub reports: Vec<OrgNode>,
}

impl OrgNode {
    /// Number of people in this subtree, including this node.
    pub fn size(&self) -> usize {
        1 + self.reports.iter().map(OrgNode::size).sum::<usize>()
    }
}

/// Arrange employees into manager → reports trees using `managerId`.
///
/// Employees without a manager, or whose manager is not in the list, become
/// roots. Siblings are ordered by name. Every employee appears exactly once;
/// members of a reporting cycle are attached under the first of them reached.
pub fn build_forest(employees: Vec<Employee>) -> Vec<OrgNode> {
    let known_ids = employees
        .iter()
        .filter_map(|employee| employee.id)
        .collect::<HashSet<_>>();
    let mut reports: HashMap<i64, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for (index, employee) in employees.iter().enumerate() {
        match employee.manager_id {
            Some(manager) if known_ids.contains(&manager) && employee.id != Some(manager) => {
                reports.entry(manager).or_default().push(index);
            }
            _ => roots.push(index),
        }
    }

    let by_name = |a: &usize, b: &usize| employees[*a].name.cmp(&employees[*b].name);
    roots.sort_by(by_name);
    for children in reports.values_mut() {
        children.sort_by(by_name);
    }

    let mut placed = vec![false; employees.len()];
    let mut forest = Vec::new();
    for root in roots {
        forest.push(attach(root, &employees, &reports, &mut placed));
    }
    // Whatever is left only reports within a cycle.
    let mut stranded = (0..employees.len())
        .filter(|index| !placed[*index])
        .collect::<Vec<_>>();
    stranded.sort_by(by_name);
    for index in stranded {
        if !placed[index] {
            forest.push(attach(index, &employees, &reports, &mut placed));
        }
    }
    forest
}

fn attach(
    index: usize,
    employees: &[Employee],
    reports: &HashMap<i64, Vec<usize>>,
    placed: &mut [bool],
) -> OrgNode {
    placed[index] = true;
    let employee = &employees[index];
    let children = employee
        .id
        .and_then(|id| reports.get(&id))
        .map(Vec::as_slice)
        .unwrap_or_default();
    let mut node = OrgNode {
        employee: employee.clone(),
        reports: Vec::new(),
    };
    for &child in children {
        if !placed[child] {
            node.reports.push(attach(child, employees, reports, placed));
        }
    }
    node
}

#[derive(Debug)]
pub struct Hierarchy {
    scope: ViewScope,
    forest: Vec<OrgNode>,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl Hierarchy {
    pub fn new() -> Self {
        Self {
            scope: ViewScope::new("hierarchy"),
            forest: Vec::new(),
        }
    }

    pub async fn load(&mut self, ctx: &AppContext) -> ApiResult<()> {
        match self.scope.request(ctx.api.employees().list()).await {
            Ok(employees) => {
                self.forest = build_forest(employees);
                Ok(())
            }
            Err(ApiError::Cancelled) => Err(ApiError::Cancelled),
            Err(err) => {
                warn!(error = %err, "hierarchy load failed");
                ctx.notifications
                    .error(format!("Failed to load the organization chart: {err}"));
                Err(err)
            }
        }
    }

    pub fn forest(&self) -> &[OrgNode] {
        &self.forest
    }

    pub fn render(&self) -> anyhow::Result<String> {
        let mut out = String::from("Organization hierarchy\n\n");
        if self.forest.is_empty() {
            out.push_str("No employees on record.\n");
        }
        for root in &self.forest {
            write_node(&mut out, root, "", None)?;
        }
        Ok(out)
    }
}

fn write_node(
    out: &mut String,
    node: &OrgNode,
    prefix: &str,
    last: Option<bool>,
) -> std::fmt::Result {
    let (branch, next_prefix) = match last {
        None => ("", String::new()),
        Some(true) => ("└─ ", format!("{prefix}   ")),
        Some(false) => ("├─ ", format!("{prefix}│  ")),
    };
    let employee = &node.employee;
    write!(out, "{prefix}{branch}{}", employee.name)?;
    if let Some(designation) = &employee.designation {
        write!(out, " ({designation})")?;
    }
    if !node.reports.is_empty() {
        write!(out, " [{} reports]", node.reports.len())?;
    }
    writeln!(out)?;
    let count = node.reports.len();
    for (position, child) in node.reports.iter().enumerate() {
        write_node(out, child, &next_prefix, Some(position + 1 == count))?;
    }
    Ok(())
}

use std::fmt::Write as _;

use chrono::NaiveDateTime;
use platform_authn::Identity;
use platform_authz::{Resolution, Route, RouteGuard};
use platform_ui::ErrorBoundary;
use products_hr::{AppContext, Dashboard, Hierarchy, TeamDirectory};
use tracing::info;

/// Per-page options coming from the command line.
#[derive(Clone, Debug, Default)]
pub struct PageOptions {
    pub search: Option<String>,
    pub department: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rendered {
    pub resolution: Resolution,
    pub body: String,
}

/// Routes a path through the guard and renders the page inside an error
/// boundary. The boundary lives as long as the shell, so a tripped page stays
/// on its fallback until [`Shell::reload`].
pub struct Shell {
    ctx: AppContext,
    guard: RouteGuard,
    boundary: ErrorBoundary,
}

impl Shell {
    pub fn new(ctx: AppContext, development: bool) -> Self {
        Self {
            ctx,
            guard: RouteGuard,
            boundary: ErrorBoundary::new("page", development),
        }
    }

    pub fn reload(&mut self) {
        self.boundary.reload();
    }

    pub async fn open(
        &mut self,
        path: &str,
        options: &PageOptions,
        now: NaiveDateTime,
    ) -> Rendered {
        let identity = self.ctx.session.identity();
        let resolution = self.guard.resolve(path, identity.is_some());
        if let Resolution::Redirect(target) = resolution {
            info!(from = path, to = %target, "redirecting");
        }

        let body = match resolution.target() {
            Route::Home => {
                let text = home(identity.as_ref());
                self.boundary.render(|| Ok(text))
            }
            Route::Login => self.boundary.render(|| Ok(login_hint())),
            Route::Dashboard => {
                let mut page = Dashboard::new(identity.map(|identity| identity.employee));
                page.load(&self.ctx, now).await;
                self.boundary.render(|| page.render())
            }
            Route::Team => {
                let mut page = TeamDirectory::new();
                if let Some(search) = &options.search {
                    page.set_search(search.clone());
                }
                page.set_department(options.department.clone());
                // Failures are reported through notifications; the page renders empty.
                let _ = page.load(&self.ctx).await;
                self.boundary.render(|| page.render())
            }
            Route::Hierarchy => {
                let mut page = Hierarchy::new();
                let _ = page.load(&self.ctx).await;
                self.boundary.render(|| page.render())
            }
            route @ (Route::CompanyTree | Route::Payment) => {
                self.boundary.render(|| Ok(unavailable(route)))
            }
        };

        Rendered { resolution, body }
    }
}

fn home(identity: Option<&Identity>) -> String {
    let mut out = String::from("PeoplePulse: employee management\n\n");
    match identity {
        Some(identity) => {
            let _ = writeln!(out, "Signed in as {} ({})", identity.username, identity.role);
        }
        None => out.push_str("Not signed in. Run `peoplepulse login --username <name>`.\n"),
    }
    out.push_str("\nPages:\n");
    for route in Route::ALL {
        let lock = if route.requires_session() { " (sign-in required)" } else { "" };
        let _ = writeln!(out, "  {:<14} {}{lock}", route.path(), route.title());
    }
    out
}

fn login_hint() -> String {
    "Sign in to continue:\n  peoplepulse login --username <name>\n\
     The password is read from --password or PEOPLEPULSE_PASSWORD.\n"
        .to_string()
}

fn unavailable(route: Route) -> String {
    format!(
        "{}\n\nThis page is not available in the terminal client yet.\n",
        route.title()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_lists_every_route() {
        let text = home(None);
        for route in Route::ALL {
            assert!(text.contains(route.path()));
        }
        assert!(text.contains("Not signed in"));
    }
}

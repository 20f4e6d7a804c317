//! Route table and the authentication guard in front of it.

use std::fmt;

use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Dashboard,
    Team,
    Hierarchy,
    CompanyTree,
    Payment,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Home,
        Route::Login,
        Route::Dashboard,
        Route::Team,
        Route::Hierarchy,
        Route::CompanyTree,
        Route::Payment,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Team => "/team",
            Route::Hierarchy => "/hierarchy",
            Route::CompanyTree => "/company-tree",
            Route::Payment => "/payment",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Login => "Sign in",
            Route::Dashboard => "Dashboard",
            Route::Team => "Team",
            Route::Hierarchy => "Hierarchy",
            Route::CompanyTree => "Company tree",
            Route::Payment => "Payments",
        }
    }

    /// Parse a request path. Query strings, fragments and one trailing slash
    /// are ignored; a missing leading slash is tolerated.
    pub fn from_path(raw: &str) -> Option<Self> {
        let path = raw
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let path = path.strip_prefix('/').unwrap_or(path);
        let path = path.strip_suffix('/').unwrap_or(path);
        Route::ALL
            .into_iter()
            .find(|route| route.path().trim_start_matches('/') == path)
    }

    pub fn requires_session(self) -> bool {
        !matches!(self, Route::Home | Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Render(Route),
    Redirect(Route),
}

impl Resolution {
    /// Route that ends up on screen.
    pub fn target(self) -> Route {
        match self {
            Resolution::Render(route) | Resolution::Redirect(route) => route,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RouteGuard;

impl RouteGuard {
    pub fn resolve(&self, path: &str, authenticated: bool) -> Resolution {
        let resolution = match Route::from_path(path) {
            None => Resolution::Redirect(Route::Home),
            Some(route) if route.requires_session() && !authenticated => {
                Resolution::Redirect(Route::Login)
            }
            Some(Route::Login) if authenticated => Resolution::Redirect(Route::Dashboard),
            Some(route) => Resolution::Render(route),
        };
        debug!(path, authenticated, ?resolution, "resolved route");
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_parse_leniently() {
        assert_eq!(Route::from_path("/"), Some(Route::Home));
        assert_eq!(Route::from_path(""), Some(Route::Home));
        assert_eq!(Route::from_path("/team/"), Some(Route::Team));
        assert_eq!(Route::from_path("company-tree"), Some(Route::CompanyTree));
        assert_eq!(Route::from_path("/payment?month=3"), Some(Route::Payment));
        assert_eq!(Route::from_path("/teams"), None);
    }

    #[test]
    fn every_route_round_trips_through_its_path() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }

    #[test]
    fn protected_routes_send_guests_to_login() {
        let guard = RouteGuard;
        for route in Route::ALL.into_iter().filter(|r| r.requires_session()) {
            assert_eq!(
                guard.resolve(route.path(), false),
                Resolution::Redirect(Route::Login)
            );
            assert_eq!(guard.resolve(route.path(), true), Resolution::Render(route));
        }
    }

    #[test]
    fn unknown_paths_go_home() {
        let guard = RouteGuard;
        assert_eq!(
            guard.resolve("/admin", true),
            Resolution::Redirect(Route::Home)
        );
        assert_eq!(
            guard.resolve("/admin", false),
            Resolution::Redirect(Route::Home)
        );
    }

    #[test]
    fn public_routes_render_for_everyone() {
        let guard = RouteGuard;
        assert_eq!(guard.resolve("/", false), Resolution::Render(Route::Home));
        assert_eq!(
            guard.resolve("/login", false),
            Resolution::Render(Route::Login)
        );
        assert_eq!(
            guard.resolve("/login", true),
            Resolution::Redirect(Route::Dashboard)
        );
    }
}

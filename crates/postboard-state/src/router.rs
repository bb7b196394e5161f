//! One router owns the current view. Link activation and history
//! navigation are the two event producers feeding it.

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    Post(u64),
}

impl Route {
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim();
        let trimmed = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };

        match trimmed {
            "" | "/" | "/home" => Some(Self::Home),
            other => other
                .strip_prefix("/blog/")
                .and_then(|id| id.parse::<u64>().ok())
                .map(Self::Post),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Post(id) => format!("/blog/{id}"),
        }
    }
}

/// Path component of an anchor href, which may be absolute.
pub fn path_of(href: &str) -> &str {
    let without_origin = match href.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|idx| &rest[idx..]).unwrap_or("/"),
        None => href,
    };
    let end = without_origin
        .find(['?', '#'])
        .unwrap_or(without_origin.len());
    &without_origin[..end]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    LinkActivated(String),
    HistoryPopped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEffect {
    PushHistory(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Router {
    route: Route,
}

impl Router {
    pub fn new(initial_path: &str) -> Self {
        Self {
            route: Route::parse(initial_path).unwrap_or_default(),
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Returns the side effect the host must perform, if any. Unknown links
    /// are left to the browser.
    pub fn handle(&mut self, event: NavEvent) -> Option<NavEffect> {
        match event {
            NavEvent::LinkActivated(href) => {
                let route = Route::parse(path_of(&href))?;
                debug!(?route, "link activated");
                self.route = route;
                Some(NavEffect::PushHistory(route.path()))
            }
            NavEvent::HistoryPopped(path) => {
                if let Some(route) = Route::parse(path_of(&path)) {
                    debug!(?route, "history navigation");
                    self.route = route;
                }
                None
            }
        }
    }
}

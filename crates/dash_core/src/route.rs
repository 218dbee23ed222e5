use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::types::RunNumber;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("no page matches path `{0}`")]
    NoMatch(String),
    #[error("invalid run number `{number}` in path `{path}`")]
    BadRunNumber { path: String, number: String },
}

/// Page of the dashboard, addressed by its URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`
    Home,
    /// `/jobs`
    Jobs,
    /// `/jobs/{name}`
    Job { name: String },
    /// `/jobs/{name}/{number}`
    Run { name: String, number: RunNumber },
}

/// Which view model serves a route. Routes of the same kind share a view
/// instance across navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Home,
    Jobs,
    Job,
    Run,
}

impl Route {
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = trimmed.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();
        if !trimmed.is_empty() && !trimmed.starts_with('/') {
            return Err(RouteError::NoMatch(path.to_string()));
        }
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(RouteError::NoMatch(path.to_string()));
        }
        match segments.as_slice() {
            [] => Ok(Route::Home),
            ["jobs"] => Ok(Route::Jobs),
            ["jobs", name] => Ok(Route::Job {
                name: (*name).to_string(),
            }),
            ["jobs", name, number] => {
                let number = number.parse().map_err(|_| RouteError::BadRunNumber {
                    path: path.to_string(),
                    number: (*number).to_string(),
                })?;
                Ok(Route::Run {
                    name: (*name).to_string(),
                    number,
                })
            }
            _ => Err(RouteError::NoMatch(path.to_string())),
        }
    }

    pub fn kind(&self) -> ViewKind {
        match self {
            Route::Home => ViewKind::Home,
            Route::Jobs => ViewKind::Jobs,
            Route::Job { .. } => ViewKind::Job,
            Route::Run { .. } => ViewKind::Run,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Jobs => "/jobs".to_string(),
            Route::Job { name } => format!("/jobs/{name}"),
            Route::Run { name, number } => format!("/jobs/{name}/{number}"),
        }
    }

    /// Path of the raw log stream; only runs have one.
    pub fn log_path(&self) -> Option<String> {
        match self {
            Route::Run { .. } => Some(format!("{}/log", self.path())),
            _ => None,
        }
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_page() {
        assert_eq!(Route::parse("/").unwrap(), Route::Home);
        assert_eq!(Route::parse("").unwrap(), Route::Home);
        assert_eq!(Route::parse("/jobs/").unwrap(), Route::Jobs);
        assert_eq!(
            Route::parse("/jobs/build").unwrap(),
            Route::Job {
                name: "build".into()
            }
        );
        assert_eq!(
            Route::parse("/jobs/build/12?tab=log").unwrap(),
            Route::Run {
                name: "build".into(),
                number: 12
            }
        );
    }

    #[test]
    fn rejects_unknown_paths() {
        assert!(matches!(
            Route::parse("/nodes"),
            Err(RouteError::NoMatch(_))
        ));
        assert!(matches!(
            Route::parse("/jobs//3"),
            Err(RouteError::NoMatch(_))
        ));
        assert!(matches!(
            Route::parse("/jobs/a/b/c"),
            Err(RouteError::NoMatch(_))
        ));
        assert!(matches!(
            Route::parse("jobs"),
            Err(RouteError::NoMatch(_))
        ));
        assert!(matches!(
            Route::parse("/jobs/build/latest"),
            Err(RouteError::BadRunNumber { .. })
        ));
    }

    #[test]
    fn log_path_is_derived_from_run_path() {
        let route = Route::parse("/jobs/build/7").unwrap();
        assert_eq!(route.log_path().as_deref(), Some("/jobs/build/7/log"));
        assert_eq!(Route::Jobs.log_path(), None);
    }
}

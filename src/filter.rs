//! Project filtering applied before analytics

use crate::types::{Project, Status};

/// Conjunction of optional predicates; an unset field matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    /// Case-insensitive substring of the project name
    pub search: Option<String>,
    pub status: Option<Status>,
    /// Exact project name
    pub project: Option<String>,
    /// Compared upper-cased
    pub squad: Option<String>,
    /// Compared upper-cased
    pub factory: Option<String>,
}

fn same_upper(value: Option<&str>, wanted: &str) -> bool {
    value.is_some_and(|value| value.trim().to_uppercase() == wanted.trim().to_uppercase())
}

impl ProjectFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, project: &Project) -> bool {
        if let Some(search) = &self.search {
            if !project.name.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        if self.status.is_some_and(|status| project.status != status) {
            return false;
        }
        if self.project.as_ref().is_some_and(|name| &project.name != name) {
            return false;
        }
        if let Some(squad) = &self.squad {
            if !same_upper(project.team.squad.as_deref(), squad) {
                return false;
            }
        }
        if let Some(factory) = &self.factory {
            if !same_upper(project.team.factory.as_deref(), factory) {
                return false;
            }
        }
        true
    }

    /// Matching projects, input order kept
    pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        projects.iter().filter(|p| self.matches(p)).collect()
    }

    /// Owned copy of the matching projects, ready for the analytics functions
    pub fn select(&self, projects: &[Project]) -> Vec<Project> {
        self.apply(projects).into_iter().cloned().collect()
    }
}

//! Built-in record schemas.
//!
//! - [`employees`]: employee directory (v1 snake_case, v2 PascalCase)
//! - [`activity_logs`]: employee activity entries
//! - [`recommendations`]: health recommendations

pub mod activity_logs;
pub mod employees;
pub mod recommendations;

use std::fmt;
use std::str::FromStr;

use crate::core::schema::TableSchema;
use crate::error::RepoError;

pub use activity_logs::{
    ActivityLogRecord, ActivityLogsRepository, ActivityLogsSyncRepository,
};
pub use employees::{EmployeeRecord, EmployeesRepository, EmployeesSyncRepository};
pub use recommendations::{
    RecommendationRecord, RecommendationsRepository, RecommendationsSyncRepository,
};

/// Record kind selecting a built-in schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryKind {
    Employees,
    ActivityLogs,
    Recommendations,
}

impl RepositoryKind {
    pub const ALL: [RepositoryKind; 3] = [
        RepositoryKind::Employees,
        RepositoryKind::ActivityLogs,
        RepositoryKind::Recommendations,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RepositoryKind::Employees => "employees",
            RepositoryKind::ActivityLogs => "activitylogs",
            RepositoryKind::Recommendations => "recommendations",
        }
    }

    /// Current schema for this kind.
    pub fn schema(self) -> TableSchema {
        match self {
            RepositoryKind::Employees => employees::schema(),
            RepositoryKind::ActivityLogs => activity_logs::schema(),
            RepositoryKind::Recommendations => recommendations::schema(),
        }
    }
}

impl FromStr for RepositoryKind {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RepositoryKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                RepoError::Config(format!(
                    "Unknown repository type: '{}'. Supported types: employees, activitylogs, recommendations",
                    s
                ))
            })
    }
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! Fetch error types.

use thiserror::Error;

use crate::core::errors::ConfigError;

/// Error reported by a dependency fetcher.
///
/// Fetch failures reach the user as [`ConfigError::DependencyUnresolved`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("no matching version for `{package}`")]
    NoMatchingVersion {
        package: String,
        requirement: String,
        available: Vec<String>,
    },

    #[error("package not found: `{package}`")]
    PackageNotFound { package: String },
}

impl FetchError {
    /// The package the failure is about.
    pub fn package(&self) -> &str {
        match self {
            FetchError::NoMatchingVersion { package, .. } | FetchError::PackageNotFound { package } => {
                package
            }
        }
    }
}

impl From<FetchError> for ConfigError {
    fn from(err: FetchError) -> Self {
        let message = match &err {
            FetchError::NoMatchingVersion {
                requirement,
                available,
                ..
            } if !available.is_empty() => format!(
                "no version matches `{}` (available: {})",
                requirement,
                available.join(", ")
            ),
            FetchError::NoMatchingVersion { requirement, .. } => {
                format!("no version matches `{}`", requirement)
            }
            FetchError::PackageNotFound { .. } => "package not found".to_string(),
        };

        ConfigError::DependencyUnresolved {
            package: err.package().to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_matching_version_lists_available() {
        let err: ConfigError = FetchError::NoMatchingVersion {
            package: "sisl".to_string(),
            requirement: "[^12.3]".to_string(),
            available: vec!["11.0.0".to_string(), "13.1.0".to_string()],
        }
        .into();

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("sisl"));
        assert!(output.contains("no version matches `[^12.3]` (available: 11.0.0, 13.1.0)"));
    }

    #[test]
    fn test_converts_to_dependency_unresolved() {
        let err: ConfigError = FetchError::PackageNotFound {
            package: "libiscsi".to_string(),
        }
        .into();

        assert_eq!(
            err,
            ConfigError::DependencyUnresolved {
                package: "libiscsi".to_string(),
                message: "package not found".to_string(),
            }
        );
    }
}

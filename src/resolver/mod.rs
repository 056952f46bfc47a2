//! Dependency resolution.
//!
//! Turns resolved options into an ordered set of dependency requests and
//! hands them to an external fetcher. Resolution itself is pure and
//! deterministic; the fetcher owns all I/O.

pub mod errors;
pub mod fetch;
pub mod requirements;
pub mod version;

pub use errors::FetchError;
pub use fetch::{DependencyFetcher, DryRunFetcher, LocalIndex};
pub use requirements::{resolve, RequirementSet};
pub use version::VersionConstraint;

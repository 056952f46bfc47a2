//! Requirement resolution.
//!
//! Maps the resolved option set to the ordered list of upstream packages
//! the recipe needs. No version solving happens here; constraints are
//! passed through untouched.

use serde::Serialize;

use crate::core::dependency::{DependencyKind, DependencyRequest, DependencySpec};
use crate::core::option::ResolvedOptions;

/// Requests handed to the dependency fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementSet {
    pub requests: Vec<DependencyRequest>,
    /// The fetcher may skip test-only requirements when set
    pub skip_test: bool,
}

impl RequirementSet {
    /// `(name, constraint)` pairs, in request order.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.requests
            .iter()
            .map(|r| (r.name.clone(), r.constraint.to_string()))
            .collect()
    }

    /// Regular (non-test) requests.
    pub fn regular(&self) -> impl Iterator<Item = &DependencyRequest> {
        self.requests
            .iter()
            .filter(|r| r.kind == DependencyKind::Regular)
    }

    /// Find a request by package name.
    pub fn get(&self, name: &str) -> Option<&DependencyRequest> {
        self.requests.iter().find(|r| r.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Evaluate every spec against the options, keeping declaration order.
pub fn resolve(
    specs: &[DependencySpec],
    options: &ResolvedOptions,
    skip_test: bool,
) -> RequirementSet {
    let requests = specs
        .iter()
        .filter_map(|spec| {
            let request = spec.request(options);
            if request.is_none() {
                tracing::debug!("skipping `{}`: `{}` not met", spec.name, spec.condition);
            }
            request
        })
        .collect();

    RequirementSet {
        requests,
        skip_test,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::recipe::Recipe;

    fn options(overrides: &[(&str, &str)]) -> ResolvedOptions {
        let recipe = Recipe::ublkpp().unwrap();
        let mut model = recipe.option_model().unwrap();
        for (name, value) in overrides {
            model.set(name, value).unwrap();
        }
        model.resolve()
    }

    fn names(set: &RequirementSet) -> Vec<&str> {
        set.requests.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_default_requirements() {
        let recipe = Recipe::ublkpp().unwrap();
        let set = resolve(&recipe.requirements, &options(&[]), false);

        assert_eq!(
            names(&set),
            vec!["sisl", "isa-l", "ublksrv", "libiscsi", "gtest"]
        );
        assert_eq!(
            set.pairs()[0],
            ("sisl".to_string(), "[^12.3]".to_string())
        );
    }

    #[test]
    fn test_option_gated_requirements() {
        let recipe = Recipe::ublkpp().unwrap();
        let set = resolve(
            &recipe.requirements,
            &options(&[("iscsi", "False"), ("homeblocks", "True")]),
            false,
        );

        assert!(set.contains("homeblocks"));
        assert!(!set.contains("libiscsi"));
        assert_eq!(
            set.get("homeblocks").unwrap().reference(),
            "homeblocks/[^2.1]@oss/main"
        );
    }

    #[test]
    fn test_base_set_is_always_present() {
        let recipe = Recipe::ublkpp().unwrap();
        for iscsi in ["True", "False"] {
            for homeblocks in ["True", "False"] {
                let set = resolve(
                    &recipe.requirements,
                    &options(&[("iscsi", iscsi), ("homeblocks", homeblocks)]),
                    false,
                );
                for base in ["sisl", "isa-l", "ublksrv"] {
                    assert!(set.contains(base));
                }
            }
        }
    }

    #[test]
    fn test_order_is_stable() {
        let recipe = Recipe::ublkpp().unwrap();
        let opts = options(&[("homeblocks", "True")]);

        let first = resolve(&recipe.requirements, &opts, false);
        let second = resolve(&recipe.requirements, &opts, false);
        assert_eq!(first, second);
        assert_eq!(
            names(&first),
            vec!["sisl", "isa-l", "homeblocks", "ublksrv", "libiscsi", "gtest"]
        );
    }

    #[test]
    fn test_regular_excludes_test_requirements() {
        let recipe = Recipe::ublkpp().unwrap();
        let set = resolve(&recipe.requirements, &options(&[]), true);

        assert!(set.skip_test);
        assert!(set.contains("gtest"));
        assert!(set.regular().all(|r| r.name != "gtest"));
    }
}

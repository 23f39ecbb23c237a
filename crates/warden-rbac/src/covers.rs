//! Rule covering.
//!
//! # Purpose
//! Decides whether a set of held rules permits everything a candidate rule
//! permits.
//!
//! # Key invariants
//! - A candidate must be covered by one single held rule. Coverage spread over
//!   several held rules does not count.
//! - Each dimension is compared independently; a candidate dimension that is
//!   empty permits nothing there and is trivially covered, except resource
//!   names, where empty means "every name".
//! - A held resource `*/sub` grants the `sub` subresource of every resource.
//!   `res/*` is a literal value, not a wildcard over the subresources of `res`.
//! - Non-resource URLs ending in `*` on the held side match by prefix.
//! - A held rule unrestricted in verbs, groups, resources and names covers
//!   non-resource URL candidates too.
use crate::PolicyRule;
use crate::rule::WILDCARD;

/// True when some single rule in `held` covers `candidate`.
pub fn covers(held: &[PolicyRule], candidate: &PolicyRule) -> bool {
    held.iter().any(|owner| rule_covers(owner, candidate))
}

/// True when every candidate is covered by some held rule.
pub fn covers_all(held: &[PolicyRule], candidates: &[PolicyRule]) -> bool {
    candidates.iter().all(|candidate| covers(held, candidate))
}

/// Candidates that no single held rule covers, in input order.
pub fn uncovered_rules(held: &[PolicyRule], candidates: &[PolicyRule]) -> Vec<PolicyRule> {
    candidates
        .iter()
        .filter(|candidate| !covers(held, candidate))
        .cloned()
        .collect()
}

/// True when `owner` alone permits everything `candidate` permits.
pub fn rule_covers(owner: &PolicyRule, candidate: &PolicyRule) -> bool {
    if !dimension_covers(&owner.verbs, &candidate.verbs, exact_match) {
        return false;
    }
    if owner.grants_all_resources() {
        return true;
    }
    dimension_covers(&owner.api_groups, &candidate.api_groups, exact_match)
        && dimension_covers(&owner.resources, &candidate.resources, resource_match)
        && names_covered(&owner.resource_names, &candidate.resource_names)
        && dimension_covers(
            &owner.non_resource_urls,
            &candidate.non_resource_urls,
            url_match,
        )
}

fn dimension_covers(owned: &[String], requested: &[String], matches: fn(&str, &str) -> bool) -> bool {
    requested
        .iter()
        .all(|value| owned.iter().any(|owner| matches(owner, value)))
}

fn exact_match(owner: &str, value: &str) -> bool {
    owner == WILDCARD || owner == value
}

fn resource_match(owner: &str, value: &str) -> bool {
    if exact_match(owner, value) {
        return true;
    }
    let Some((_, subresource)) = value.split_once('/') else {
        return false;
    };
    owner
        .strip_prefix("*/")
        .is_some_and(|owner_subresource| owner_subresource == subresource)
}

fn url_match(owner: &str, value: &str) -> bool {
    if exact_match(owner, value) {
        return true;
    }
    owner
        .strip_suffix('*')
        .is_some_and(|prefix| value.starts_with(prefix))
}

fn names_covered(owned: &[String], requested: &[String]) -> bool {
    // Empty on the owner side grants every name.
    if owned.is_empty() || owned.iter().any(|name| name == WILDCARD) {
        return true;
    }
    // Empty on the candidate side asks for every name, which only an
    // unrestricted owner grants.
    if requested.is_empty() {
        return false;
    }
    requested.iter().all(|name| owned.contains(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pods(verbs: &[&str]) -> PolicyRule {
        PolicyRule::new()
            .verbs(verbs.iter().copied())
            .api_groups([""])
            .resources(["pods"])
    }

    #[test]
    fn full_wildcard_covers_everything() {
        let held = vec![PolicyRule::wildcard()];
        let candidates = [
            pods(&["get"]),
            pods(&["*"]),
            PolicyRule::new()
                .verbs(["create"])
                .api_groups(["apps"])
                .resources(["deployments/scale"])
                .resource_names(["web"]),
            PolicyRule::new()
                .verbs(["get"])
                .non_resource_urls(["/healthz", "/debug/*"]),
            PolicyRule::new().verbs(["*"]).non_resource_urls(["*"]),
            PolicyRule::wildcard(),
        ];
        for candidate in &candidates {
            assert!(covers(&held, candidate), "{candidate}");
        }
    }

    #[test]
    fn resource_wide_rule_covers_urls_for_its_verbs() {
        let readers = vec![
            PolicyRule::new()
                .verbs(["get"])
                .api_groups(["*"])
                .resources(["*"]),
        ];
        let healthz = PolicyRule::new().verbs(["get"]).non_resource_urls(["/healthz"]);
        assert!(covers(&readers, &healthz));
        assert!(!covers(&readers, &healthz.clone().verbs(["post"])));

        // Restricting names or groups drops the rule back to per-dimension checks.
        let named = vec![PolicyRule::wildcard().resource_names(["web"])];
        assert!(!covers(&named, &healthz));
        let grouped = vec![
            PolicyRule::new()
                .verbs(["*"])
                .api_groups(["apps"])
                .resources(["*"]),
        ];
        assert!(!covers(&grouped, &healthz));
    }

    #[test]
    fn narrower_verb_set_is_covered() {
        let held = vec![pods(&["get", "list"])];
        assert!(covers(&held, &pods(&["get"])));
        assert!(covers(&held, &pods(&["list", "get"])));
    }

    #[test]
    fn missing_verb_is_not_covered() {
        let held = vec![pods(&["get", "list"])];
        assert!(!covers(&held, &pods(&["delete"])));
        assert!(!covers(&held, &pods(&["get", "delete"])));
    }

    #[test]
    fn candidate_wildcard_needs_owner_wildcard() {
        let held = vec![pods(&["get", "list", "watch", "create", "delete"])];
        assert!(!covers(&held, &pods(&["*"])));
    }

    #[test]
    fn split_coverage_across_rules_does_not_count() {
        let held = vec![pods(&["get"]), pods(&["list"])];
        assert!(covers(&held, &pods(&["get"])));
        assert!(!covers(&held, &pods(&["get", "list"])));
    }

    #[test]
    fn api_group_must_match() {
        let held = vec![
            PolicyRule::new()
                .verbs(["get"])
                .api_groups(["apps"])
                .resources(["pods"]),
        ];
        assert!(!covers(&held, &pods(&["get"])));
    }

    #[test]
    fn resource_names_empty_owner_grants_all_names() {
        let held = vec![pods(&["get"])];
        let named = pods(&["get"]).resource_names(["api-0", "api-1"]);
        assert!(covers(&held, &named));
    }

    #[test]
    fn resource_names_restricted_owner() {
        let held = vec![pods(&["get"]).resource_names(["api-0", "api-1"])];
        assert!(covers(&held, &pods(&["get"]).resource_names(["api-0"])));
        assert!(!covers(&held, &pods(&["get"]).resource_names(["api-2"])));
        // Unrestricted candidate asks for every name.
        assert!(!covers(&held, &pods(&["get"])));
    }

    #[test]
    fn resource_names_wildcard_owner() {
        let held = vec![pods(&["get"]).resource_names(["*"])];
        assert!(covers(&held, &pods(&["get"])));
    }

    #[test]
    fn subresource_forms() {
        // `pods/*` names no real subresource, so it grants none of them.
        let literal_pods_star = vec![
            PolicyRule::new()
                .verbs(["get"])
                .api_groups([""])
                .resources(["pods/*"]),
        ];
        let log = PolicyRule::new()
            .verbs(["get"])
            .api_groups([""])
            .resources(["pods/log"]);
        assert!(!covers(&literal_pods_star, &log));
        assert!(!covers(&literal_pods_star, &log.clone().resources(["pods/exec"])));
        assert!(!covers(&literal_pods_star, &pods(&["get"])));
        assert!(covers(&literal_pods_star, &log.clone().resources(["pods/*"])));

        let exact_log = vec![log.clone()];
        assert!(covers(&exact_log, &log));

        let every_scale = vec![
            PolicyRule::new()
                .verbs(["update"])
                .api_groups(["*"])
                .resources(["*/scale"]),
        ];
        let deployment_scale = PolicyRule::new()
            .verbs(["update"])
            .api_groups(["apps"])
            .resources(["deployments/scale"]);
        assert!(covers(&every_scale, &deployment_scale));
        let deployment_status = deployment_scale.clone().resources(["deployments/status"]);
        assert!(!covers(&every_scale, &deployment_status));
    }

    #[test]
    fn non_resource_url_prefix() {
        let held = vec![
            PolicyRule::new()
                .verbs(["get"])
                .non_resource_urls(["/metrics", "/debug/*"]),
        ];
        let metrics = PolicyRule::new().verbs(["get"]).non_resource_urls(["/metrics"]);
        let pprof = PolicyRule::new()
            .verbs(["get"])
            .non_resource_urls(["/debug/pprof"]);
        let healthz = PolicyRule::new().verbs(["get"]).non_resource_urls(["/healthz"]);
        assert!(covers(&held, &metrics));
        assert!(covers(&held, &pprof));
        assert!(!covers(&held, &healthz));
    }

    #[test]
    fn resource_rule_does_not_cover_url_rule() {
        let held = vec![pods(&["get"])];
        let url = PolicyRule::new().verbs(["get"]).non_resource_urls(["/healthz"]);
        assert!(!covers(&held, &url));

        let url_owner = vec![PolicyRule::new().verbs(["get"]).non_resource_urls(["*"])];
        assert!(!covers(&url_owner, &pods(&["get"])));
    }

    #[test]
    fn uncovered_rules_preserve_order() {
        let held = vec![pods(&["get", "list"])];
        let candidates = vec![pods(&["delete"]), pods(&["get"]), pods(&["create"])];
        assert_eq!(
            uncovered_rules(&held, &candidates),
            vec![pods(&["delete"]), pods(&["create"])]
        );
        assert!(!covers_all(&held, &candidates));
        assert!(covers_all(&held, &[pods(&["list"])]));
        assert!(covers_all(&[], &[]));
    }

    #[test]
    fn nothing_covers_against_empty_held() {
        assert!(!covers(&[], &pods(&["get"])));
    }
}

//! Check results, check catalog and per-cluster check settings.
//!
//! Holds the wire models plus the pure transforms behind the results
//! table: grouping a flat result list into named groups, deriving the
//! visible subset for an active status-filter set, and resolving the
//! cell for every expected host column.

use crate::sap::client::{urlencode, ApiResult, Client};
use crate::types::HealthStatus;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ── Wire models ──

/// Result of one check on one host.
#[derive(Debug, Clone, Deserialize)]
pub struct HostResult {
    #[serde(default)]
    pub result: HealthStatus,
    #[serde(default)]
    pub msg: String,
}

/// One check with its per-host outcomes. `hosts` may be sparse relative
/// to the cluster host set; absent hosts resolve to `Unknown`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckResult {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub hosts: HashMap<String, HostResult>,
}

/// Whether a cluster host answered the check execution at all.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterHost {
    #[serde(default)]
    pub reachable: bool,
    #[serde(default)]
    pub msg: String,
}

/// Response of `GET /api/checks/<clusterId>/results`. The host map is
/// ordered so the table columns are deterministic.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterResults {
    #[serde(default)]
    pub checks: Vec<CheckResult>,
    #[serde(default)]
    pub hosts: BTreeMap<String, ClusterHost>,
}

/// A named display group of checks. Derived, never persisted.
#[derive(Debug, Clone)]
pub struct CheckGroup {
    pub name: String,
    pub checks: Vec<CheckResult>,
}

// ── Transforms ──

impl CheckResult {
    /// Resolve the table cell for an expected host column. Hosts the
    /// backend omitted (e.g. the check was skipped because the host was
    /// unreachable) render as `Unknown` with no message.
    pub fn host_cell(&self, hostname: &str) -> (HealthStatus, &str) {
        match self.hosts.get(hostname) {
            Some(host) => (host.result, host.msg.as_str()),
            None => (HealthStatus::Unknown, ""),
        }
    }

    /// A check is visible when no filter is active, or when at least one
    /// of its per-host results matches a selected status.
    pub fn matches_filter(&self, filters: &[HealthStatus]) -> bool {
        filters.is_empty() || self.hosts.values().any(|h| filters.contains(&h.result))
    }
}

/// Organize a flat result list into groups, preserving the first-seen
/// order of groups and the relative order of checks within each group.
/// No check is dropped or duplicated; empty input yields no groups.
pub fn group_checks(checks: Vec<CheckResult>) -> Vec<CheckGroup> {
    let mut groups: Vec<CheckGroup> = Vec::new();
    for check in checks {
        match groups.iter_mut().find(|g| g.name == check.group) {
            Some(group) => group.checks.push(check),
            None => groups.push(CheckGroup {
                name: check.group.clone(),
                checks: vec![check],
            }),
        }
    }
    groups
}

/// Derive the visible groups for the active filter set. Groups whose
/// check list becomes empty are kept: their header row still renders.
pub fn filter_groups(groups: &[CheckGroup], filters: &[HealthStatus]) -> Vec<CheckGroup> {
    groups
        .iter()
        .map(|group| CheckGroup {
            name: group.name.clone(),
            checks: group
                .checks
                .iter()
                .filter(|c| c.matches_filter(filters))
                .cloned()
                .collect(),
        })
        .collect()
}

// ── Catalog & settings ──

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogCheck {
    pub id: String,
    #[serde(default)]
    pub description: String,
}

/// One catalog group: `GET /api/checks/catalog` returns a list of these.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub group: String,
    #[serde(default)]
    pub checks: Vec<CatalogCheck>,
}

impl CatalogEntry {
    pub fn check_ids(&self) -> Vec<String> {
        self.checks.iter().map(|c| c.id.clone()).collect()
    }
}

/// Response of `GET /api/checks/<clusterId>/settings`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckSettings {
    #[serde(default)]
    pub hostnames: Vec<String>,
    #[serde(default)]
    pub connection_settings: HashMap<String, String>,
    #[serde(default)]
    pub selected_checks: Vec<String>,
}

/// Body of `POST /api/checks/<clusterId>/settings`.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsPayload {
    pub selected_checks: Vec<String>,
    pub connection_settings: HashMap<String, String>,
}

/// Give every hostname a connection-settings entry, keeping the host
/// order; hosts without a stored user get an empty one.
pub fn merge_connection_settings(
    hostnames: &[String],
    existing: &HashMap<String, String>,
) -> Vec<(String, String)> {
    hostnames
        .iter()
        .map(|host| {
            let user = existing.get(host).cloned().unwrap_or_default();
            (host.clone(), user)
        })
        .collect()
}

// ── Endpoints ──

pub fn fetch_catalog(client: &Client) -> ApiResult<Vec<CatalogEntry>> {
    client.get_json("/api/checks/catalog")
}

pub fn fetch_settings(client: &Client, cluster_id: &str) -> ApiResult<CheckSettings> {
    client.get_json(&format!("/api/checks/{}/settings", urlencode(cluster_id)))
}

pub fn save_settings(
    client: &Client,
    cluster_id: &str,
    payload: &SettingsPayload,
) -> ApiResult<()> {
    client.post_json(&format!("/api/checks/{}/settings", urlencode(cluster_id)), payload)
}

pub fn fetch_results(client: &Client, cluster_id: &str) -> ApiResult<ClusterResults> {
    client.get_json(&format!("/api/checks/{}/results", urlencode(cluster_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(id: &str, group: &str, host_results: &[(&str, HealthStatus)]) -> CheckResult {
        CheckResult {
            id: id.to_string(),
            description: format!("{} description", id),
            group: group.to_string(),
            hosts: host_results
                .iter()
                .map(|(host, result)| {
                    (
                        host.to_string(),
                        HostResult {
                            result: *result,
                            msg: String::new(),
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_grouping_preserves_first_seen_order() {
        let checks = vec![
            check("1.1.1", "Corosync", &[]),
            check("1.1.2", "Corosync", &[]),
            check("2.1.1", "Pacemaker", &[]),
            check("1.1.3", "Corosync", &[]),
        ];
        let groups = group_checks(checks);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Corosync");
        assert_eq!(groups[1].name, "Pacemaker");
        let ids: Vec<&str> = groups[0].checks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1.1.1", "1.1.2", "1.1.3"]);
    }

    #[test]
    fn test_grouping_flatten_round_trips() {
        let checks = vec![
            check("a", "G1", &[]),
            check("b", "G2", &[]),
            check("c", "G1", &[]),
            check("d", "G3", &[]),
            check("e", "G2", &[]),
        ];
        let original: Vec<String> = checks.iter().map(|c| c.id.clone()).collect();

        let groups = group_checks(checks);
        let flattened: Vec<String> = groups
            .iter()
            .flat_map(|g| g.checks.iter().map(|c| c.id.clone()))
            .collect();

        // Same set, same length, order preserved within groups
        assert_eq!(flattened.len(), original.len());
        for id in &original {
            assert!(flattened.contains(id));
        }
        assert!(groups.iter().all(|g| !g.checks.is_empty()));
    }

    #[test]
    fn test_grouping_empty_input() {
        assert!(group_checks(Vec::new()).is_empty());
    }

    #[test]
    fn test_missing_host_resolves_unknown() {
        let c = check("a", "G1", &[("node01", HealthStatus::Passing)]);
        let (status, msg) = c.host_cell("node02");
        assert_eq!(status, HealthStatus::Unknown);
        assert_eq!(msg, "");

        let (status, _) = c.host_cell("node01");
        assert_eq!(status, HealthStatus::Passing);
    }

    #[test]
    fn test_filter_inclusive_or_across_hosts() {
        let c = check(
            "a",
            "G1",
            &[
                ("node01", HealthStatus::Passing),
                ("node02", HealthStatus::Critical),
            ],
        );
        // one matching host is enough
        assert!(c.matches_filter(&[HealthStatus::Critical]));
        assert!(c.matches_filter(&[HealthStatus::Critical, HealthStatus::Warning]));
        assert!(!c.matches_filter(&[HealthStatus::Warning]));
        // empty filter set means "show all"
        assert!(c.matches_filter(&[]));
    }

    #[test]
    fn test_filter_toggle_round_trips_visible_set() {
        let groups = group_checks(vec![
            check("a", "G1", &[("h1", HealthStatus::Critical)]),
            check("b", "G1", &[("h1", HealthStatus::Passing)]),
            check("c", "G2", &[("h1", HealthStatus::Warning)]),
        ]);

        let mut filters: Vec<HealthStatus> = Vec::new();
        let before: Vec<usize> = filter_groups(&groups, &filters)
            .iter()
            .map(|g| g.checks.len())
            .collect();

        crate::types::toggle(HealthStatus::Critical, &mut filters);
        let filtered = filter_groups(&groups, &filters);
        assert_eq!(filtered[0].checks.len(), 1);
        assert_eq!(filtered[0].checks[0].id, "a");

        crate::types::toggle(HealthStatus::Critical, &mut filters);
        let after: Vec<usize> = filter_groups(&groups, &filters)
            .iter()
            .map(|g| g.checks.len())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_filter_keeps_emptied_group_header() {
        let groups = group_checks(vec![
            check("a", "G1", &[("h1", HealthStatus::Passing)]),
            check("b", "G2", &[("h1", HealthStatus::Critical)]),
        ]);
        let filtered = filter_groups(&groups, &[HealthStatus::Critical]);

        // G1 has no visible checks but its header entry survives
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].name, "G1");
        assert!(filtered[0].checks.is_empty());
        assert_eq!(filtered[1].checks.len(), 1);
    }

    #[test]
    fn test_results_payload_scenario() {
        let payload = serde_json::json!({
            "checks": [
                {"id": "A", "group": "G1", "hosts": {"h1": {"result": "critical"}}}
            ],
            "hosts": {
                "h1": {"reachable": true},
                "h2": {"reachable": false, "msg": "unreachable"}
            }
        });
        let results: ClusterResults = serde_json::from_value(payload).unwrap();
        let groups = group_checks(results.checks);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "G1");
        assert_eq!(groups[0].checks.len(), 1);

        let row = &groups[0].checks[0];
        assert_eq!(row.host_cell("h1").0, HealthStatus::Critical);
        assert_eq!(row.host_cell("h2"), (HealthStatus::Unknown, ""));

        let h2 = &results.hosts["h2"];
        assert!(!h2.reachable);
        assert_eq!(h2.msg, "unreachable");
    }

    #[test]
    fn test_merge_connection_settings_fills_missing_hosts() {
        let hostnames = vec!["node01".to_string(), "node02".to_string()];
        let mut existing = HashMap::new();
        existing.insert("node01".to_string(), "cluster_admin".to_string());

        let merged = merge_connection_settings(&hostnames, &existing);
        assert_eq!(
            merged,
            vec![
                ("node01".to_string(), "cluster_admin".to_string()),
                ("node02".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_catalog_deserializes() {
        let payload = serde_json::json!([
            {"group": "Corosync", "checks": [
                {"id": "1.1.1", "description": "token timeout"},
                {"id": "1.1.2", "description": "consensus timeout"}
            ]}
        ]);
        let catalog: Vec<CatalogEntry> = serde_json::from_value(payload).unwrap();
        assert_eq!(catalog[0].check_ids(), vec!["1.1.1", "1.1.2"]);
    }
}

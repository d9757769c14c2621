//! SAP system health summary ("at a glance" dashboard data).

use crate::sap::client::{ApiResult, Client};
use crate::types::HealthStatus;
use serde::Deserialize;

/// One row of `GET /api/sapsystems/health`: the aggregated health of a
/// SAP system and everything attached to it.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemHealth {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub sid: String,
    #[serde(default)]
    pub sapsystem_health: HealthStatus,
    #[serde(default)]
    pub database_health: HealthStatus,
    #[serde(default)]
    pub clusters_health: HealthStatus,
    #[serde(default)]
    pub hosts_health: HealthStatus,
}

impl SystemHealth {
    pub fn statuses(&self) -> [HealthStatus; 4] {
        [
            self.sapsystem_health,
            self.database_health,
            self.clusters_health,
            self.hosts_health,
        ]
    }

    fn has(&self, status: HealthStatus) -> bool {
        self.statuses().contains(&status)
    }
}

/// Global counters over the summary rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthCounters {
    pub passing: u32,
    pub warning: u32,
    pub critical: u32,
    pub unknown: u32,
}

/// Classify each system by its worst aggregate health: critical wins over
/// warning, warning over unknown, unknown over passing.
pub fn summarize(rows: &[SystemHealth]) -> HealthCounters {
    let mut counters = HealthCounters::default();
    for row in rows {
        if row.has(HealthStatus::Critical) {
            counters.critical += 1;
        } else if row.has(HealthStatus::Warning) {
            counters.warning += 1;
        } else if row.has(HealthStatus::Unknown) {
            counters.unknown += 1;
        } else if row.has(HealthStatus::Passing) {
            counters.passing += 1;
        }
    }
    counters
}

pub fn fetch_summary(client: &Client) -> ApiResult<Vec<SystemHealth>> {
    client.get_json("/api/sapsystems/health")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(statuses: [HealthStatus; 4]) -> SystemHealth {
        SystemHealth {
            id: "x".into(),
            sid: "PRD".into(),
            sapsystem_health: statuses[0],
            database_health: statuses[1],
            clusters_health: statuses[2],
            hosts_health: statuses[3],
        }
    }

    #[test]
    fn test_summarize_priority() {
        use HealthStatus::*;
        let rows = vec![
            // critical wins even with a warning present
            row([Passing, Warning, Critical, Passing]),
            row([Passing, Warning, Passing, Passing]),
            row([Unknown, Passing, Passing, Passing]),
            row([Passing, Passing, Passing, Passing]),
        ];
        let counters = summarize(&rows);
        assert_eq!(counters.critical, 1);
        assert_eq!(counters.warning, 1);
        assert_eq!(counters.unknown, 1);
        assert_eq!(counters.passing, 1);
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(&[]), HealthCounters::default());
    }

    #[test]
    fn test_summary_row_deserializes() {
        let payload = serde_json::json!({
            "id": "8a0d...",
            "sid": "HA1",
            "sapsystem_health": "passing",
            "database_health": "warning",
            "clusters_health": "critical",
            "hosts_health": "unknown"
        });
        let parsed: SystemHealth = serde_json::from_value(payload).unwrap();
        assert_eq!(parsed.sid, "HA1");
        assert_eq!(parsed.database_health, HealthStatus::Warning);
        assert_eq!(parsed.clusters_health, HealthStatus::Critical);
    }
}

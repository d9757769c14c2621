//! Paginated resource lists (hosts, clusters, SAP systems).
//!
//! A `ListQuery` is the explicit form of what used to be the page URL
//! query string: page, page size, name search and the multi-valued
//! health/SID/tag filters. Changing any field means building the query
//! string again and re-fetching that page.

use crate::sap::client::{urlencode, ApiResult, Client};
use crate::sap::health::HealthCounters;
use crate::types::HealthStatus;
use serde::Deserialize;

/// Page sizes offered by the pagination control.
pub const PER_PAGE_CHOICES: [usize; 4] = [10, 25, 50, 100];

/// The three taggable, listable resource collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Hosts,
    Clusters,
    SapSystems,
}

impl ResourceKind {
    /// List endpoint path.
    pub fn path(&self) -> &'static str {
        match self {
            ResourceKind::Hosts => "/hosts",
            ResourceKind::Clusters => "/clusters",
            ResourceKind::SapSystems => "/sapsystems",
        }
    }

    /// `resource_type` value used by the tag endpoints.
    pub fn resource_type(&self) -> &'static str {
        match self {
            ResourceKind::Hosts => "hosts",
            ResourceKind::Clusters => "clusters",
            ResourceKind::SapSystems => "sapsystems",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Hosts => "Hosts",
            ResourceKind::Clusters => "Clusters",
            ResourceKind::SapSystems => "SAP Systems",
        }
    }
}

/// One row of a resource list. A superset of the three kinds; fields a
/// kind does not provide are defaulted.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceRow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub health: HealthStatus,
    #[serde(default)]
    pub sids: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cluster_type: String,
    #[serde(default)]
    pub hosts_count: u32,
}

/// One fetched page plus the server-side total row count.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPage {
    #[serde(default)]
    pub items: Vec<ResourceRow>,
    #[serde(default)]
    pub total: usize,
}

/// Explicit query state for one list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: usize,
    pub per_page: usize,
    pub name: String,
    pub health: Vec<HealthStatus>,
    pub sids: Vec<String>,
    pub tags: Vec<String>,
}

impl ListQuery {
    pub fn new(per_page: usize) -> Self {
        Self {
            page: 1,
            per_page,
            name: String::new(),
            health: Vec::new(),
            sids: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Build the query string; multi-valued filters repeat the parameter
    /// once per selected value, empty values are skipped.
    pub fn query_string(&self) -> String {
        let mut query = format!("?page={}&per_page={}", self.page, self.per_page);
        for status in &self.health {
            query.push_str(&format!("&health={}", status.as_str()));
        }
        for sid in self.sids.iter().filter(|s| !s.is_empty()) {
            query.push_str(&format!("&sids={}", urlencode(sid)));
        }
        if !self.name.is_empty() {
            query.push_str(&format!("&name={}", urlencode(&self.name)));
        }
        for tag in self.tags.iter().filter(|t| !t.is_empty()) {
            query.push_str(&format!("&tags={}", urlencode(tag)));
        }
        query
    }

    /// True when any filter beyond pagination is active.
    pub fn has_filters(&self) -> bool {
        !self.name.is_empty()
            || !self.health.is_empty()
            || !self.sids.is_empty()
            || !self.tags.is_empty()
    }
}

/// Number of pages for a total row count; at least one page.
pub fn total_pages(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 1;
    }
    (total.max(1) + per_page - 1) / per_page
}

/// Health counts across the currently displayed rows.
pub fn health_counts(rows: &[ResourceRow]) -> HealthCounters {
    let mut counters = HealthCounters::default();
    for row in rows {
        match row.health {
            HealthStatus::Passing => counters.passing += 1,
            HealthStatus::Warning => counters.warning += 1,
            HealthStatus::Critical => counters.critical += 1,
            _ => counters.unknown += 1,
        }
    }
    counters
}

pub fn fetch_page(client: &Client, kind: ResourceKind, query: &ListQuery) -> ApiResult<ListPage> {
    client.get_json(&format!("{}{}", kind.path(), query.query_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_pagination_only() {
        let query = ListQuery::new(25);
        assert_eq!(query.query_string(), "?page=1&per_page=25");
        assert!(!query.has_filters());
    }

    #[test]
    fn test_query_string_repeats_multivalued_params() {
        let mut query = ListQuery::new(10);
        query.page = 3;
        query.health = vec![HealthStatus::Critical, HealthStatus::Warning];
        query.sids = vec!["PRD".into(), "HA1".into()];
        query.tags = vec!["env prod".into()];
        query.name = "node".into();

        assert_eq!(
            query.query_string(),
            "?page=3&per_page=10&health=critical&health=warning\
             &sids=PRD&sids=HA1&name=node&tags=env%20prod"
        );
        assert!(query.has_filters());
    }

    #[test]
    fn test_query_string_skips_empty_values() {
        let mut query = ListQuery::new(10);
        query.sids = vec![String::new()];
        query.tags = vec![String::new()];
        assert_eq!(query.query_string(), "?page=1&per_page=10");
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(100, 25), 4);
    }

    #[test]
    fn test_health_counts() {
        let rows = vec![
            row_with_health(HealthStatus::Passing),
            row_with_health(HealthStatus::Passing),
            row_with_health(HealthStatus::Critical),
            row_with_health(HealthStatus::Skipped),
        ];
        let counters = health_counts(&rows);
        assert_eq!(counters.passing, 2);
        assert_eq!(counters.critical, 1);
        assert_eq!(counters.unknown, 1);
    }

    #[test]
    fn test_list_page_deserializes_sparse_rows() {
        let payload = serde_json::json!({
            "items": [
                {"id": "c1", "name": "hana_cluster", "health": "passing",
                 "sids": ["PRD"], "tags": ["prod"],
                 "cluster_type": "HANA scale-up", "hosts_count": 2},
                {"id": "h1", "name": "node01"}
            ],
            "total": 42
        });
        let page: ListPage = serde_json::from_value(payload).unwrap();
        assert_eq!(page.total, 42);
        assert_eq!(page.items[0].hosts_count, 2);
        assert_eq!(page.items[1].health, HealthStatus::Unknown);
        assert!(page.items[1].tags.is_empty());
    }

    fn row_with_health(health: HealthStatus) -> ResourceRow {
        ResourceRow {
            id: "x".into(),
            name: "x".into(),
            health,
            sids: Vec::new(),
            tags: Vec::new(),
            cluster_type: String::new(),
            hosts_count: 0,
        }
    }
}

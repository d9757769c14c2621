//! Tag endpoints and tag validation.
//!
//! Tags are free-form labels on hosts, clusters and SAP systems. A tag
//! must match the server's accepted pattern before any request is sent.

use crate::sap::client::{urlencode, ApiResult, Client};
use crate::sap::lists::ResourceKind;
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Za-z\s\-_]+$").expect("tag pattern"));

/// Letters, digits, whitespace, dashes and underscores only.
pub fn is_valid(tag: &str) -> bool {
    TAG_PATTERN.is_match(tag)
}

/// Fetch the tag-filter option catalog for one resource collection.
pub fn fetch_catalog(client: &Client, kind: ResourceKind) -> ApiResult<Vec<String>> {
    client.get_json(&format!("/api/tags?resource_type={}", kind.resource_type()))
}

pub fn add(client: &Client, kind: ResourceKind, resource_id: &str, tag: &str) -> ApiResult<()> {
    client.post_json(
        &format!(
            "/api/{}/{}/tags",
            kind.resource_type(),
            urlencode(resource_id)
        ),
        &serde_json::json!({ "tag": tag }),
    )
}

pub fn remove(client: &Client, kind: ResourceKind, resource_id: &str, tag: &str) -> ApiResult<()> {
    client.delete(&format!(
        "/api/{}/{}/tags/{}",
        kind.resource_type(),
        urlencode(resource_id),
        urlencode(tag)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tags() {
        assert!(is_valid("prod"));
        assert!(is_valid("env prod-1_a"));
        assert!(is_valid("HANA 2"));
    }

    #[test]
    fn test_invalid_tags() {
        assert!(!is_valid(""));
        assert!(!is_valid("a,b"));
        assert!(!is_valid("semi;colon"));
        assert!(!is_valid("slash/"));
        assert!(!is_valid("ümlaut"));
    }
}

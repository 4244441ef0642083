//! Tag list parsing and post-tag reconciliation.

use std::collections::HashSet;

use crate::domain::entities::TagRecord;

/// Longest tag name accepted; longer names are truncated on a char boundary.
pub const MAX_TAG_NAME_CHARS: usize = 50;

/// Parse a raw comma-separated tag string into trimmed, non-empty, unique
/// names. Order of first appearance is preserved.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for part in raw.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        let name: String = trimmed.chars().take(MAX_TAG_NAME_CHARS).collect();
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }

    names
}

/// Render a post's tags back into the editable comma-separated form.
pub fn join_tag_list(tags: &[TagRecord]) -> String {
    tags.iter()
        .map(|tag| tag.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Changes required to bring a post's tags in line with a requested list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSyncPlan {
    /// Names to look up (or create) and attach.
    pub attach: Vec<String>,
    /// Currently attached tags that must be detached. Each one is deleted if
    /// no other post references it afterwards.
    pub detach: Vec<TagRecord>,
}

impl TagSyncPlan {
    pub fn is_noop(&self) -> bool {
        self.attach.is_empty() && self.detach.is_empty()
    }
}

/// Compute the attach/detach sets for a post currently carrying `current`
/// that should end up carrying exactly `requested` (already parsed).
pub fn plan_tag_sync(current: &[TagRecord], requested: &[String]) -> TagSyncPlan {
    let current_names: HashSet<&str> = current.iter().map(|tag| tag.name.as_str()).collect();
    let requested_names: HashSet<&str> = requested.iter().map(String::as_str).collect();

    let attach = requested
        .iter()
        .filter(|name| !current_names.contains(name.as_str()))
        .cloned()
        .collect();

    let detach = current
        .iter()
        .filter(|tag| !requested_names.contains(tag.name.as_str()))
        .cloned()
        .collect();

    TagSyncPlan { attach, detach }
}

//! Substring search over the goal hierarchy with upward propagation
//!
//! An OKR matches when its own text matches or when any descendant does, so
//! a hit deep in the tree keeps its whole ancestor chain visible.

use std::collections::{HashMap, HashSet};

use crate::core::hierarchy::HierarchyIndex;
use crate::entities::Okr;

/// Case-insensitive match against objective, key result metric names, area and owner
pub fn matches_directly(okr: &Okr, query: &str) -> bool {
    let needle = query.to_lowercase();
    let hit = |text: &str| text.to_lowercase().contains(&needle);

    hit(&okr.objective)
        || okr.key_results.iter().any(|kr| hit(&kr.metric_name))
        || okr.area.as_deref().is_some_and(hit)
        || okr.owner.as_deref().is_some_and(hit)
}

/// Whether `okr` or any of its descendants matches `query`
pub fn matches(okr: &Okr, all: &[Okr], query: &str) -> bool {
    SearchIndex::new(all, query).matches(&okr.id)
}

/// Memoized search over one snapshot of the hierarchy
pub struct SearchIndex<'a> {
    index: HierarchyIndex<'a>,
    query: String,
    memo: HashMap<&'a str, bool>,
}

impl<'a> SearchIndex<'a> {
    pub fn new(all: &'a [Okr], query: &str) -> Self {
        Self {
            index: HierarchyIndex::new(all),
            query: query.to_string(),
            memo: HashMap::new(),
        }
    }

    pub fn hierarchy(&self) -> &HierarchyIndex<'a> {
        &self.index
    }

    /// Direct match, or a match anywhere below `id`
    pub fn matches(&mut self, id: &str) -> bool {
        let Some(start) = self.index.get(id) else {
            return false;
        };
        if let Some(&known) = self.memo.get(start.id.as_str()) {
            return known;
        }

        // Iterative DFS; each subtree node is evaluated at most once
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&'a Okr> = vec![start];
        let mut found = false;
        while let Some(node) = stack.pop() {
            if !visited.insert(node.id.as_str()) {
                continue;
            }
            if let Some(&known) = self.memo.get(node.id.as_str()) {
                if known {
                    found = true;
                    break;
                }
                continue;
            }
            if matches_directly(node, &self.query) {
                self.memo.insert(node.id.as_str(), true);
                found = true;
                break;
            }
            stack.extend(self.index.children(&node.id).iter().copied());
        }

        self.memo.insert(start.id.as_str(), found);
        found
    }

    /// Ids of every OKR that matches, in hierarchy order
    pub fn matching_ids(&mut self) -> Vec<String> {
        let ids: Vec<&'a str> = self
            .index
            .flatten()
            .into_iter()
            .map(|(_, okr)| okr.id.as_str())
            .collect();
        ids.into_iter()
            .filter(|id| self.matches(id))
            .map(str::to_string)
            .collect()
    }
}

/// OKRs that should render expanded: every match plus its direct children,
/// unioned with what the user expanded by hand. An empty query forces nothing.
pub fn expanded_ids(all: &[Okr], query: &str, manual: &HashSet<String>) -> HashSet<String> {
    let mut expanded = manual.clone();
    if query.trim().is_empty() {
        return expanded;
    }

    let mut search = SearchIndex::new(all, query);
    for okr in all {
        if search.matches(&okr.id) {
            expanded.insert(okr.id.clone());
            for child in search.hierarchy().children(&okr.id) {
                expanded.insert(child.id.clone());
            }
        }
    }
    expanded
}

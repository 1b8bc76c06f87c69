//! Goal hierarchy index: parent/child lookups, cascade resolution and ordering
//!
//! OKRs are stored as a flat list with parent pointers. Every traversal here
//! goes through an explicit id index and tracks visited nodes, so malformed
//! data (dangling parents, cycles) terminates instead of recursing forever.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::core::identity::display_number;
use crate::entities::Okr;

/// Id and children index over a borrowed slice of OKRs
pub struct HierarchyIndex<'a> {
    by_id: HashMap<&'a str, &'a Okr>,
    children: HashMap<&'a str, Vec<&'a Okr>>,
    roots: Vec<&'a Okr>,
}

impl<'a> HierarchyIndex<'a> {
    /// Build the index once per read; children keep input order
    pub fn new(okrs: &'a [Okr]) -> Self {
        let mut by_id = HashMap::with_capacity(okrs.len());
        let mut children: HashMap<&str, Vec<&Okr>> = HashMap::new();
        let mut roots = Vec::new();

        for okr in okrs {
            by_id.insert(okr.id.as_str(), okr);
            match okr.parent_id.as_deref() {
                Some(parent_id) => children.entry(parent_id).or_default().push(okr),
                None => roots.push(okr),
            }
        }

        Self {
            by_id,
            children,
            roots,
        }
    }

    pub fn get(&self, id: &str) -> Option<&'a Okr> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// OKRs without a parent
    pub fn roots(&self) -> &[&'a Okr] {
        &self.roots
    }

    /// Direct children of `id`
    pub fn children(&self, id: &str) -> &[&'a Okr] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// OKRs whose parent does not exist
    pub fn orphans(&self) -> Vec<&'a Okr> {
        self.by_id
            .values()
            .filter(|okr| {
                okr.parent_id
                    .as_deref()
                    .is_some_and(|parent_id| !self.by_id.contains_key(parent_id))
            })
            .copied()
            .collect()
    }

    /// `id` plus every OKR transitively parented under it
    pub fn descendants(&self, id: &str) -> HashSet<String> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut stack = vec![id.to_string()];

        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for child in self.children(&current) {
                if !visited.contains(&child.id) {
                    stack.push(child.id.clone());
                }
            }
        }

        visited
    }

    /// Parent chain of `id`, nearest first. Stops at a missing parent or a cycle.
    pub fn ancestors(&self, id: &str) -> Vec<&'a Okr> {
        let mut chain = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(id);

        let mut current = self.get(id).and_then(|okr| okr.parent_id.as_deref());
        while let Some(parent_id) = current {
            if !seen.insert(parent_id) {
                break;
            }
            match self.get(parent_id) {
                Some(parent) => {
                    chain.push(parent);
                    current = parent.parent_id.as_deref();
                }
                None => break,
            }
        }

        chain
    }

    /// Number of ancestors above `id`
    pub fn depth(&self, id: &str) -> usize {
        self.ancestors(id).len()
    }

    /// Whether re-parenting `id` under `new_parent` would close a loop
    pub fn would_create_cycle(&self, id: &str, new_parent: &str) -> bool {
        if id == new_parent {
            return true;
        }
        self.ancestors(new_parent).iter().any(|okr| okr.id == id)
    }

    /// Ids forming the first parent-pointer cycle found, if any
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut cleared: HashSet<&str> = HashSet::new();

        let mut ids: Vec<&str> = self.by_id.keys().copied().collect();
        ids.sort_unstable();

        for start in ids {
            let mut path: Vec<&str> = Vec::new();
            let mut on_path: HashSet<&str> = HashSet::new();
            let mut current = Some(start);

            while let Some(id) = current {
                if cleared.contains(id) {
                    break;
                }
                if !on_path.insert(id) {
                    let begin = path.iter().position(|&p| p == id).unwrap_or(0);
                    return Some(path[begin..].iter().map(|s| s.to_string()).collect());
                }
                path.push(id);
                current = self
                    .get(id)
                    .and_then(|okr| okr.parent_id.as_deref())
                    .filter(|parent_id| self.contains(parent_id));
            }

            cleared.extend(path);
        }

        None
    }

    /// Depth-first walk for tree rendering: roots, then orphans, each followed
    /// by its subtree. Nodes only reachable through a cycle are appended last.
    pub fn flatten(&self) -> Vec<(usize, &'a Okr)> {
        let mut out = Vec::with_capacity(self.by_id.len());
        let mut visited: HashSet<&str> = HashSet::new();

        let mut starts: Vec<&Okr> = self.roots.clone();
        let mut orphans = self.orphans();
        orphans.sort_by(|a, b| display_order(a, b));
        starts.extend(orphans);

        for start in starts {
            self.walk(start, 0, &mut visited, &mut out);
        }

        if visited.len() < self.by_id.len() {
            let mut rest: Vec<&Okr> = self
                .by_id
                .values()
                .filter(|okr| !visited.contains(okr.id.as_str()))
                .copied()
                .collect();
            rest.sort_by(|a, b| display_order(a, b));
            for okr in rest {
                self.walk(okr, 0, &mut visited, &mut out);
            }
        }

        out
    }

    fn walk(
        &self,
        okr: &'a Okr,
        depth: usize,
        visited: &mut HashSet<&'a str>,
        out: &mut Vec<(usize, &'a Okr)>,
    ) {
        let mut stack = vec![(depth, okr)];
        while let Some((depth, node)) = stack.pop() {
            if !visited.insert(node.id.as_str()) {
                continue;
            }
            out.push((depth, node));
            for child in self.children(&node.id).iter().rev() {
                stack.push((depth + 1, *child));
            }
        }
    }
}

/// Every OKR id removed when `target_id` is deleted, including the target
pub fn collect_descendants(target_id: &str, all: &[Okr]) -> HashSet<String> {
    HierarchyIndex::new(all).descendants(target_id)
}

/// The single read ordering applied by both adapters: roots first, ascending
/// by display-id number (unnumbered roots last), then children; remaining
/// ties broken by `created_at`, then `id`.
pub fn display_order(a: &Okr, b: &Okr) -> Ordering {
    fn rank(okr: &Okr) -> (bool, u64) {
        let number = okr
            .display_id
            .as_deref()
            .and_then(display_number)
            .unwrap_or(u64::MAX);
        (okr.parent_id.is_some(), number)
    }

    rank(a)
        .cmp(&rank(b))
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_okrs(okrs: &mut [Okr]) {
    okrs.sort_by(display_order);
}

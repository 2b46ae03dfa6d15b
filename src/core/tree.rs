use crate::domain::model::Location;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct TreeNode {
    location: Location,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Arena of locations built from the flat parent-pointer table.
///
/// Nodes live in a `Vec` and refer to each other by index. Locations whose
/// parent reference does not resolve are kept as orphans rather than being
/// promoted to roots.
#[derive(Debug, Clone)]
pub struct LocationTree {
    nodes: Vec<TreeNode>,
    by_id: HashMap<String, usize>,
    by_slug: HashMap<String, Vec<usize>>,
    roots: Vec<usize>,
    orphans: Vec<usize>,
    loaded_at: DateTime<Utc>,
}

impl LocationTree {
    pub fn from_locations(locations: Vec<Location>) -> Self {
        let mut nodes = Vec::with_capacity(locations.len());
        let mut by_id = HashMap::with_capacity(locations.len());

        for location in locations {
            if by_id.contains_key(&location.id) {
                tracing::warn!("Duplicate location id '{}' ignored", location.id);
                continue;
            }
            by_id.insert(location.id.clone(), nodes.len());
            nodes.push(TreeNode {
                location,
                parent: None,
                children: Vec::new(),
            });
        }

        let mut roots = Vec::new();
        let mut orphans = Vec::new();
        for idx in 0..nodes.len() {
            let parent = match nodes[idx].location.parent_id.as_deref() {
                None => {
                    roots.push(idx);
                    continue;
                }
                Some(parent_id) => by_id.get(parent_id).copied(),
            };
            match parent {
                Some(parent_idx) => {
                    nodes[idx].parent = Some(parent_idx);
                    nodes[parent_idx].children.push(idx);
                }
                None => orphans.push(idx),
            }
        }

        let by_name = |nodes: &[TreeNode], a: &usize, b: &usize| {
            let (a, b) = (&nodes[*a].location, &nodes[*b].location);
            a.name.cmp(&b.name).then_with(|| a.slug.cmp(&b.slug))
        };
        for idx in 0..nodes.len() {
            let mut children = std::mem::take(&mut nodes[idx].children);
            children.sort_by(|a, b| by_name(nodes.as_slice(), a, b));
            nodes[idx].children = children;
        }
        roots.sort_by(|a, b| by_name(nodes.as_slice(), a, b));

        let mut tree = Self {
            nodes,
            by_id,
            by_slug: HashMap::new(),
            roots,
            orphans,
            loaded_at: Utc::now(),
        };
        tree.index_slugs();

        if !tree.orphans.is_empty() {
            tracing::warn!(
                "{} location(s) reference a missing parent",
                tree.orphans.len()
            );
        }
        tracing::debug!(
            "Built location tree: {} nodes, {} roots",
            tree.nodes.len(),
            tree.roots.len()
        );
        tree
    }

    // Shallowest match first, so a bare slug prefers the broadest location.
    fn index_slugs(&mut self) {
        let mut by_slug: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, node) in self.nodes.iter().enumerate() {
            by_slug
                .entry(node.location.slug.clone())
                .or_default()
                .push(idx);
        }
        for candidates in by_slug.values_mut() {
            candidates.sort_by_key(|idx| (self.depth_of(*idx), self.nodes[*idx].location.name.clone()));
        }
        self.by_slug = by_slug;
    }

    fn depth_of(&self, idx: usize) -> usize {
        let mut depth = 1;
        let mut current = self.nodes[idx].parent;
        while let Some(parent) = current {
            if depth > self.nodes.len() {
                break;
            }
            depth += 1;
            current = self.nodes[parent].parent;
        }
        depth
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn get(&self, id: &str) -> Option<&Location> {
        self.by_id.get(id).map(|idx| &self.nodes[*idx].location)
    }

    /// Identifier match first, then slug.
    pub fn find(&self, key: &str) -> Option<&Location> {
        self.get(key).or_else(|| {
            self.by_slug
                .get(key)
                .and_then(|candidates| candidates.first())
                .map(|idx| &self.nodes[*idx].location)
        })
    }

    /// Direct children ordered by name; empty for unknown ids.
    pub fn children(&self, id: &str) -> Vec<&Location> {
        self.by_id
            .get(id)
            .map(|idx| {
                self.nodes[*idx]
                    .children
                    .iter()
                    .map(|child| &self.nodes[*child].location)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn roots(&self) -> Vec<&Location> {
        self.roots.iter().map(|idx| &self.nodes[*idx].location).collect()
    }

    pub fn orphans(&self) -> Vec<&Location> {
        self.orphans.iter().map(|idx| &self.nodes[*idx].location).collect()
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.nodes.iter().map(|node| &node.location)
    }
}

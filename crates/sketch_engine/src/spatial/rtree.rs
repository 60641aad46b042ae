//! Region tree spatial partitioning structure
//!
//! Divides the 2D world into a hierarchy of rectangular regions. A node
//! keeps up to `node_capacity` entries of its own; once full, it grows a
//! fixed grid of `divisions × divisions` child nodes and forwards further
//! entries to whichever child contains them. Entries already held by a
//! node are never moved down.
//!
//! The tree is meant to be rebuilt from scratch every frame: positions
//! change constantly and entries are cheap, so there is no removal or
//! rebalancing.

use crate::core::config::SpatialConfig;
use crate::foundation::math::{Rect, Vec2};

/// Entry stored in the tree: a position plus caller data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionEntry<T> {
    /// World-space position used for containment tests
    pub position: Vec2,
    /// Caller data returned by queries
    pub payload: T,
}

/// Single node in the region tree hierarchy
#[derive(Debug, Clone)]
pub struct RegionNode<T> {
    /// World-space area covered by this node
    pub bounds: Rect,

    /// Entries held directly by this node
    pub entries: Vec<RegionEntry<T>>,

    /// Grid of child nodes, empty until the node subdivides
    pub children: Vec<RegionNode<T>>,

    /// Depth in the tree (0 = root)
    pub depth: u32,
}

impl<T: Clone> RegionNode<T> {
    /// Create a new leaf node
    pub fn new(bounds: Rect, depth: u32) -> Self {
        Self {
            bounds,
            entries: Vec::new(),
            children: Vec::new(),
            depth,
        }
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Split this node's area into a `divisions × divisions` grid of children
    fn subdivide(&mut self, divisions: usize) {
        if !self.children.is_empty() {
            return;
        }

        #[allow(clippy::cast_precision_loss)]
        let cells = divisions as f32;
        let cell_w = self.bounds.w / cells;
        let cell_h = self.bounds.h / cells;

        self.children.reserve(divisions * divisions);
        for column in 0..divisions {
            for row in 0..divisions {
                #[allow(clippy::cast_precision_loss)]
                let area = Rect::new(
                    self.bounds.x + column as f32 * cell_w,
                    self.bounds.y + row as f32 * cell_h,
                    cell_w,
                    cell_h,
                );
                self.children.push(RegionNode::new(area, self.depth + 1));
            }
        }
    }

    /// Insert an entry into this node, returns false if it lies outside
    pub fn insert(&mut self, entry: RegionEntry<T>, config: &SpatialConfig) -> bool {
        if !self.bounds.contains_point(entry.position) {
            return false;
        }

        if self.entries.len() < config.node_capacity || self.depth >= config.max_depth {
            self.entries.push(entry);
            return true;
        }

        self.subdivide(config.divisions);

        // Half-open cells never overlap, so at most one child accepts the
        // entry. Float rounding at the far edge can leave it with none.
        if let Some(child) = self
            .children
            .iter_mut()
            .find(|child| child.bounds.contains_point(entry.position))
        {
            return child.insert(entry, config);
        }

        self.entries.push(entry);
        true
    }

    /// Append every payload whose position lies inside `area`
    pub fn query(&self, area: &Rect, results: &mut Vec<T>) {
        if !area.overlaps(&self.bounds) {
            return;
        }

        results.extend(
            self.entries
                .iter()
                .filter(|entry| area.contains_point(entry.position))
                .map(|entry| entry.payload.clone()),
        );

        for child in &self.children {
            child.query(area, results);
        }
    }

    /// Count entries in this node and all children
    pub fn count_entries(&self) -> usize {
        self.entries.len() + self.children.iter().map(RegionNode::count_entries).sum::<usize>()
    }

    /// Deepest level reached below and including this node
    pub fn max_depth(&self) -> u32 {
        self.children
            .iter()
            .map(RegionNode::max_depth)
            .max()
            .unwrap_or(self.depth)
    }

    /// Get all leaf nodes (for visualization)
    pub fn get_all_leaves<'a>(&'a self, leaves: &mut Vec<&'a RegionNode<T>>) {
        if self.is_leaf() {
            leaves.push(self);
        } else {
            for child in &self.children {
                child.get_all_leaves(leaves);
            }
        }
    }
}

/// Region tree covering the game world
#[derive(Debug, Clone)]
pub struct RegionTree<T> {
    /// Root node containing the entire world space
    pub root: RegionNode<T>,

    /// Configuration
    config: SpatialConfig,
}

impl<T: Clone> Default for RegionTree<T> {
    fn default() -> Self {
        Self::new(SpatialConfig::default())
    }
}

impl<T: Clone> RegionTree<T> {
    /// Create a new tree covering `config.world_bounds`
    pub fn new(config: SpatialConfig) -> Self {
        Self {
            root: RegionNode::new(config.world_bounds, 0),
            config,
        }
    }

    /// Create a tree over `bounds` with default capacity and divisions
    pub fn with_bounds(bounds: Rect) -> Self {
        Self::new(SpatialConfig::new(bounds))
    }

    /// Configuration the tree was built with
    pub fn config(&self) -> &SpatialConfig {
        &self.config
    }

    /// Area covered by the root node
    pub fn bounds(&self) -> Rect {
        self.root.bounds
    }

    /// Drop every entry and collapse back to a single root node
    pub fn reset(&mut self) {
        self.root = RegionNode::new(self.config.world_bounds, 0);
    }

    /// Insert a payload at `position`; positions outside the covered area
    /// are ignored and reported as `false`
    pub fn insert(&mut self, position: Vec2, payload: T) -> bool {
        self.root.insert(RegionEntry { position, payload }, &self.config)
    }

    /// Append to `results` every payload whose position lies inside `area`
    pub fn query(&self, area: &Rect, results: &mut Vec<T>) {
        self.root.query(area, results);
    }

    /// Convenience wrapper around [`Self::query`] returning a fresh vector
    pub fn query_area(&self, area: &Rect) -> Vec<T> {
        let mut results = Vec::new();
        self.query(area, &mut results);
        results
    }

    /// Get total entry count
    pub fn len(&self) -> usize {
        self.root.count_entries()
    }

    /// True when nothing has been inserted since the last reset
    pub fn is_empty(&self) -> bool {
        self.root.entries.is_empty() && self.root.is_leaf()
    }

    /// True once the root node has grown children
    pub fn is_subdivided(&self) -> bool {
        !self.root.is_leaf()
    }

    /// Deepest level currently in the tree (0 when only the root exists)
    pub fn depth(&self) -> u32 {
        self.root.max_depth()
    }

    /// Get all leaf nodes (for visualization)
    pub fn get_all_leaves(&self) -> Vec<&RegionNode<T>> {
        let mut leaves = Vec::new();
        self.root.get_all_leaves(&mut leaves);
        leaves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::vec2;

    fn small_tree() -> RegionTree<usize> {
        RegionTree::with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0))
    }

    /// Deterministic scatter so failures are reproducible
    fn scatter(count: usize, seed: u32) -> Vec<Vec2> {
        let mut state = seed;
        let mut next = move || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            #[allow(clippy::cast_precision_loss)]
            let value = (state >> 8) as f32 / (1u32 << 24) as f32;
            value * 100.0
        };
        (0..count).map(|_| vec2(next(), next())).collect()
    }

    #[test]
    fn test_ninth_point_subdivides_root() {
        let mut tree = small_tree();
        for i in 0..8 {
            #[allow(clippy::cast_precision_loss)]
            let p = vec2(10.0 + i as f32, 10.0);
            tree.insert(p, i);
        }
        assert!(!tree.is_subdivided());

        tree.insert(vec2(90.0, 90.0), 8);
        assert!(tree.is_subdivided());
        assert_eq!(tree.root.children.len(), 16);

        let mut found = tree.query_area(&Rect::new(0.0, 0.0, 100.0, 100.0));
        found.sort_unstable();
        assert_eq!(found, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_outside_points_are_ignored() {
        let mut tree = small_tree();
        assert!(!tree.insert(vec2(-1.0, 50.0), 0));
        assert!(!tree.insert(vec2(100.0, 50.0), 1));
        assert!(tree.insert(vec2(0.0, 0.0), 2));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_reset_empties_tree() {
        let mut tree = small_tree();
        for (i, p) in scatter(40, 7).into_iter().enumerate() {
            tree.insert(p, i);
        }
        assert!(tree.is_subdivided());

        tree.reset();
        assert!(tree.is_empty());
        assert!(!tree.is_subdivided());
        assert!(tree.query_area(&Rect::new(-1000.0, -1000.0, 2000.0, 2000.0)).is_empty());
    }

    #[test]
    fn test_query_matches_brute_force() {
        let points = scatter(300, 42);
        let areas = [
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(12.5, 30.0, 20.0, 45.0),
            Rect::new(-10.0, -10.0, 15.0, 15.0),
            Rect::new(75.0, 75.0, 50.0, 50.0),
            Rect::new(49.0, 0.0, 2.0, 100.0),
        ];

        for (capacity, divisions) in [(1, 2), (3, 3), (8, 4), (32, 5)] {
            let config = SpatialConfig::new(Rect::new(0.0, 0.0, 100.0, 100.0))
                .with_node_capacity(capacity)
                .with_divisions(divisions);
            let mut tree = RegionTree::new(config);
            for (i, p) in points.iter().enumerate() {
                tree.insert(*p, i);
            }
            assert_eq!(tree.len(), points.len());

            for area in &areas {
                let mut found = tree.query_area(area);
                found.sort_unstable();
                let expected: Vec<usize> = points
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| area.contains_point(**p))
                    .map(|(i, _)| i)
                    .collect();
                assert_eq!(found, expected, "capacity {capacity}, divisions {divisions}");
            }
        }
    }

    #[test]
    fn test_insertion_order_does_not_change_results() {
        let points = scatter(120, 3);
        let area = Rect::new(20.0, 20.0, 40.0, 40.0);

        let mut forward = small_tree();
        let mut backward = small_tree();
        for (i, p) in points.iter().enumerate() {
            forward.insert(*p, i);
        }
        for (i, p) in points.iter().enumerate().rev() {
            backward.insert(*p, i);
        }

        let mut a = forward.query_area(&area);
        let mut b = backward.query_area(&area);
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    #[test]
    fn test_boundary_point_goes_to_one_cell() {
        let mut tree = small_tree();
        for i in 0..8 {
            tree.insert(vec2(1.0, 1.0), i);
        }
        // 25.0 is the shared edge between the first two columns
        tree.insert(vec2(25.0, 25.0), 100);
        let holders = tree
            .get_all_leaves()
            .into_iter()
            .filter(|leaf| leaf.entries.iter().any(|e| e.payload == 100))
            .count();
        assert_eq!(holders, 1);
        assert_eq!(tree.query_area(&Rect::new(25.0, 25.0, 1.0, 1.0)), vec![100]);
    }

    #[test]
    fn test_coincident_points_stop_at_max_depth() {
        let config = SpatialConfig::new(Rect::new(0.0, 0.0, 100.0, 100.0))
            .with_node_capacity(1)
            .with_divisions(2);
        let mut tree = RegionTree::new(config);
        for i in 0..50 {
            tree.insert(vec2(10.0, 10.0), i);
        }
        assert_eq!(tree.len(), 50);
        assert!(tree.depth() <= tree.config().max_depth);
    }
}

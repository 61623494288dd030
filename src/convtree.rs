use std::collections::BTreeSet;

use log::{debug, warn};
use uuid::Uuid;

use crate::{
    config::ConvConfig,
    error::Result,
    grid::{normalize, rasterize, smooth},
    point::{total_weight, Point},
    search::cut_indices,
    shapes::Rect,
    stats::{baseline_tags, CellStats},
    util::determine_quadrant,
    P2,
};

/// Adaptive quadtree that cuts cells along low-density lines of their smoothed density grid.
#[derive(Debug)]
pub struct ConvTree {
    root: Node,
    config: ConvConfig,
}

impl ConvTree {
    /// Create a tree covering the rectangle from `start` (minimum corner) to `end`
    /// (maximum corner).
    ///
    /// `initial_points` are stored in the root, which is split right away if they exceed
    /// the configured limits. Initial points outside the rectangle are dropped.
    pub fn new(
        start: P2,
        end: P2,
        config: ConvConfig,
        initial_points: Option<Vec<Point>>,
    ) -> Result<Self> {
        let boundary = Rect::checked(start, end)?;
        config.validate()?;

        let mut points = initial_points.unwrap_or_default();
        let before = points.len();
        points.retain(|p| boundary.contains(&p.position()));
        if points.len() < before {
            warn!(
                "Dropped {} initial points outside of the tree boundary",
                before - points.len()
            );
        }

        let mut root = Node::leaf(boundary, 0, points, CellStats::default());
        root.refresh(&config);
        Ok(Self { root, config })
    }

    /// Insert a point into the leaf whose rectangle contains it.
    ///
    /// With `allow_split` the leaf immediately re-runs the split decision, otherwise the
    /// point is only stored and [`check`](Self::check) can split later.
    ///
    /// **Returns** `false` if the point lies outside the tree boundary
    pub fn insert(&mut self, point: Point, allow_split: bool) -> bool {
        if !self.root.boundary.contains(&point.position()) {
            warn!(
                "Rejecting point ({}, {}) outside of the tree boundary",
                point.x(),
                point.y()
            );
            return false;
        }
        self.root.insert(point, allow_split, &self.config);
        true
    }

    /// Re-run the split decision on every leaf
    pub fn check(&mut self) {
        self.root.check(&self.config);
    }

    /// Empty every leaf while keeping the tree shape and the leaves' statistics
    pub fn clear(&mut self) {
        self.root.clear();
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn config(&self) -> &ConvConfig {
        &self.config
    }

    /// Get the boundary rect of the tree
    pub fn boundary(&self) -> &Rect {
        &self.root.boundary
    }

    /// All leaves, depth first in TopLeft, TopRight, BottomLeft, BottomRight order
    pub fn leaves(&self) -> Vec<&Node> {
        self.root.leaves()
    }

    /// All stored points
    pub fn points(&self) -> Vec<&Point> {
        self.leaves()
            .into_iter()
            .filter_map(Node::points)
            .flatten()
            .collect()
    }
}

/// A node of a [`ConvTree`]: either a leaf holding points or an internal node with
/// exactly four children.
#[derive(Debug)]
pub struct Node {
    id: Uuid,
    depth: usize,
    boundary: Rect,
    content: Content,
}

#[derive(Debug)]
enum Content {
    Leaf {
        points: Vec<Point>,
        stats: CellStats,
    },
    Internal {
        cut: P2,
        children: [Box<Node>; 4],
    },
}

impl Node {
    fn leaf(boundary: Rect, depth: usize, points: Vec<Point>, stats: CellStats) -> Self {
        Self {
            id: Uuid::new_v4(),
            depth,
            boundary,
            content: Content::Leaf { points, stats },
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn boundary(&self) -> &Rect {
        &self.boundary
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.content, Content::Leaf { .. })
    }

    /// Points of a leaf, `None` for internal nodes
    pub fn points(&self) -> Option<&[Point]> {
        match &self.content {
            Content::Leaf { points, .. } => Some(points),
            Content::Internal { .. } => None,
        }
    }

    /// Statistics of a leaf, `None` for internal nodes
    pub fn stats(&self) -> Option<&CellStats> {
        match &self.content {
            Content::Leaf { stats, .. } => Some(stats),
            Content::Internal { .. } => None,
        }
    }

    /// Shared corner of the four children of an internal node
    pub fn cut(&self) -> Option<P2> {
        match &self.content {
            Content::Internal { cut, .. } => Some(*cut),
            Content::Leaf { .. } => None,
        }
    }

    /// Children of an internal node in TopLeft, TopRight, BottomLeft, BottomRight order
    pub fn children(&self) -> Option<[&Node; 4]> {
        match &self.content {
            Content::Internal { children, .. } => {
                let [tl, tr, bl, br] = children;
                Some([&**tl, &**tr, &**bl, &**br])
            }
            Content::Leaf { .. } => None,
        }
    }

    pub fn leaves(&self) -> Vec<&Node> {
        let mut results = Vec::new();
        self.collect_leaves(&mut results);
        results
    }

    fn collect_leaves<'a>(&'a self, results: &mut Vec<&'a Node>) {
        match &self.content {
            Content::Leaf { .. } => results.push(self),
            Content::Internal { children, .. } => {
                for c in children {
                    c.collect_leaves(results);
                }
            }
        }
    }

    fn needs_split(&self, config: &ConvConfig) -> bool {
        match &self.content {
            Content::Leaf { points, .. } => {
                config
                    .limits
                    .should_split(&self.boundary, total_weight(points), self.depth)
            }
            Content::Internal { .. } => false,
        }
    }

    /// Split the leaf if needed, otherwise refresh its statistics and baseline tags
    fn refresh(&mut self, config: &ConvConfig) {
        if self.needs_split(config) {
            self.split(config, None);
            return;
        }
        if let Content::Leaf { points, stats } = &mut self.content {
            stats.update(points);
            if let Some(baseline) = baseline_tags(points) {
                stats.baseline_tags = baseline;
            }
        }
    }

    fn insert(&mut self, point: Point, allow_split: bool, config: &ConvConfig) {
        match &mut self.content {
            Content::Internal { cut, children } => {
                let q = determine_quadrant(cut, &point.position());
                children[q].insert(point, allow_split, config);
                return;
            }
            Content::Leaf { points, .. } => points.push(point),
        }
        if allow_split {
            self.refresh(config);
        }
    }

    fn check(&mut self, config: &ConvConfig) {
        if self.is_leaf() {
            self.refresh(config);
        } else if let Content::Internal { children, .. } = &mut self.content {
            for c in children {
                c.check(config);
            }
        }
    }

    fn clear(&mut self) {
        match &mut self.content {
            Content::Leaf { points, .. } => points.clear(),
            Content::Internal { children, .. } => {
                for c in children {
                    c.clear();
                }
            }
        }
    }

    /// Turn the leaf into an internal node.
    ///
    /// Every leaf created below this node takes `inherited` as its baseline tags, or the
    /// baseline of this node's points when called without one.
    fn split(&mut self, config: &ConvConfig, inherited: Option<BTreeSet<String>>) {
        let (points, stats) = match &mut self.content {
            Content::Leaf { points, stats } => (std::mem::take(points), std::mem::take(stats)),
            Content::Internal { .. } => return,
        };
        let baseline = inherited
            .or_else(|| baseline_tags(&points))
            .unwrap_or(stats.baseline_tags);

        let cut = self.find_cut(&points, config);
        debug!(
            "Splitting node {} at depth {} ({} points) at ({:.3}, {:.3})",
            self.id,
            self.depth,
            points.len(),
            cut.x,
            cut.y
        );

        let mut buckets: [Vec<Point>; 4] = Default::default();
        for point in points {
            buckets[determine_quadrant(&cut, &point.position())].push(point);
        }

        let depth = self.depth + 1;
        let mut buckets = buckets.into_iter();
        let children = self.boundary.split_at(cut).map(|rect| {
            let points = buckets.next().unwrap_or_default();
            let mut child = Node::leaf(rect, depth, points, CellStats::default());
            if child.needs_split(config) {
                child.split(config, Some(baseline.clone()));
            } else if let Content::Leaf { points, stats } = &mut child.content {
                stats.update(points);
                stats.baseline_tags = baseline.clone();
            }
            Box::new(child)
        });

        self.content = Content::Internal { cut, children };
    }

    /// Cut point in real coordinates, derived from the smoothed density grid of `points`
    fn find_cut(&self, points: &[Point], config: &ConvConfig) -> P2 {
        let grid = normalize(rasterize(points, &self.boundary, config.grid_size));
        let smoothed = smooth(grid, &config.kernel, config.iterations);
        let (x, y) = cut_indices(&smoothed);

        let x_step = self.boundary.width() / config.grid_size as f64;
        let y_step = self.boundary.height() / config.grid_size as f64;
        let start = self.boundary.start();
        let cut = P2::new(start.x + x as f64 * x_step, start.y + y as f64 * y_step);
        config.limits.clamp_cut(&self.boundary, cut)
    }
}

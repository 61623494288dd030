use log::{debug, warn};
use uuid::Uuid;

use crate::{
    config::SplitLimits,
    error::Result,
    point::{total_weight, Point},
    shapes::Rect,
    stats::{baseline_tags, CellStats},
    util::determine_quadrant,
    P2,
};

/// Quadtree that always cuts a node at its geometric center.
///
/// It shares the split limits and point routing of the adaptive
/// [`ConvTree`](crate::ConvTree) and serves as its baseline.
#[derive(Debug)]
pub struct QuadTree {
    root: Node,
    limits: SplitLimits,
}

impl QuadTree {
    /// Create a quadtree covering the rectangle from `start` (minimum corner) to `end`
    /// (maximum corner)
    ///
    /// ## Arguments
    /// - `limits`: when a node may split
    /// - `initial_points`: points stored right away; those outside the rectangle are dropped
    pub fn new(
        start: P2,
        end: P2,
        limits: SplitLimits,
        initial_points: Option<Vec<Point>>,
    ) -> Result<Self> {
        let boundary = Rect::checked(start, end)?;
        let mut data = initial_points.unwrap_or_default();
        let before = data.len();
        data.retain(|p| boundary.contains(&p.position()));
        if data.len() < before {
            warn!(
                "Dropped {} initial points outside of the quadtree boundary",
                before - data.len()
            );
        }

        let mut root = Node::external(boundary, 0, data);
        root.check(&limits);
        Ok(Self { root, limits })
    }

    /// Insert a point into the quadtree, splitting its leaf if it became too heavy
    ///
    /// **Returns** a boolean value indicating if the point was inserted successfully
    pub fn insert(&mut self, point: Point) -> bool {
        if !self.root.boundary.contains(&point.position()) {
            warn!(
                "Rejecting point ({}, {}) outside of the quadtree boundary",
                point.x(),
                point.y()
            );
            return false;
        }
        self.root.insert(point, &self.limits);
        true
    }

    /// Re-run the split decision on every leaf
    pub fn check(&mut self) {
        self.root.check(&self.limits);
    }

    /// Empty every leaf while keeping the tree shape
    pub fn clear(&mut self) {
        self.root.clear();
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn limits(&self) -> &SplitLimits {
        &self.limits
    }

    /// Get the boundary rect of the quadtree
    pub fn boundary(&self) -> &Rect {
        &self.root.boundary
    }

    /// All leaves, depth first in TopLeft, TopRight, BottomLeft, BottomRight order
    pub fn leaves(&self) -> Vec<&Node> {
        let mut results = Vec::new();
        self.root.collect_leaves(&mut results);
        results
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

/// QuadTree node
///
/// An `External` node is a leaf holding points and their statistics, an `Internal` node
/// is subdivided into four children.
#[derive(Debug)]
pub struct Node {
    id: Uuid,
    depth: usize,
    boundary: Rect,
    kind: Kind,
}

#[derive(Debug)]
enum Kind {
    Internal { children: [Box<Node>; 4] },
    External { data: Vec<Point>, stats: CellStats },
}

impl Node {
    fn external(boundary: Rect, depth: usize, data: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            depth,
            boundary,
            kind: Kind::External {
                data,
                stats: CellStats::default(),
            },
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

    /// Return the point at the center of the boundary
    pub fn center(&self) -> P2 {
        self.boundary.center()
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, Kind::External { .. })
    }

    /// Points of a leaf, `None` for internal nodes
    pub fn points(&self) -> Option<&[Point]> {
        match &self.kind {
            Kind::External { data, .. } => Some(data),
            Kind::Internal { .. } => None,
        }
    }

    /// Statistics of a leaf as of its last split decision, `None` for internal nodes
    pub fn stats(&self) -> Option<&CellStats> {
        match &self.kind {
            Kind::External { stats, .. } => Some(stats),
            Kind::Internal { .. } => None,
        }
    }

    /// Children of an internal node in TopLeft, TopRight, BottomLeft, BottomRight order
    pub fn children(&self) -> Option<[&Node; 4]> {
        match &self.kind {
            Kind::Internal { children } => {
                let [tl, tr, bl, br] = children;
                Some([&**tl, &**tr, &**bl, &**br])
            }
            Kind::External { .. } => None,
        }
    }

    fn collect_leaves<'a>(&'a self, results: &mut Vec<&'a Node>) {
        match &self.kind {
            Kind::External { .. } => results.push(self),
            Kind::Internal { children } => {
                for c in children {
                    c.collect_leaves(results);
                }
            }
        }
    }

    fn insert(&mut self, point: Point, limits: &SplitLimits) {
        let center = self.center();
        match &mut self.kind {
            Kind::Internal { children } => {
                children[determine_quadrant(&center, &point.position())].insert(point, limits);
                return;
            }
            Kind::External { data, .. } => data.push(point),
        }
        self.check(limits);
    }

    fn check(&mut self, limits: &SplitLimits) {
        let data = match &mut self.kind {
            Kind::Internal { children } => {
                for c in children {
                    c.check(limits);
                }
                return;
            }
            Kind::External { data, stats } => {
                if !limits.should_split(&self.boundary, total_weight(data), self.depth) {
                    stats.update(data);
                    if let Some(baseline) = baseline_tags(data) {
                        stats.baseline_tags = baseline;
                    }
                    return;
                }
                std::mem::take(data)
            }
        };
        self.subdivide(data, limits);
    }

    fn clear(&mut self) {
        match &mut self.kind {
            Kind::External { data, .. } => data.clear(),
            Kind::Internal { children } => {
                for c in children {
                    c.clear();
                }
            }
        }
    }

    /// Chop the node into four quarters, hand `data` to them and split them further
    /// where needed
    fn subdivide(&mut self, data: Vec<Point>, limits: &SplitLimits) {
        let center = self.center();
        debug!(
            "Quartering node {} at depth {} ({} points)",
            self.id,
            self.depth,
            data.len()
        );

        let mut quarters: [Vec<Point>; 4] = Default::default();
        for point in data {
            quarters[determine_quadrant(&center, &point.position())].push(point);
        }

        let depth = self.depth + 1;
        let mut quarters = quarters.into_iter();
        let children = self.boundary.quarter().map(|rect| {
            let mut child = Node::external(rect, depth, quarters.next().unwrap_or_default());
            child.check(limits);
            Box::new(child)
        });
        self.kind = Kind::Internal { children };
    }
}

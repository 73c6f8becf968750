use log::trace;

use crate::models::{Point, Quad, SwarmState};
use crate::utils::{merge_linear, merge_phase, SwarmError, MAX_TREE_DEPTH};

/// Index of a node inside a [`QuadTree`] arena.
pub type NodeId = usize;

/// The root always lives in the first arena slot.
pub const ROOT: NodeId = 0;

/// Child slots, in the order `Quad::subdivide` produces them.
pub const NW: usize = 0;
pub const NE: usize = 1;
pub const SW: usize = 2;
pub const SE: usize = 3;

/// A single quadtree node.
///
/// A node is either empty, a leaf holding exactly one point (its centroid is
/// that point), or an internal node with all four children and an aggregate
/// of everything beneath it.
#[derive(Clone, Debug)]
pub struct QuadNode {
    boundary: Quad,
    children: Option<[NodeId; 4]>,
    is_empty: bool,
    centroid: Point,
    mass: usize,
    depth: usize,
}

impl QuadNode {
    fn new(boundary: Quad, depth: usize) -> Self {
        Self {
            boundary,
            children: None,
            is_empty: true,
            centroid: Point::default(),
            mass: 0,
            depth,
        }
    }

    pub fn boundary(&self) -> Quad {
        self.boundary
    }

    /// Child ids in NW, NE, SW, SE order, or `None` for a leaf.
    pub fn children(&self) -> Option<[NodeId; 4]> {
        self.children
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Mass-weighted position and circular-mean phase of the points beneath this node.
    pub fn centroid(&self) -> Point {
        self.centroid
    }

    /// Number of points beneath this node.
    pub fn mass(&self) -> usize {
        self.mass
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    fn store(&mut self, p: Point) {
        self.centroid = p;
        self.mass = 1;
        self.is_empty = false;
    }

    fn merge(&mut self, p: Point) {
        let c = self.centroid;
        self.centroid = Point::new(
            merge_linear(self.mass, c.x, p.x),
            merge_linear(self.mass, c.y, p.y),
            merge_phase(self.mass, c.phase, p.phase),
        );
        self.mass += 1;
    }
}

/// Barnes-Hut quadtree over a fixed square region, stored as an arena of nodes.
///
/// Nodes are addressed by [`NodeId`]; every node exclusively owns its four
/// children and the whole structure is released when the tree is dropped.
/// A tree is meant to be built from scratch for every force-field evaluation.
///
/// # Examples
///
/// ```
/// use rs_swarm::models::{Point, Quad};
/// use rs_swarm::quadtree::QuadTree;
///
/// let mut tree = QuadTree::new(Quad { cx: 0.0, cy: 0.0, half_size: 2.0 });
/// tree.insert(Point::new(0.5, 0.5, 0.0)).unwrap();
/// tree.insert(Point::new(-0.5, 0.5, 1.0)).unwrap();
///
/// let root = tree.root();
/// assert_eq!(root.mass(), 2);
/// assert!((root.centroid().x - 0.0).abs() < 1e-12);
/// assert!((root.centroid().y - 0.5).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct QuadTree {
    nodes: Vec<QuadNode>,
    max_depth: usize,
}

impl QuadTree {
    /// Creates a tree with a single empty root covering `boundary`.
    pub fn new(boundary: Quad) -> Self {
        Self { nodes: vec![QuadNode::new(boundary, 0)], max_depth: 0 }
    }

    /// Creates an empty tree with room for roughly `points` insertions.
    pub fn with_capacity(boundary: Quad, points: usize) -> Self {
        // Uniform inputs settle near three nodes per point once empty siblings are counted.
        let mut nodes = Vec::with_capacity(points.saturating_mul(3).max(1));
        nodes.push(QuadNode::new(boundary, 0));
        Self { nodes, max_depth: 0 }
    }

    /// Builds a tree by inserting `points` in order.
    ///
    /// Errors carry the index of the offending point.
    pub fn build(points: &[Point], boundary: Quad) -> Result<Self, SwarmError> {
        let mut tree = Self::with_capacity(boundary, points.len());
        for (i, &p) in points.iter().enumerate() {
            tree.insert(p).map_err(|e| e.at_entity(i))?;
        }
        Ok(tree)
    }

    /// Builds a tree from a flat state buffer.
    pub fn from_state(state: SwarmState<'_>, boundary: Quad) -> Result<Self, SwarmError> {
        let mut tree = Self::with_capacity(boundary, state.len());
        for (i, p) in state.points().enumerate() {
            tree.insert(p).map_err(|e| e.at_entity(i))?;
        }
        Ok(tree)
    }

    /// Inserts a point, subdividing leaves and updating aggregates on the way down.
    ///
    /// Fails with `OutOfBounds` when the point is not strictly inside the
    /// root, or when it sits exactly on a seam between two quadrants. After an
    /// error the tree should be discarded.
    pub fn insert(&mut self, p: Point) -> Result<(), SwarmError> {
        let mut id = ROOT;
        loop {
            let QuadNode { boundary, is_empty, children, .. } = self.nodes[id];
            if !boundary.contains(p.x, p.y) {
                return Err(SwarmError::OutOfBounds { entity: None, x: p.x, y: p.y, boundary });
            }

            if is_empty {
                self.nodes[id].store(p);
                return Ok(());
            }

            let children = match children {
                Some(children) => children,
                None => self.split_leaf(id)?,
            };

            self.nodes[id].merge(p);
            id = children[boundary.quadrant_index(p.x, p.y)];
        }
    }

    /// Turns a one-point leaf into an internal node and moves its point down a level.
    fn split_leaf(&mut self, id: NodeId) -> Result<[NodeId; 4], SwarmError> {
        let node = &self.nodes[id];
        let held = node.centroid;
        if node.depth >= MAX_TREE_DEPTH {
            return Err(SwarmError::DegenerateSeparation { x: held.x, y: held.y, depth: node.depth });
        }

        let children = self.subdivide(id);
        let target = [NW, NE, SE, SW]
            .into_iter()
            .map(|slot| children[slot])
            .find(|&child| self.nodes[child].boundary.contains(held.x, held.y))
            .ok_or_else(|| {
                SwarmError::Internal(format!(
                    "point ({}, {}) held by node {} is contained by none of its children",
                    held.x, held.y, id
                ))
            })?;
        self.nodes[target].store(held);
        trace!("split node {} at depth {}", id, self.nodes[id].depth);
        Ok(children)
    }

    fn subdivide(&mut self, id: NodeId) -> [NodeId; 4] {
        let parent = &self.nodes[id];
        let depth = parent.depth + 1;
        let (nw, ne, sw, se) = parent.boundary.subdivide();
        let first = self.nodes.len();
        self.nodes.extend([nw, ne, sw, se].into_iter().map(|q| QuadNode::new(q, depth)));
        let children = [first, first + 1, first + 2, first + 3];
        self.nodes[id].children = Some(children);
        self.max_depth = self.max_depth.max(depth);
        children
    }

    pub fn root(&self) -> &QuadNode {
        &self.nodes[ROOT]
    }

    pub fn node(&self, id: NodeId) -> &QuadNode {
        &self.nodes[id]
    }

    pub fn boundary(&self) -> Quad {
        self.root().boundary
    }

    /// Number of points inserted so far.
    pub fn len(&self) -> usize {
        self.root().mass
    }

    pub fn is_empty(&self) -> bool {
        self.root().is_empty
    }

    /// Number of nodes in the arena, empty ones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest node; a lone root has depth zero.
    pub fn depth(&self) -> usize {
        self.max_depth
    }

    /// Iterates over every node in arena order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &QuadNode)> {
        self.nodes.iter().enumerate()
    }
}

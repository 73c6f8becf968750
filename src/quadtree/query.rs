use crate::quadtree::{NodeId, QuadTree, NE, NW, ROOT, SE, SW};

/// One interaction source produced by a query: a single point or a far-away aggregate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApproxNode {
    pub com_x: f64, // centroid x-coordinate
    pub com_y: f64, // centroid y-coordinate
    pub phase: f64, // circular-mean phase
    pub mass: usize,
}

/// Lazy traversal yielding the sources that act on a receiver at `(x, y)`.
///
/// Produced by [`QuadTree::query`]. The iterator is finite and cannot be
/// restarted; run a new query to traverse again. Sources are produced
/// depth-first with children visited NW, NE, SE, SW.
#[derive(Debug)]
pub struct Query<'t> {
    tree: &'t QuadTree,
    stack: Vec<NodeId>,
    x: f64,
    y: f64,
    theta: f64,
}

impl<'t> Query<'t> {
    fn new(tree: &'t QuadTree, x: f64, y: f64, theta: f64) -> Self {
        let mut stack = Vec::with_capacity(4 * tree.depth() + 4);
        stack.push(ROOT);
        Self { tree, stack, x, y, theta }
    }

    fn is_far(&self, id: NodeId) -> bool {
        let quad = self.tree.node(id).boundary();
        let dx = quad.cx - self.x;
        let dy = quad.cy - self.y;
        let dist = (dx * dx + dy * dy).sqrt();
        quad.width() / dist < self.theta
    }
}

impl Iterator for Query<'_> {
    type Item = ApproxNode;

    fn next(&mut self) -> Option<ApproxNode> {
        let tree = self.tree;
        while let Some(id) = self.stack.pop() {
            let node = tree.node(id);
            if node.is_empty() {
                continue;
            }
            match node.children() {
                Some(children) if !self.is_far(id) => {
                    // Reverse order so NW is popped first.
                    self.stack.extend([children[SW], children[SE], children[NE], children[NW]]);
                }
                _ => {
                    let c = node.centroid();
                    if c.is_at(self.x, self.y) {
                        continue;
                    }
                    return Some(ApproxNode { com_x: c.x, com_y: c.y, phase: c.phase, mass: node.mass() });
                }
            }
        }
        None
    }
}

impl QuadTree {
    /// Sources acting on a receiver at `(x, y)` with opening threshold `theta`.
    ///
    /// A node counts as one source when it is a leaf or when
    /// `width / distance(center, (x, y)) < theta`. A source whose centroid is
    /// exactly `(x, y)` is skipped, so a receiver stored in the tree never
    /// acts on itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_swarm::models::{Point, Quad};
    /// use rs_swarm::quadtree::QuadTree;
    ///
    /// let points = [Point::new(0.3, 0.2, 0.0), Point::new(-0.7, 0.4, 1.0)];
    /// let tree = QuadTree::build(&points, Quad { cx: 0.0, cy: 0.0, half_size: 2.0 }).unwrap();
    ///
    /// let sources: Vec<_> = tree.query(0.3, 0.2, 0.5).collect();
    /// assert_eq!(sources.len(), 1);
    /// assert_eq!(sources[0].com_x, -0.7);
    /// ```
    pub fn query(&self, x: f64, y: f64, theta: f64) -> Query<'_> {
        Query::new(self, x, y, theta)
    }
}

#[allow(clippy::module_inception)]
mod quadtree;
mod query;

pub use quadtree::*;
pub use query::*;

#[cfg(test)]
mod quadtree_tests;

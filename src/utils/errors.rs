use std::error::Error;
use std::fmt;

use crate::models::Quad;

/// Represents errors that can occur while building or evaluating a swarm force field.
#[derive(Debug, Clone, PartialEq)]
pub enum SwarmError {
    /// A point fell outside the boundary of the node it was inserted into.
    /// `entity` is filled in when the point is known to belong to a swarm entity.
    OutOfBounds {
        entity: Option<usize>,
        x: f64,
        y: f64,
        boundary: Quad,
    },
    /// A quadtree invariant was violated; always a logic bug.
    Internal(String),
    /// Coincident (or numerically indistinguishable) points exhausted the tree depth guard.
    DegenerateSeparation { x: f64, y: f64, depth: usize },
    /// A send, receive or collective operation between workers failed.
    Communication(String),
    /// The configuration cannot be used to run a swarm.
    InvalidConfig(String),
    /// Frame or point output could not be written.
    Io(String),
}

impl SwarmError {
    /// Attaches an entity index to an `OutOfBounds` error. Other variants are returned unchanged.
    pub fn at_entity(self, index: usize) -> Self {
        match self {
            SwarmError::OutOfBounds { x, y, boundary, .. } => SwarmError::OutOfBounds {
                entity: Some(index),
                x,
                y,
                boundary,
            },
            other => other,
        }
    }
}

impl fmt::Display for SwarmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SwarmError::OutOfBounds { entity, x, y, boundary } => {
                match entity {
                    Some(i) => write!(f, "Entity {} at ({}, {}) ", i, x, y)?,
                    None => write!(f, "Point ({}, {}) ", x, y)?,
                }
                write!(
                    f,
                    "is outside the region centered at ({}, {}) with half size {}",
                    boundary.cx, boundary.cy, boundary.half_size
                )
            }
            SwarmError::Internal(msg) => write!(f, "Quadtree invariant violated: {}", msg),
            SwarmError::DegenerateSeparation { x, y, depth } => write!(
                f,
                "Points near ({}, {}) cannot be separated after {} subdivisions",
                x, y, depth
            ),
            SwarmError::Communication(msg) => write!(f, "Communication failure: {}", msg),
            SwarmError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            SwarmError::Io(msg) => write!(f, "Output error: {}", msg),
        }
    }
}

impl Error for SwarmError {}

impl From<std::io::Error> for SwarmError {
    fn from(err: std::io::Error) -> Self {
        SwarmError::Io(err.to_string())
    }
}

impl From<csv::Error> for SwarmError {
    fn from(err: csv::Error) -> Self {
        SwarmError::Io(err.to_string())
    }
}

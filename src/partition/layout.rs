use std::ops::Range;

use crate::models::STRIDE;
use crate::utils::SwarmError;

/// Contiguous split of `n` entities over `world_size` workers.
///
/// Every offset derives from `start = rank * (n / world_size)`. The last
/// partition also takes the `n % world_size` leftover entities.
///
/// # Examples
///
/// ```
/// use rs_swarm::partition::PartitionLayout;
///
/// let layout = PartitionLayout::new(10, 4).unwrap();
/// assert_eq!(layout.range(0), 0..2);
/// assert_eq!(layout.range(3), 6..10);
/// assert_eq!(layout.scalar_range(1), 6..12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionLayout {
    n: usize,
    world_size: usize,
}

impl PartitionLayout {
    pub fn new(n: usize, world_size: usize) -> Result<Self, SwarmError> {
        if world_size == 0 || world_size > n {
            return Err(SwarmError::InvalidConfig(format!(
                "cannot split {} entities over {} workers",
                n, world_size
            )));
        }
        Ok(Self { n, world_size })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn world_size(&self) -> usize {
        self.world_size
    }

    /// Entities per partition, excluding the remainder.
    pub fn block(&self) -> usize {
        self.n / self.world_size
    }

    pub fn remainder(&self) -> usize {
        self.n % self.world_size
    }

    pub fn start(&self, rank: usize) -> usize {
        rank * self.block()
    }

    pub fn len(&self, rank: usize) -> usize {
        if rank + 1 == self.world_size {
            self.block() + self.remainder()
        } else {
            self.block()
        }
    }

    pub fn range(&self, rank: usize) -> Range<usize> {
        let start = self.start(rank);
        start..start + self.len(rank)
    }

    /// Range of `rank`'s scalars inside the flat state.
    pub fn scalar_range(&self, rank: usize) -> Range<usize> {
        let r = self.range(rank);
        STRIDE * r.start..STRIDE * r.end
    }

    pub fn check_rank(&self, rank: usize) -> Result<(), SwarmError> {
        if rank >= self.world_size {
            return Err(SwarmError::Communication(format!(
                "rank {} is outside a world of {}",
                rank, self.world_size
            )));
        }
        Ok(())
    }

    /// Fails unless `buffer` has exactly the scalars owned by `rank`.
    pub fn check_buffer(&self, rank: usize, buffer: &[f64]) -> Result<(), SwarmError> {
        let expected = STRIDE * self.len(rank);
        if buffer.len() != expected {
            return Err(SwarmError::Communication(format!(
                "partition {} has {} scalars, expected {}",
                rank,
                buffer.len(),
                expected
            )));
        }
        Ok(())
    }
}

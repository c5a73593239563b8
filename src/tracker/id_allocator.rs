use std::collections::HashSet;

use crate::error::{TrackError, TrackResult};

/// Hands out object identifiers from fixed-width blocks.
///
/// Blocks are scanned in order (`[0, 100)`, `[100, 200)`, ...) and the
/// smallest free identifier of the first block with room is returned.
#[derive(Debug, Clone, Copy)]
pub struct IdAllocator {
    block_size: u32,
    block_count: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            block_size: 100,
            block_count: 9,
        }
    }
}

impl IdAllocator {
    pub fn new(block_size: u32, block_count: u32) -> Self {
        Self {
            block_size,
            block_count,
        }
    }

    /// Total number of identifiers that can be live at once.
    pub fn capacity(&self) -> u32 {
        self.block_size.saturating_mul(self.block_count)
    }

    pub fn allocate(&self, taken: &HashSet<u32>) -> TrackResult<u32> {
        for block in 0..self.block_count {
            let start = block * self.block_size;
            if let Some(id) = (start..start + self.block_size).find(|id| !taken.contains(id)) {
                return Ok(id);
            }
        }
        Err(TrackError::IdsExhausted {
            capacity: self.capacity(),
        })
    }

    /// Allocate `count` distinct identifiers, marking each one as taken.
    pub fn allocate_many(&self, taken: &mut HashSet<u32>, count: usize) -> TrackResult<Vec<u32>> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let id = self.allocate(taken)?;
            taken.insert(id);
            ids.push(id);
        }
        Ok(ids)
    }
}

//! The output of one shaping call

use std::sync::Arc;

use glyphweave_core::types::{Direction, Slot};
use glyphweave_core::{Release, ResourceError, ResourceKind, Result};

#[derive(Debug, PartialEq)]
struct Shaped {
    slots: Vec<Slot>,
    total_advance: f32,
}

/// Positioned glyphs in visual order
///
/// Segments are immutable. Clones share the slot storage, which is what the
/// shaping cache hands out; releasing one clone leaves the others intact.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    direction: Direction,
    shaped: Option<Arc<Shaped>>,
}

impl Segment {
    /// Builds a segment whose total advance is the sum of the slot advances
    pub fn new(slots: Vec<Slot>, direction: Direction) -> Self {
        let total_advance = slots.iter().map(|slot| slot.advance).sum();
        Self {
            direction,
            shaped: Some(Arc::new(Shaped {
                slots,
                total_advance,
            })),
        }
    }

    pub fn empty(direction: Direction) -> Self {
        Self::new(Vec::new(), direction)
    }

    fn shaped(&self) -> Result<&Shaped> {
        self.shaped
            .as_deref()
            .ok_or_else(|| ResourceError::Released(ResourceKind::Segment).into())
    }

    pub fn slots(&self) -> Result<&[Slot]> {
        Ok(&self.shaped()?.slots)
    }

    pub fn total_advance(&self) -> Result<f32> {
        Ok(self.shaped()?.total_advance)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.shaped()?.slots.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.shaped()?.slots.is_empty())
    }

    /// Resolved paragraph direction, never `Auto`
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Glyph ids in visual order
    pub fn glyph_ids(&self) -> Result<Vec<u32>> {
        Ok(self.slots()?.iter().map(|slot| slot.id).collect())
    }
}

impl Release for Segment {
    fn release(&mut self) {
        if self.shaped.take().is_some() {
            log::trace!("Released segment");
        }
    }

    fn is_released(&self) -> bool {
        self.shaped.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: u32, advance: f32) -> Slot {
        Slot {
            id,
            advance,
            x_offset: 0.0,
            y_offset: 0.0,
            cluster: id,
            level: 0,
        }
    }

    #[test]
    fn total_advance_is_the_sum() {
        let segment = Segment::new(
            vec![slot(1, 10.0), slot(2, 5.5), slot(3, 0.0)],
            Direction::LeftToRight,
        );
        assert_eq!(segment.total_advance().unwrap(), 15.5);
        assert_eq!(segment.len().unwrap(), 3);
        assert_eq!(segment.glyph_ids().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn released_clone_does_not_affect_the_original() {
        let segment = Segment::new(vec![slot(1, 10.0)], Direction::RightToLeft);
        let mut copy = segment.clone();
        copy.release();
        copy.release();
        assert!(copy.slots().unwrap_err().is_released());
        assert_eq!(segment.len().unwrap(), 1);
        assert_eq!(copy.direction(), Direction::RightToLeft);
    }

    #[test]
    fn empty_segment_has_no_slots() {
        let segment = Segment::empty(Direction::LeftToRight);
        assert!(segment.is_empty().unwrap());
        assert_eq!(segment.total_advance().unwrap(), 0.0);
    }
}

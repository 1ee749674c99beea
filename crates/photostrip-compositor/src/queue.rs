//! Capture queue: the ordered set of snapshots a session collects before
//! composing.
//!
//! The kiosk front end lets a user take up to three shots, delete any of
//! them, and drag them into a new order. [`CaptureQueue`] holds that
//! state as plain data so the policy lives next to the compositor rather
//! than inside a UI framework. [`compose`](crate::compose) never consults
//! the queue; callers pass [`CaptureQueue::images`] in.

use crate::types::CapturedImage;

/// Number of shots in a standard strip.
pub const DEFAULT_CAPACITY: usize = 3;

/// Stable identifier of a queued capture, unaffected by reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaptureId(u64);

/// Errors from queue operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The queue already holds `capacity` captures.
    #[error("capture queue is full ({capacity} images)")]
    Full {
        /// Maximum number of captures.
        capacity: usize,
    },

    /// A position was outside the queue.
    #[error("position {index} is out of range for {len} captures")]
    OutOfRange {
        /// Requested position.
        index: usize,
        /// Current queue length.
        len: usize,
    },
}

#[derive(Debug, Clone)]
struct Entry {
    id: CaptureId,
    image: CapturedImage,
}

/// Ordered, bounded list of captures.
#[derive(Debug, Clone)]
pub struct CaptureQueue {
    entries: Vec<Entry>,
    capacity: usize,
    next_id: u64,
}

impl Default for CaptureQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl CaptureQueue {
    /// Empty queue holding at most `capacity` captures.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            next_id: 0,
        }
    }

    /// Maximum number of captures.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of queued captures.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been captured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slots left before the strip is complete.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.entries.len())
    }

    /// Returns `true` once the queue is full and ready to compose.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Append a capture.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Full`] if the queue is at capacity.
    pub fn push(&mut self, image: CapturedImage) -> Result<CaptureId, QueueError> {
        if self.is_complete() {
            return Err(QueueError::Full {
                capacity: self.capacity,
            });
        }
        let id = CaptureId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, image });
        Ok(id)
    }

    /// Remove the capture with `id`, returning it if present.
    pub fn remove(&mut self, id: CaptureId) -> Option<CapturedImage> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index).image)
    }

    /// Move the capture at `from` so it ends up at `to`, shifting the
    /// captures in between (drag-and-drop semantics).
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::OutOfRange`] if either position is past the end.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<(), QueueError> {
        let len = self.entries.len();
        for index in [from, to] {
            if index >= len {
                return Err(QueueError::OutOfRange { index, len });
            }
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        Ok(())
    }

    /// Identifiers in current order.
    #[must_use]
    pub fn ids(&self) -> Vec<CaptureId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    /// Captures in current order, ready for [`compose`](crate::compose).
    #[must_use]
    pub fn images(&self) -> Vec<CapturedImage> {
        self.entries.iter().map(|e| e.image.clone()).collect()
    }

    /// Consume the queue, yielding captures in current order.
    #[must_use]
    pub fn into_images(self) -> Vec<CapturedImage> {
        self.entries.into_iter().map(|e| e.image).collect()
    }

    /// Drop every capture. Identifiers are not reused.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{FilterTag, ImageSource};

    fn shot(tag: u8) -> CapturedImage {
        CapturedImage::new(ImageSource::Encoded(vec![tag]), FilterTag::Normal)
    }

    fn tags(queue: &CaptureQueue) -> Vec<u8> {
        queue
            .images()
            .into_iter()
            .map(|img| match img.source {
                ImageSource::Encoded(bytes) => bytes[0],
                ImageSource::DataUri(_) => unreachable!(),
            })
            .collect()
    }

    #[test]
    fn fills_to_capacity_then_rejects() {
        let mut queue = CaptureQueue::default();
        assert_eq!(queue.remaining(), 3);
        for i in 0..3 {
            queue.push(shot(i)).unwrap();
        }
        assert!(queue.is_complete());
        assert_eq!(queue.remaining(), 0);
        assert_eq!(
            queue.push(shot(9)),
            Err(QueueError::Full { capacity: 3 })
        );
    }

    #[test]
    fn remove_by_id_frees_a_slot() {
        let mut queue = CaptureQueue::default();
        let a = queue.push(shot(1)).unwrap();
        let b = queue.push(shot(2)).unwrap();
        queue.push(shot(3)).unwrap();

        assert!(queue.remove(b).is_some());
        assert_eq!(tags(&queue), [1, 3]);
        assert!(!queue.is_complete());
        assert!(queue.remove(b).is_none());
        assert_eq!(queue.ids()[0], a);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut queue = CaptureQueue::default();
        let a = queue.push(shot(1)).unwrap();
        queue.remove(a);
        let b = queue.push(shot(2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn move_item_reorders_like_drag_and_drop() {
        let mut queue = CaptureQueue::default();
        for i in 1..=3 {
            queue.push(shot(i)).unwrap();
        }
        queue.move_item(0, 2).unwrap();
        assert_eq!(tags(&queue), [2, 3, 1]);
        queue.move_item(2, 0).unwrap();
        assert_eq!(tags(&queue), [1, 2, 3]);
        queue.move_item(1, 1).unwrap();
        assert_eq!(tags(&queue), [1, 2, 3]);
    }

    #[test]
    fn move_item_out_of_range_is_rejected() {
        let mut queue = CaptureQueue::default();
        queue.push(shot(1)).unwrap();
        assert_eq!(
            queue.move_item(0, 1),
            Err(QueueError::OutOfRange { index: 1, len: 1 })
        );
        assert_eq!(tags(&queue), [1]);
    }

    #[test]
    fn clear_empties_without_reusing_ids() {
        let mut queue = CaptureQueue::default();
        let first = queue.push(shot(1)).unwrap();
        queue.push(shot(2)).unwrap();
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.remaining(), 3);
        let next = queue.push(shot(3)).unwrap();
        assert!(next > first);
        assert_eq!(tags(&queue), [3]);
    }

    #[test]
    fn into_images_preserves_order() {
        let mut queue = CaptureQueue::with_capacity(2);
        queue.push(shot(7)).unwrap();
        queue.push(shot(8)).unwrap();
        let images = queue.into_images();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].source, ImageSource::Encoded(vec![7]));
    }
}

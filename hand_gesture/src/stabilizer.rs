//! Majority-vote smoothing of the raw per-frame pinch signal.

use std::collections::VecDeque;

use crate::config::MAX_STABILIZER_WINDOW;

/// Sliding window over the last `capacity` raw samples.
///
/// `stabilize` reports true once at least `ceil(capacity / 2)` buffered
/// samples are true.  With `capacity == 1` it is a pass-through.
#[derive(Clone, Debug)]
pub struct GestureStabilizer {
    history:  VecDeque<bool>,
    capacity: usize,
}

impl GestureStabilizer {
    /// `capacity` is clamped to `1..=MAX_STABILIZER_WINDOW`.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_STABILIZER_WINDOW);
        GestureStabilizer {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn stabilize(&mut self, raw: bool) -> bool {
        self.history.push_back(raw);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }
        let votes = self.history.iter().filter(|&&s| s).count();
        votes >= self.quorum()
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub fn capacity(&self) -> usize { self.capacity }
    pub fn len(&self)      -> usize { self.history.len() }
    pub fn is_empty(&self) -> bool  { self.history.is_empty() }

    fn quorum(&self) -> usize {
        self.capacity.div_ceil(2)
    }
}

//! RNG module - deterministic 7-bag piece generation.
//!
//! A small LCG drives the Fisher-Yates bag shuffle so two engines built
//! with the same seed draw bit-identical piece sequences. On top of the
//! bag sits a FIFO preview queue kept topped up to a configurable length
//! so hosts can render upcoming pieces.

use std::collections::VecDeque;

use crate::types::PieceKind;

/// Simple LCG (Linear Congruential Generator) RNG.
/// Uses constants from Numerical Recipes.
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32.
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m, a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max).
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Shuffle a slice using Fisher-Yates.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

/// 7-bag piece generator with a FIFO preview queue.
#[derive(Debug, Clone)]
pub struct PieceQueue {
    /// Remaining pieces of the current bag, drawn front to back.
    bag: Vec<PieceKind>,
    bag_index: usize,
    /// Upcoming pieces, always refilled to `preview_len` after every pop.
    preview: VecDeque<PieceKind>,
    preview_len: usize,
    rng: SimpleRng,
}

impl PieceQueue {
    /// Create a new piece queue with the given seed and preview length.
    pub fn new(seed: u32, preview_len: usize) -> Self {
        let mut queue = Self {
            bag: Vec::with_capacity(7),
            bag_index: 0,
            preview: VecDeque::with_capacity(preview_len),
            preview_len,
            rng: SimpleRng::new(seed),
        };
        queue.refill_bag();
        queue.fill_preview();
        queue
    }

    /// Generate a new shuffled bag.
    fn refill_bag(&mut self) {
        self.bag = PieceKind::ALL.to_vec();
        self.rng.shuffle(&mut self.bag);
        self.bag_index = 0;
    }

    fn draw_from_bag(&mut self) -> PieceKind {
        if self.bag_index >= self.bag.len() {
            self.refill_bag();
        }
        let piece = self.bag[self.bag_index];
        self.bag_index += 1;
        piece
    }

    /// Top the preview up to the configured length.
    fn fill_preview(&mut self) {
        while self.preview.len() < self.preview_len {
            let piece = self.draw_from_bag();
            self.preview.push_back(piece);
        }
    }

    /// Pop the next piece. The preview is refilled before returning so its
    /// length never drops below the configured size.
    pub fn pop(&mut self) -> PieceKind {
        self.fill_preview();
        match self.preview.pop_front() {
            Some(piece) => {
                self.fill_preview();
                piece
            }
            // preview_len is validated > 0, but degrade gracefully.
            None => self.draw_from_bag(),
        }
    }

    /// Upcoming pieces without consuming them, at most `count`.
    pub fn peek(&self, count: usize) -> Vec<PieceKind> {
        self.preview.iter().take(count).copied().collect()
    }

    /// Full preview queue contents, front first.
    pub fn preview(&self) -> Vec<PieceKind> {
        self.preview.iter().copied().collect()
    }

    pub fn preview_len(&self) -> usize {
        self.preview_len
    }

    /// Resize the preview: growing draws more pieces, shrinking truncates.
    pub fn set_preview_len(&mut self, len: usize) {
        self.preview_len = len;
        self.preview.truncate(len);
        self.fill_preview();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);
        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_zero_seed_is_remapped() {
        let mut rng1 = SimpleRng::new(0);
        let mut rng2 = SimpleRng::new(1);
        assert_eq!(rng1.next_u32(), rng2.next_u32());
    }

    #[test]
    fn test_seven_bag_property() {
        let mut queue = PieceQueue::new(42, 7);

        // Any aligned window of 7 draws holds each kind exactly once.
        for _ in 0..5 {
            let mut drawn = Vec::new();
            for _ in 0..7 {
                drawn.push(queue.pop());
            }
            for kind in PieceKind::ALL {
                assert_eq!(
                    drawn.iter().filter(|&&k| k == kind).count(),
                    1,
                    "bag missing or duplicating {kind:?}"
                );
            }
        }
    }

    #[test]
    fn test_preview_restored_after_pop() {
        let mut queue = PieceQueue::new(7, 5);
        assert_eq!(queue.preview().len(), 5);

        let peeked = queue.peek(3);
        let popped = queue.pop();
        assert_eq!(popped, peeked[0]);
        assert_eq!(queue.preview().len(), 5);
        // The former second entry moved to the front.
        assert_eq!(queue.peek(1), vec![peeked[1]]);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let queue = PieceQueue::new(99, 5);
        let a = queue.peek(5);
        let b = queue.peek(5);
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
    }

    #[test]
    fn test_resize_preview() {
        let mut queue = PieceQueue::new(3, 2);
        assert_eq!(queue.preview().len(), 2);

        queue.set_preview_len(6);
        assert_eq!(queue.preview().len(), 6);

        let front = queue.peek(1);
        queue.set_preview_len(1);
        assert_eq!(queue.preview(), front);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut q1 = PieceQueue::new(2024, 5);
        let mut q2 = PieceQueue::new(2024, 5);
        for _ in 0..30 {
            assert_eq!(q1.pop(), q2.pop());
        }
    }
}

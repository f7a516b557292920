//! Round-robin interleaving across category buckets.
//!
//! Round `i` takes the `i`-th element of every bucket that still has one, in
//! bucket order. Interleaving stops once the requested count is reached or a
//! whole round contributes nothing.

/// Round-robin cursor over a fixed, ordered set of buckets.
#[derive(Debug, Clone)]
pub struct RoundRobin<'a, T> {
    buckets: Vec<&'a [T]>,
    round: usize,
}

impl<'a, T: Copy> RoundRobin<'a, T> {
    /// Create a cursor positioned before the first round.
    #[must_use]
    pub const fn new(buckets: Vec<&'a [T]>) -> Self {
        Self { buckets, round: 0 }
    }

    /// Index of the next round to run.
    #[must_use]
    pub const fn round(&self) -> usize {
        self.round
    }

    /// Run a single round, appending to `out` until it holds `target` items.
    ///
    /// Returns `false` when no bucket had an element for this round, i.e. all
    /// buckets are exhausted.
    pub fn next_round(&mut self, out: &mut Vec<T>, target: usize) -> bool {
        let mut any = false;
        for bucket in &self.buckets {
            let Some(item) = bucket.get(self.round) else {
                continue;
            };
            any = true;
            out.push(*item);
            if out.len() >= target {
                break;
            }
        }
        self.round += 1;
        any
    }

    /// Run rounds until `count` items are collected or the buckets run dry.
    #[must_use]
    pub fn take(mut self, count: usize) -> Vec<T> {
        let mut out = Vec::with_capacity(count);
        while out.len() < count && self.next_round(&mut out, count) {}
        out
    }
}

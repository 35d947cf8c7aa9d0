//! Mixed-radix enumeration of Cartesian product indices.
//!
//! Given factor lengths `[l0, l1, ..., ln]`, yields every index vector
//! `[i0, i1, ..., in]` with `ik < lk`, the last position varying fastest.
//! If any factor is empty, nothing is yielded.

/// Total number of combinations, `None` on overflow.
///
/// An empty factor list has exactly one (empty) combination.
pub fn combination_count(lengths: &[usize]) -> Option<usize> {
    lengths
        .iter()
        .try_fold(1usize, |acc, &len| acc.checked_mul(len))
}

/// Iterator over product indices.
#[derive(Debug, Clone)]
pub struct ProductIndices {
    lengths: Vec<usize>,
    current: Vec<usize>,
    remaining: usize,
}

impl ProductIndices {
    /// Callers must check [`combination_count`] first; the count is assumed
    /// to fit in `usize`.
    pub fn new(lengths: Vec<usize>) -> Self {
        let remaining = combination_count(&lengths).unwrap_or(usize::MAX);
        let current = vec![0; lengths.len()];
        Self {
            lengths,
            current,
            remaining,
        }
    }

    fn advance(&mut self) {
        for pos in (0..self.lengths.len()).rev() {
            self.current[pos] += 1;
            if self.current[pos] < self.lengths[pos] {
                return;
            }
            self.current[pos] = 0;
        }
    }
}

impl Iterator for ProductIndices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.current.clone();
        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ProductIndices {}

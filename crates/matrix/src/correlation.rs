//! Pairwise-complete Pearson correlation over sparse rating vectors.
//!
//! A vector is a slice of `(index, value)` entries sorted by index; an index
//! absent from the slice is a missing observation. Only indices present in
//! both vectors contribute to their correlation.

/// Fewer shared observations than this leave the correlation undefined
pub const MIN_SHARED_OBSERVATIONS: usize = 2;

/// Sparse vector entry: (row or column index, rating)
pub type Entry = (usize, f32);

/// Iterator over values observed in both vectors, in index order
///
/// Rust concept: the lifetime `'a` ties the iterator to the slices it
/// borrows, so it walks them in place without copying
struct Shared<'a> {
    a: &'a [Entry],
    b: &'a [Entry],
}

impl Iterator for Shared<'_> {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        while let (Some(&(ia, va)), Some(&(ib, vb))) = (self.a.first(), self.b.first()) {
            if ia < ib {
                self.a = &self.a[1..];
            } else if ib < ia {
                self.b = &self.b[1..];
            } else {
                self.a = &self.a[1..];
                self.b = &self.b[1..];
                return Some((va as f64, vb as f64));
            }
        }
        None
    }
}

fn shared<'a>(a: &'a [Entry], b: &'a [Entry]) -> Shared<'a> {
    Shared { a, b }
}

/// Number of indices observed in both vectors
pub fn overlap(a: &[Entry], b: &[Entry]) -> usize {
    shared(a, b).count()
}

/// Pearson correlation of `a` and `b` over their shared observations.
///
/// Returns `None` (undefined) when fewer than two observations are shared or
/// when either side is constant over them. The result is symmetric in its
/// arguments bit for bit and clamped to [-1, 1].
pub fn pearson(a: &[Entry], b: &[Entry]) -> Option<f64> {
    let (n, sum_x, sum_y) = shared(a, b).fold((0usize, 0.0f64, 0.0f64), |(n, sx, sy), (x, y)| {
        (n + 1, sx + x, sy + y)
    });
    if n < MIN_SHARED_OBSERVATIONS {
        return None;
    }

    let mean_x = sum_x / n as f64;
    let mean_y = sum_y / n as f64;

    let (sxx, syy, sxy) = shared(a, b).fold((0.0f64, 0.0f64, 0.0f64), |(sxx, syy, sxy), (x, y)| {
        let dx = x - mean_x;
        let dy = y - mean_y;
        (sxx + dx * dx, syy + dy * dy, sxy + dx * dy)
    });
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }

    // One square root of the product keeps identical vectors at exactly 1.0
    let r = sxy / (sxx * syy).sqrt();
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense(values: &[Option<f32>]) -> Vec<Entry> {
        values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, v)))
            .collect()
    }

    #[test]
    fn test_identical_vectors_correlate_fully() {
        let a = dense(&[Some(5.0), Some(4.0), Some(3.0)]);
        assert_eq!(pearson(&a, &a), Some(1.0));

        let b = dense(&[Some(4.5), Some(3.5), Some(2.0), Some(1.0)]);
        assert_eq!(pearson(&b, &b), Some(1.0));
    }

    #[test]
    fn test_opposite_vectors() {
        let a = dense(&[Some(5.0), Some(3.0), Some(1.0)]);
        let b = dense(&[Some(1.0), Some(3.0), Some(5.0)]);
        assert_eq!(pearson(&a, &b), Some(-1.0));
    }

    #[test]
    fn test_pairwise_complete_ignores_missing() {
        // Only indices 0..3 are shared; index 3 is missing on one side
        let a = dense(&[Some(5.0), Some(4.0), Some(3.0), None]);
        let b = dense(&[Some(5.0), Some(4.0), Some(3.0), Some(1.0)]);
        assert_eq!(overlap(&a, &b), 3);
        assert_eq!(pearson(&a, &b), Some(1.0));
    }

    #[test]
    fn test_known_value() {
        // x = [1,2,3,4], y = [2,1,4,3] -> r = 0.6
        let a = dense(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        let b = dense(&[Some(2.0), Some(1.0), Some(4.0), Some(3.0)]);
        let r = pearson(&a, &b).unwrap();
        assert!((r - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_undefined_with_single_shared_observation() {
        let a = dense(&[Some(5.0), None, Some(2.0)]);
        let b = dense(&[Some(4.0), Some(1.0), None]);
        assert_eq!(pearson(&a, &b), None);
    }

    #[test]
    fn test_undefined_with_zero_variance() {
        let a = dense(&[Some(5.0), Some(4.0)]);
        let b = dense(&[Some(1.0), Some(1.0)]);
        assert_eq!(pearson(&a, &b), None);
        assert_eq!(pearson(&b, &a), None);
    }

    #[test]
    fn test_undefined_for_empty_vectors() {
        assert_eq!(pearson(&[], &[]), None);
    }

    #[test]
    fn test_symmetry() {
        let a = dense(&[Some(4.5), None, Some(2.0), Some(3.5), Some(1.0), Some(5.0)]);
        let b = dense(&[Some(3.0), Some(2.5), Some(2.5), None, Some(0.5), Some(4.0)]);
        assert_eq!(pearson(&a, &b), pearson(&b, &a));
        assert!(pearson(&a, &b).is_some());
    }
}

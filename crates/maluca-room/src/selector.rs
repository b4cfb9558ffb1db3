//! Weighted random selection.

use rand::Rng;

/// Picks one item with probability proportional to `weight(item)`.
///
/// Draws `r` uniformly in `[0, total)` and walks the items in order,
/// subtracting each weight until `r` falls inside one. Negative and NaN
/// weights count as zero. If floating-point drift leaves `r` past the
/// end, the last item with a positive weight is returned.
///
/// Returns `None` when `items` is empty or no weight is positive.
pub fn pick_weighted<'a, T, R>(
    items: &'a [T],
    weight: impl Fn(&T) -> f64,
    rng: &mut R,
) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    let clamp = |item: &T| weight(item).max(0.0);

    let total: f64 = items.iter().map(&clamp).sum();
    if !(total > 0.0 && total.is_finite()) {
        return None;
    }

    let mut r = rng.random_range(0.0..total);
    let mut last_positive = None;
    for item in items {
        let w = clamp(item);
        if w <= 0.0 {
            continue;
        }
        if r < w {
            return Some(item);
        }
        r -= w;
        last_positive = Some(item);
    }
    last_positive
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_frequencies_follow_normalized_weights() {
        let items = [("a", 0.3), ("b", 0.2), ("c", 0.5), ("d", 0.05)];
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0usize; 4];
        let samples = 100_000;

        for _ in 0..samples {
            let picked = pick_weighted(&items, |(_, w)| *w, &mut rng).unwrap();
            let idx = items.iter().position(|i| i.0 == picked.0).unwrap();
            counts[idx] += 1;
        }

        let total: f64 = items.iter().map(|(_, w)| w).sum();
        for (idx, (name, w)) in items.iter().enumerate() {
            let expected = w / total;
            let observed = counts[idx] as f64 / samples as f64;
            assert!(
                (observed - expected).abs() < 0.01,
                "{name}: expected {expected:.3}, observed {observed:.3}"
            );
        }
    }

    #[test]
    fn test_zero_weight_items_are_never_picked() {
        let items = [("never", 0.0), ("always", 1.0), ("also-never", 0.0)];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let picked = pick_weighted(&items, |(_, w)| *w, &mut rng).unwrap();
            assert_eq!(picked.0, "always");
        }
    }

    #[test]
    fn test_empty_input_returns_none() {
        let items: [(&str, f64); 0] = [];
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pick_weighted(&items, |(_, w)| *w, &mut rng).is_none());
    }

    #[test]
    fn test_all_zero_weights_return_none() {
        let items = [("a", 0.0), ("b", -1.0), ("c", f64::NAN)];
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pick_weighted(&items, |(_, w)| *w, &mut rng).is_none());
    }

    #[test]
    fn test_same_seed_same_choices() {
        let items = [1, 2, 3, 4, 5];
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..100 {
            assert_eq!(
                pick_weighted(&items, |i| *i as f64, &mut a),
                pick_weighted(&items, |i| *i as f64, &mut b)
            );
        }
    }
}

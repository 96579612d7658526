//! Combined top-k / nucleus (top-p) logit filtering.

use std::cmp::Ordering;

/// Mask logits in place so only sampling-eligible entries stay finite.
///
/// Top-k runs first: entries strictly below the k-th largest score become
/// negative infinity, so boundary ties survive and the kept count can exceed
/// `k`. Nucleus filtering then runs on the partially-filtered vector: entries
/// are sorted descending, the cumulative softmax is taken over that order,
/// and the removal mask `cumulative > top_p` is shifted right by one before
/// applying, keeping the first entry past the threshold. Sorted position 0
/// always survives, so at least one token remains even when the top entry
/// alone exceeds `top_p`.
///
/// `top_k == 0` disables the top-k stage; `top_p <= 0.0` disables nucleus.
pub fn top_k_top_p_filter(logits: &mut [f32], top_k: usize, top_p: f32) {
    let top_k = top_k.min(logits.len());

    if top_k > 0 {
        let mut sorted: Vec<f32> = logits.to_vec();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
        let threshold = sorted[top_k - 1];
        for value in logits.iter_mut() {
            if *value < threshold {
                *value = f32::NEG_INFINITY;
            }
        }
    }

    if top_p > 0.0 {
        let mut indices: Vec<usize> = (0..logits.len()).collect();
        indices.sort_by(|&a, &b| {
            logits[b]
                .partial_cmp(&logits[a])
                .unwrap_or(Ordering::Equal)
        });

        let max_logit = logits[indices[0]];
        if !max_logit.is_finite() {
            return;
        }
        let exps: Vec<f32> = indices
            .iter()
            .map(|&i| (logits[i] - max_logit).exp())
            .collect();
        let sum: f32 = exps.iter().sum();
        if sum <= 0.0 {
            return;
        }

        let mut remove = vec![false; indices.len()];
        let mut cumulative = 0.0f32;
        for (position, exp) in exps.iter().enumerate() {
            cumulative += exp / sum;
            remove[position] = cumulative > top_p;
        }
        // Shift right so the entry that crossed the threshold is kept too;
        // sorted position 0 is kept unconditionally.
        for position in (1..remove.len()).rev() {
            remove[position] = remove[position - 1];
        }
        remove[0] = false;

        for (position, &index) in indices.iter().enumerate() {
            if remove[position] {
                logits[index] = f32::NEG_INFINITY;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEG_INF: f32 = f32::NEG_INFINITY;

    fn finite_count(logits: &[f32]) -> usize {
        logits.iter().filter(|v| v.is_finite()).count()
    }

    #[test]
    fn top_k_keeps_exactly_k_highest() {
        let mut logits = vec![1.0, 5.0, 3.0, 4.0, 2.0];
        top_k_top_p_filter(&mut logits, 3, 0.0);
        assert_eq!(logits, vec![NEG_INF, 5.0, 3.0, 4.0, NEG_INF]);
    }

    #[test]
    fn top_k_keeps_boundary_ties() {
        let mut logits = vec![4.0, 2.0, 2.0, 2.0, 1.0];
        top_k_top_p_filter(&mut logits, 2, 0.0);
        // All three entries tied at the k-th score survive.
        assert_eq!(logits, vec![4.0, 2.0, 2.0, 2.0, NEG_INF]);
    }

    #[test]
    fn top_k_zero_is_disabled() {
        let mut logits = vec![1.0, 2.0, 3.0];
        top_k_top_p_filter(&mut logits, 0, 0.0);
        assert_eq!(logits, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn top_k_clamps_to_vocab() {
        let mut logits = vec![1.0, 2.0, 3.0];
        top_k_top_p_filter(&mut logits, 100, 0.0);
        assert!(logits.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn top_p_keeps_prefix_past_threshold() {
        // Softmax of [ln 4, ln 3, ln 2, ln 1] is [0.4, 0.3, 0.2, 0.1].
        let mut logits = vec![4.0f32.ln(), 3.0f32.ln(), 2.0f32.ln(), 1.0f32.ln()];
        top_k_top_p_filter(&mut logits, 0, 0.5);
        // Cumulative 0.4 <= p at position 0, 0.7 > p at position 1; the
        // shifted mask keeps both and removes the rest.
        assert!(logits[0].is_finite());
        assert!(logits[1].is_finite());
        assert_eq!(logits[2], NEG_INF);
        assert_eq!(logits[3], NEG_INF);
    }

    #[test]
    fn top_p_always_keeps_best_entry() {
        let mut logits = vec![10.0, 0.0, -1.0];
        top_k_top_p_filter(&mut logits, 0, 0.01);
        assert!(logits[0].is_finite());
        assert_eq!(finite_count(&logits), 1);
    }

    #[test]
    fn top_p_zero_is_disabled() {
        let mut logits = vec![1.0, 2.0, 3.0];
        top_k_top_p_filter(&mut logits, 0, 0.0);
        assert_eq!(logits, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn top_p_kept_prefix_exceeds_threshold_before_shift() {
        let mut logits: Vec<f32> = vec![2.0, 1.5, 1.0, 0.5, 0.0, -0.5];
        let original = logits.clone();
        let p = 0.6;
        top_k_top_p_filter(&mut logits, 0, p);

        // Cumulative softmax over the kept entries (minus the shift's extra
        // entry) must already exceed p.
        let max = original.iter().cloned().fold(NEG_INF, f32::max);
        let sum: f32 = original.iter().map(|v| (v - max).exp()).sum();
        let mut kept: Vec<f32> = original
            .iter()
            .zip(logits.iter())
            .filter(|(_, f)| f.is_finite())
            .map(|(&o, _)| (o - max).exp() / sum)
            .collect();
        kept.sort_by(|a, b| b.partial_cmp(a).unwrap());
        let without_shift: f32 = kept[..kept.len() - 1].iter().sum();
        let with_shift: f32 = kept.iter().sum();
        assert!(without_shift <= p || kept.len() == 1);
        assert!(with_shift > p);
    }

    #[test]
    fn combined_applies_top_k_before_top_p() {
        let mut logits = vec![5.0, 4.0, 3.0, 2.0, 1.0];
        top_k_top_p_filter(&mut logits, 2, 0.99);
        // Top-k leaves two candidates; nucleus over those two keeps both
        // only via the shift, and never resurrects masked entries.
        assert_eq!(logits[2], NEG_INF);
        assert_eq!(logits[3], NEG_INF);
        assert_eq!(logits[4], NEG_INF);
        assert!(logits[0].is_finite());
    }

    #[test]
    fn top_k_is_idempotent() {
        let mut once = vec![0.3, -1.2, 4.0, 4.0, 2.5, 0.0];
        top_k_top_p_filter(&mut once, 3, 0.0);
        let mut twice = once.clone();
        top_k_top_p_filter(&mut twice, 3, 0.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn tight_top_p_is_idempotent() {
        let mut once = vec![3.0, 1.0, 0.5];
        top_k_top_p_filter(&mut once, 0, 0.01);
        let mut twice = once.clone();
        top_k_top_p_filter(&mut twice, 0, 0.01);
        assert_eq!(once, twice);
    }

    #[test]
    fn reference_policy_keeps_eight() {
        let mut logits: Vec<f32> = (0..32).map(|i| i as f32 * 0.25).collect();
        top_k_top_p_filter(&mut logits, 8, 0.0);
        assert_eq!(finite_count(&logits), 8);
    }
}

/// Highest-scoring candidate that satisfies `predicate`.
///
/// Ties keep the earliest candidate. Non-finite scores count as 0 so a bad
/// upstream value can neither win nor poison the comparison.
pub fn pick_best<'a, T, P, K>(candidates: &'a [T], predicate: P, key: K) -> Option<&'a T>
where
    P: Fn(&T) -> bool,
    K: Fn(&T) -> f64,
{
    let mut best: Option<(&'a T, f64)> = None;

    for candidate in candidates {
        if !predicate(candidate) {
            continue;
        }
        let score = key(candidate);
        let score = if score.is_finite() { score } else { 0.0 };

        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }

    best.map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RecognizedEntity;

    #[test]
    fn test_picks_highest_confidence_match() {
        let entities = vec![
            RecognizedEntity::new("Cancer", "carcinoma", 0.61, 0, 9),
            RecognizedEntity::new("Organ", "breast", 0.99, 10, 16),
            RecognizedEntity::new("Cancer", "ductal carcinoma", 0.87, 20, 36),
        ];
        let best = pick_best(
            &entities,
            |e| e.label.as_deref() == Some("Cancer"),
            |e| e.confidence(),
        );
        assert_eq!(best.map(|e| e.text()), Some("ductal carcinoma"));
    }

    #[test]
    fn test_ties_keep_first() {
        let entities = vec![
            RecognizedEntity::new("Cancer", "first", 0.8, 0, 5),
            RecognizedEntity::new("Cancer", "second", 0.8, 6, 12),
        ];
        let best = pick_best(&entities, |_| true, |e| e.confidence());
        assert_eq!(best.map(|e| e.text()), Some("first"));
    }

    #[test]
    fn test_nan_scores_do_not_win() {
        let scores = [f64::NAN, 0.2, f64::INFINITY];
        let best = pick_best(&scores, |_| true, |s| *s);
        assert_eq!(best, Some(&0.2));
    }

    #[test]
    fn test_no_candidates() {
        let entities: Vec<RecognizedEntity> = Vec::new();
        assert!(pick_best(&entities, |_| true, |e| e.confidence()).is_none());
    }
}

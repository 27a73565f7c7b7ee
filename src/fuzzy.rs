use fuzzy_matcher::FuzzyMatcher;

/// Outcome of a subsequence test, with the consumed char offsets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FuzzyMatch {
    pub matched: bool,
    pub positions: Vec<usize>,
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Greedy leftmost subsequence match, case-insensitive.
///
/// Walks `target` once and consumes the next pattern char whenever it is
/// seen. Offsets are char offsets into `target`.
pub fn fuzzy_match(pattern: &str, target: &str) -> FuzzyMatch {
    let needle: Vec<char> = pattern.chars().map(fold).collect();
    if needle.is_empty() {
        return FuzzyMatch {
            matched: true,
            positions: Vec::new(),
        };
    }

    let mut positions = Vec::with_capacity(needle.len());
    for (offset, c) in target.chars().enumerate() {
        if fold(c) == needle[positions.len()] {
            positions.push(offset);
            if positions.len() == needle.len() {
                return FuzzyMatch {
                    matched: true,
                    positions,
                };
            }
        }
    }

    FuzzyMatch {
        matched: false,
        positions: Vec::new(),
    }
}

/// [`fuzzy_match`] exposed through the `fuzzy-matcher` trait so the filter
/// engine can take any matcher at that seam.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyMatcher;

impl GreedyMatcher {
    /// Adjacent positions score higher than scattered ones
    fn score(positions: &[usize]) -> i64 {
        let adjacent = positions.windows(2).filter(|w| w[1] == w[0] + 1).count();
        let leading = positions.first().map_or(0, |p| if *p == 0 { 1 } else { 0 });
        (positions.len() + 2 * adjacent + 3 * leading) as i64
    }
}

impl FuzzyMatcher for GreedyMatcher {
    fn fuzzy_indices(&self, choice: &str, pattern: &str) -> Option<(i64, Vec<usize>)> {
        let result = fuzzy_match(pattern, choice);
        if result.matched {
            Some((Self::score(&result.positions), result.positions))
        } else {
            None
        }
    }

    fn fuzzy_match(&self, choice: &str, pattern: &str) -> Option<i64> {
        self.fuzzy_indices(choice, pattern).map(|(score, _)| score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsequence_with_positions() {
        let result = fuzzy_match("pcr", "plan_check_run");
        assert!(result.matched);
        assert_eq!(result.positions, vec![0, 5, 11]);
    }

    #[test]
    fn test_no_match() {
        let result = fuzzy_match("xyz", "plan_check_run");
        assert!(!result.matched);
        assert!(result.positions.is_empty());
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        assert_eq!(
            fuzzy_match("", "anything"),
            FuzzyMatch {
                matched: true,
                positions: vec![]
            }
        );
        assert!(fuzzy_match("", "").matched);
    }

    #[test]
    fn test_case_insensitive() {
        assert!(fuzzy_match("PLAN", "plan_x").matched);
        assert_eq!(fuzzy_match("px", "Plan_X").positions, vec![0, 5]);
    }

    #[test]
    fn test_greedy_takes_leftmost_occurrence() {
        // An optimal aligner would pick the contiguous "ab" at 3..5
        assert_eq!(fuzzy_match("ab", "a__ab").positions, vec![0, 4]);
    }

    #[test]
    fn test_pattern_longer_than_target() {
        assert!(!fuzzy_match("users_x", "users").matched);
    }

    #[test]
    fn test_offsets_count_chars_not_bytes() {
        assert_eq!(fuzzy_match("ée", "café_ée").positions, vec![3, 6]);
    }

    #[test]
    fn test_greedy_matcher_trait() {
        let matcher = GreedyMatcher;
        let (score, indices) = matcher.fuzzy_indices("plan_check_run", "plan").unwrap();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert!(score > matcher.fuzzy_match("plan_check_run", "pcr").unwrap());
        assert!(matcher.fuzzy_match("users", "plan").is_none());
    }

    #[test]
    fn test_greedy_matcher_behind_trait_object() {
        let matcher: Box<dyn FuzzyMatcher> = Box::new(GreedyMatcher);
        let (score, indices) = matcher.fuzzy_indices("get_user", "gu").unwrap();
        assert_eq!(indices, vec![0, 4]);
        assert_eq!(score, 5);
    }
}

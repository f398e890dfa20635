//! Budgeted evaluation of constraints.
//!
//! Candidates flow through a group as a partition `out[0..=budget]`, where
//! `out[i]` holds the candidates that have spent exactly `i` errors so far.
//! Each constraint re-partitions every bucket with whatever budget that
//! bucket has left, so errors add up across the constraints of one group.
//! Groups are independent: each starts from a fresh budget.

use crate::constraint::{Constraint, Outcome};
use crate::debug_log;

/// `buckets[i]` holds the candidates with exactly `i` errors.
pub type Buckets = Vec<Vec<String>>;

/// One group as seen by the evaluator: its budget and member constraints.
#[derive(Debug, Clone)]
pub struct GroupPlan<'a> {
    pub budget: usize,
    pub constraints: Vec<&'a Constraint>,
}

impl<'a> GroupPlan<'a> {
    #[must_use]
    pub fn new(budget: usize, constraints: Vec<&'a Constraint>) -> Self {
        Self {
            budget,
            constraints,
        }
    }
}

fn empty_buckets(budget: usize) -> Buckets {
    vec![Vec::new(); budget + 1]
}

/// Split `candidates` by the error count `constraint` assigns them.
///
/// Returns one bucket per reachable error count, i.e. `budget + 1` buckets
/// unless the constraint cannot produce that many errors. Each bucket keeps
/// input order. Rejected candidates and those above `budget` are dropped.
#[must_use]
pub fn partition(constraint: &Constraint, candidates: Vec<String>, budget: usize) -> Buckets {
    let budget = budget.min(constraint.max_errors());
    let mut buckets = empty_buckets(budget);
    for candidate in candidates {
        match constraint.outcome(&candidate, budget) {
            Outcome::Errors(errors) if errors <= budget => buckets[errors].push(candidate),
            _ => {}
        }
    }
    buckets
}

/// Apply the active `constraints` of one group, allowing `budget` errors in total.
///
/// Constraints run in ascending priority. The result lists exact matches
/// first, then candidates with one error, and so on.
#[must_use]
pub fn apply_filters(constraints: &[&Constraint], input: Vec<String>, budget: usize) -> Vec<String> {
    let mut ordered: Vec<&Constraint> = constraints
        .iter()
        .copied()
        .filter(|c| c.is_active())
        .collect();
    if ordered.is_empty() {
        return input;
    }
    ordered.sort_by_key(|c| c.priority());

    // Budget beyond what the constraints can produce changes nothing
    let reachable = ordered
        .iter()
        .fold(0usize, |sum, c| sum.saturating_add(c.max_errors()));
    let budget = budget.min(reachable);

    let mut out = empty_buckets(budget);
    out[0] = input;

    for constraint in ordered {
        let mut next = empty_buckets(budget);
        for (spent, bucket) in out.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            let parts = partition(constraint, bucket, budget - spent);
            for (extra, part) in parts.into_iter().enumerate() {
                next[spent + extra].extend(part);
            }
        }
        out = next;
        debug_log!(
            "'{}' leaves {} candidates",
            constraint.label(),
            out.iter().map(Vec::len).sum::<usize>()
        );
    }

    out.into_iter().flatten().collect()
}

/// Feed `input` through each group in turn.
#[must_use]
pub fn apply_filter_groups(groups: &[GroupPlan<'_>], input: Vec<String>) -> Vec<String> {
    groups.iter().fold(input, |candidates, group| {
        apply_filters(&group.constraints, candidates, group.budget)
    })
}

/// Filter `candidates` through `groups`, given in traversal order.
#[must_use]
pub fn evaluate(candidates: &[String], groups: &[GroupPlan<'_>]) -> Vec<String> {
    apply_filter_groups(groups, candidates.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_partition_exact_constraint() {
        let c = Constraint::length_exact(4).unwrap();
        let buckets = partition(&c, words(&["abba", "abc", "evil"]), 2);
        assert_eq!(buckets, vec![words(&["abba", "evil"])]);
    }

    #[test]
    fn test_partition_by_error_count() {
        let c = Constraint::contains("aabb");
        let buckets = partition(&c, words(&["abbc", "abba", "xyzz", "abcd", "aabb"]), 2);
        assert_eq!(buckets[0], words(&["abba", "aabb"]));
        assert_eq!(buckets[1], words(&["abbc"]));
        assert_eq!(buckets[2], words(&["abcd"]));
    }

    #[test]
    fn test_contains_budget_zero() {
        let c = Constraint::contains("aabb");
        let result = apply_filters(&[&c], words(&["aabb", "abba", "abbc"]), 0);
        assert_eq!(result, words(&["aabb", "abba"]));
    }

    #[test]
    fn test_contains_budget_one_orders_by_errors() {
        let c = Constraint::contains("aabb");
        let result = apply_filters(&[&c], words(&["abbc", "aabb", "abba"]), 1);
        assert_eq!(result, words(&["aabb", "abba", "abbc"]));
    }

    #[test]
    fn test_errors_add_up_within_group() {
        let a = Constraint::contains("x");
        let b = Constraint::morse("a").unwrap();
        // "bxx": 0 + 1, "bbb": 1 + 1, "axx": 0 + 0
        let input = words(&["bbb", "bxx", "axx"]);
        assert_eq!(apply_filters(&[&a, &b], input.clone(), 2), words(&["axx", "bxx", "bbb"]));
        assert_eq!(apply_filters(&[&a, &b], input.clone(), 1), words(&["axx", "bxx"]));
        assert_eq!(apply_filters(&[&a, &b], input, 0), words(&["axx"]));
    }

    #[test]
    fn test_inactive_constraints_are_skipped() {
        let mut c = Constraint::length_exact(3).unwrap();
        c.set_active(false);
        let input = words(&["a", "abc", "abcdef"]);
        assert_eq!(apply_filters(&[&c], input.clone(), 0), input);
    }

    #[test]
    fn test_empty_group_is_pass_through() {
        let input = words(&["one", "two", "three"]);
        assert_eq!(apply_filters(&[], input.clone(), 3), input);
    }

    #[test]
    fn test_groups_have_independent_budgets() {
        let length = Constraint::length_exact(5).unwrap();
        let x = Constraint::contains("x");
        let groups = [
            GroupPlan::new(0, vec![&length]),
            GroupPlan::new(0, vec![]),
            GroupPlan::new(2, vec![&x]),
        ];
        let result = evaluate(&words(&["hello", "boxes", "hi"]), &groups);
        assert_eq!(result, words(&["boxes", "hello"]));

        let strict_only = [GroupPlan::new(0, vec![&length, &x])];
        assert_eq!(evaluate(&words(&["hello", "boxes"]), &strict_only), words(&["boxes"]));
    }

    #[test]
    fn test_huge_budget_on_empty_group() {
        let input = words(&["one", "two"]);
        assert_eq!(apply_filters(&[], input.clone(), usize::MAX), input);
        assert_eq!(apply_filters(&[], input.clone(), 1 << 40), input);
    }

    #[test]
    fn test_huge_budget_on_single_constraint() {
        let c = Constraint::contains("ab");
        let input = words(&["xyz", "bcd", "abc"]);
        let expected = words(&["abc", "bcd", "xyz"]);
        assert_eq!(apply_filters(&[&c], input.clone(), usize::MAX), expected);
        assert_eq!(apply_filters(&[&c], input.clone(), 1 << 40), expected);
        assert_eq!(partition(&c, input, usize::MAX).len(), 3);
    }

    #[test]
    fn test_huge_budget_with_exact_constraint() {
        let length = Constraint::length_exact(3).unwrap();
        let morse = Constraint::morse("a").unwrap();
        let input = words(&["ab", "bcd", "abc"]);
        assert_eq!(apply_filters(&[&length, &morse], input, usize::MAX), words(&["abc", "bcd"]));
    }

}

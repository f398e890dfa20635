//! Session state: dictionaries, constraints, error-budget groups and the
//! filtered output.
//!
//! Every structural mutation goes through [`State`], which keeps the group
//! invariants and recomputes all filtered dictionaries afterwards.

use crate::constraint::Constraint;
use crate::error::StateError;
use crate::filter::{GroupPlan, evaluate};
use crate::wordbank::{Dictionary, write_wordlist};
use std::path::Path;

/// Stable handle for a group. Custom ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupId {
    /// Budget 0, holds every exact constraint.
    Strict,
    /// Adjustable budget, holds error-tolerant constraints not placed elsewhere.
    Default,
    Custom(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomGroup {
    pub id: GroupId,
    pub budget: usize,
}

/// A constraint together with the group it is evaluated in.
#[derive(Debug, Clone)]
pub struct Binding {
    pub constraint: Constraint,
    pub group: GroupId,
}

/// Constraints of one group, in evaluation order.
#[derive(Debug, Clone)]
pub struct GroupView<'a> {
    pub id: GroupId,
    pub budget: usize,
    pub constraints: Vec<&'a Constraint>,
}

#[derive(Debug)]
pub struct State {
    dictionaries: Vec<Dictionary>,
    filtered: Vec<Vec<String>>,
    bindings: Vec<Binding>,
    default_budget: usize,
    groups: Vec<CustomGroup>,
    next_group_id: u32,
    evaluating: bool,
}

impl State {
    #[must_use]
    pub fn new(dictionaries: Vec<Dictionary>, default_budget: usize, evaluating: bool) -> Self {
        let mut state = Self {
            filtered: vec![Vec::new(); dictionaries.len()],
            dictionaries,
            bindings: Vec::new(),
            default_budget,
            groups: Vec::new(),
            next_group_id: 0,
            evaluating,
        };
        state.recompute();
        state
    }

    // ---- queries ----

    #[must_use]
    pub fn dictionaries(&self) -> &[Dictionary] {
        &self.dictionaries
    }

    /// Filtered candidates of every dictionary, parallel to [`Self::dictionaries`].
    #[must_use]
    pub fn filtered(&self) -> &[Vec<String>] {
        &self.filtered
    }

    /// Bindings in display order: strict group, default group, then custom
    /// groups in creation order; by priority within each group.
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    #[must_use]
    pub fn custom_groups(&self) -> &[CustomGroup] {
        &self.groups
    }

    #[must_use]
    pub fn default_budget(&self) -> usize {
        self.default_budget
    }

    #[must_use]
    pub fn is_evaluating(&self) -> bool {
        self.evaluating
    }

    #[must_use]
    pub fn budget_of(&self, id: GroupId) -> Option<usize> {
        match id {
            GroupId::Strict => Some(0),
            GroupId::Default => Some(self.default_budget),
            GroupId::Custom(_) => self.groups.iter().find(|g| g.id == id).map(|g| g.budget),
        }
    }

    fn rank_of(&self, id: GroupId) -> usize {
        match id {
            GroupId::Strict => 0,
            GroupId::Default => 1,
            GroupId::Custom(_) => self
                .groups
                .iter()
                .position(|g| g.id == id)
                .map_or(usize::MAX, |i| i + 2),
        }
    }

    /// All groups in traversal order, including empty ones.
    #[must_use]
    pub fn groups_in_order(&self) -> Vec<GroupView<'_>> {
        let mut views = vec![
            GroupView {
                id: GroupId::Strict,
                budget: 0,
                constraints: Vec::new(),
            },
            GroupView {
                id: GroupId::Default,
                budget: self.default_budget,
                constraints: Vec::new(),
            },
        ];
        views.extend(self.groups.iter().map(|g| GroupView {
            id: g.id,
            budget: g.budget,
            constraints: Vec::new(),
        }));
        for binding in &self.bindings {
            let rank = self.rank_of(binding.group);
            views[rank].constraints.push(&binding.constraint);
        }
        views
    }

    // ---- constraints ----

    /// Exact constraints go to the strict group, error-tolerant ones to the
    /// default group.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        let group = if constraint.is_error_tolerant() {
            GroupId::Default
        } else {
            GroupId::Strict
        };
        log::info!("Adding filter '{}' to {group:?}", constraint.label());
        self.bindings.push(Binding { constraint, group });
        self.commit();
    }

    /// `index` is 1-based, as displayed.
    pub fn remove_constraint(&mut self, index: usize) -> Result<Constraint, StateError> {
        let i = self.constraint_slot(index)?;
        let removed = self.bindings.remove(i).constraint;
        log::info!("Removed filter '{}'", removed.label());
        self.commit();
        Ok(removed)
    }

    pub fn toggle_constraint(&mut self, index: usize) -> Result<(), StateError> {
        let i = self.constraint_slot(index)?;
        self.bindings[i].constraint.toggle_active();
        log::info!("Toggled filter {index}: {}", self.bindings[i].constraint);
        self.commit();
        Ok(())
    }

    /// Move constraint `index` into custom group `group` (both 1-based).
    pub fn assign_to_group(&mut self, index: usize, group: usize) -> Result<(), StateError> {
        let i = self.constraint_slot(index)?;
        let id = self
            .groups
            .get(group.wrapping_sub(1))
            .map(|g| g.id)
            .ok_or(StateError::NoSuchGroup(group))?;
        let constraint = &self.bindings[i].constraint;
        if !constraint.is_error_tolerant() {
            return Err(StateError::ExactConstraint(constraint.label()));
        }
        self.bindings[i].group = id;
        self.commit();
        Ok(())
    }

    /// Move constraint `index` back into the default group.
    pub fn unassign_from_group(&mut self, index: usize) -> Result<(), StateError> {
        let i = self.constraint_slot(index)?;
        let constraint = &self.bindings[i].constraint;
        if !constraint.is_error_tolerant() {
            return Err(StateError::ExactConstraint(constraint.label()));
        }
        self.bindings[i].group = GroupId::Default;
        self.commit();
        Ok(())
    }

    fn constraint_slot(&self, index: usize) -> Result<usize, StateError> {
        if (1..=self.bindings.len()).contains(&index) {
            Ok(index - 1)
        } else {
            Err(StateError::NoSuchConstraint(index))
        }
    }

    // ---- groups ----

    pub fn add_group(&mut self, budget: usize) -> GroupId {
        let id = GroupId::Custom(self.next_group_id);
        self.next_group_id += 1;
        self.groups.push(CustomGroup { id, budget });
        log::info!("Added group {id:?} with budget {budget}");
        self.commit();
        id
    }

    /// Members of the removed group fall back to the default group.
    pub fn remove_group(&mut self, group: usize) -> Result<(), StateError> {
        let i = self.group_slot(group)?;
        let removed = self.groups.remove(i);
        for binding in &mut self.bindings {
            if binding.group == removed.id {
                binding.group = GroupId::Default;
            }
        }
        log::info!("Removed group {:?}", removed.id);
        self.commit();
        Ok(())
    }

    pub fn set_group_budget(&mut self, group: usize, budget: usize) -> Result<(), StateError> {
        let i = self.group_slot(group)?;
        self.groups[i].budget = budget;
        self.commit();
        Ok(())
    }

    pub fn set_default_budget(&mut self, budget: usize) {
        self.default_budget = budget;
        log::info!("Default group budget set to {budget}");
        self.commit();
    }

    fn group_slot(&self, group: usize) -> Result<usize, StateError> {
        if (1..=self.groups.len()).contains(&group) {
            Ok(group - 1)
        } else {
            Err(StateError::NoSuchGroup(group))
        }
    }

    // ---- dictionaries ----

    pub fn add_dictionary(&mut self, dictionary: Dictionary) {
        log::info!("Adding dictionary {dictionary}");
        self.dictionaries.push(dictionary);
        self.filtered.push(Vec::new());
        self.commit();
    }

    pub fn remove_dictionary(&mut self, index: usize) -> Result<Dictionary, StateError> {
        let i = self.dictionary_slot(index)?;
        self.filtered.remove(i);
        let removed = self.dictionaries.remove(i);
        self.validate();
        Ok(removed)
    }

    pub fn toggle_dictionary(&mut self, index: usize) -> Result<(), StateError> {
        let i = self.dictionary_slot(index)?;
        self.dictionaries[i].toggle();
        self.commit();
        Ok(())
    }

    /// Re-read every dictionary from disk and re-filter.
    pub fn reload(&mut self) {
        for dictionary in &mut self.dictionaries {
            dictionary.reload();
        }
        self.commit();
    }

    /// Write the filtered candidates of dictionary `index` to `path`.
    pub fn save_filtered<P: AsRef<Path>>(&self, index: usize, path: P) -> Result<usize, StateError> {
        let i = self.dictionary_slot(index)?;
        let path = path.as_ref();
        write_wordlist(path, &self.filtered[i]).map_err(|e| StateError::Save {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        log::info!("Saved {} candidates to {}", self.filtered[i].len(), path.display());
        Ok(self.filtered[i].len())
    }

    fn dictionary_slot(&self, index: usize) -> Result<usize, StateError> {
        if (1..=self.dictionaries.len()).contains(&index) {
            Ok(index - 1)
        } else {
            Err(StateError::NoSuchDictionary(index))
        }
    }

    // ---- evaluation ----

    pub fn set_evaluating(&mut self, evaluating: bool) {
        self.evaluating = evaluating;
        self.recompute();
    }

    fn commit(&mut self) {
        self.sort_bindings();
        self.validate();
        self.recompute();
    }

    fn sort_bindings(&mut self) {
        let mut bindings = std::mem::take(&mut self.bindings);
        bindings.sort_by_key(|b| (self.rank_of(b.group), b.constraint.priority()));
        self.bindings = bindings;
    }

    /// Run every group over every dictionary. Off while evaluation is disabled.
    pub fn recompute(&mut self) {
        if !self.evaluating {
            self.filtered = vec![Vec::new(); self.dictionaries.len()];
            return;
        }
        let plans: Vec<GroupPlan<'_>> = self
            .groups_in_order()
            .into_iter()
            .map(|view| GroupPlan::new(view.budget, view.constraints))
            .collect();
        let filtered = self
            .dictionaries
            .iter()
            .map(|d| evaluate(d.candidates(), &plans))
            .collect();
        self.filtered = filtered;
        log::debug!(
            "Recomputed: {:?}",
            self.filtered.iter().map(Vec::len).collect::<Vec<_>>()
        );
    }

    /// Panics if a group invariant is broken. Such a state is a bug, not
    /// something a user can cause.
    pub fn validate(&self) {
        assert_eq!(self.dictionaries.len(), self.filtered.len());
        for binding in &self.bindings {
            let tolerant = binding.constraint.is_error_tolerant();
            match binding.group {
                GroupId::Strict => assert!(
                    !tolerant,
                    "error-tolerant filter '{}' in the strict group",
                    binding.constraint.label()
                ),
                id => {
                    assert!(
                        tolerant,
                        "exact filter '{}' outside the strict group",
                        binding.constraint.label()
                    );
                    assert!(self.budget_of(id).is_some(), "filter bound to unknown group {id:?}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(words: &[&str]) -> State {
        let words = words.iter().map(|s| (*s).to_string()).collect();
        State::new(vec![Dictionary::from_words("test", words)], 0, true)
    }

    #[test]
    fn test_new_state_passes_everything() {
        let state = state_with(&["b", "a"]);
        assert_eq!(state.filtered()[0], vec!["a", "b"]);
    }

    #[test]
    fn test_constraints_bound_by_tolerance() {
        let mut state = state_with(&["abba"]);
        state.add_constraint(Constraint::contains("ab"));
        state.add_constraint(Constraint::length_exact(4).unwrap());
        let groups: Vec<GroupId> = state.bindings().iter().map(|b| b.group).collect();
        assert_eq!(groups, vec![GroupId::Strict, GroupId::Default]);
    }

    #[test]
    fn test_huge_budgets_do_not_allocate_buckets() {
        let mut state = state_with(&["abba", "evil"]);
        state.set_default_budget(usize::MAX);
        state.set_default_budget(1 << 40);
        assert_eq!(state.filtered()[0], vec!["abba", "evil"]);

        state.add_constraint(Constraint::contains("ab"));
        assert_eq!(state.filtered()[0], vec!["abba", "evil"]);
        state.set_default_budget(usize::MAX);
        assert_eq!(state.filtered()[0], vec!["abba", "evil"]);

        state.add_group(usize::MAX);
        state.assign_to_group(1, 1).unwrap();
        state.set_group_budget(1, 1 << 40).unwrap();
        assert_eq!(state.filtered()[0], vec!["abba", "evil"]);
    }

    #[test]
    fn test_evaluation_switch() {
        let mut state = state_with(&["abba", "evil"]);
        state.set_evaluating(false);
        assert!(state.filtered()[0].is_empty());
        state.set_evaluating(true);
        assert_eq!(state.filtered()[0].len(), 2);
    }

    #[test]
    fn test_default_budget_recomputes() {
        let mut state = state_with(&["aabb", "abbc", "abba"]);
        state.add_constraint(Constraint::contains("aabb"));
        assert_eq!(state.filtered()[0], vec!["aabb", "abba"]);
        state.set_default_budget(1);
        assert_eq!(state.filtered()[0], vec!["aabb", "abba", "abbc"]);
    }

    #[test]
    fn test_toggle_and_remove_constraint() {
        let mut state = state_with(&["abc", "abcd"]);
        state.add_constraint(Constraint::length_exact(3).unwrap());
        assert_eq!(state.filtered()[0], vec!["abc"]);
        state.toggle_constraint(1).unwrap();
        assert_eq!(state.filtered()[0].len(), 2);
        state.toggle_constraint(1).unwrap();
        assert_eq!(state.filtered()[0].len(), 1);
        state.remove_constraint(1).unwrap();
        assert!(state.bindings().is_empty());
        assert_eq!(state.filtered()[0].len(), 2);
        assert_eq!(state.remove_constraint(1).unwrap_err(), StateError::NoSuchConstraint(1));
    }

    #[test]
    fn test_exact_constraint_cannot_join_custom_group() {
        let mut state = state_with(&["abc"]);
        state.add_constraint(Constraint::length_exact(3).unwrap());
        state.add_group(2);
        assert!(matches!(state.assign_to_group(1, 1), Err(StateError::ExactConstraint(_))));
        assert!(matches!(state.unassign_from_group(1), Err(StateError::ExactConstraint(_))));
        assert_eq!(state.bindings()[0].group, GroupId::Strict);
    }

    #[test]
    fn test_remove_group_moves_members_to_default() {
        let mut state = state_with(&["hello", "boxes"]);
        state.add_constraint(Constraint::contains("x"));
        let id = state.add_group(1);
        state.assign_to_group(1, 1).unwrap();
        assert_eq!(state.bindings()[0].group, id);
        assert_eq!(state.filtered()[0], vec!["boxes", "hello"]);

        state.remove_group(1).unwrap();
        assert_eq!(state.bindings()[0].group, GroupId::Default);
        assert_eq!(state.filtered()[0], vec!["boxes"]);
        assert_eq!(state.remove_group(1).unwrap_err(), StateError::NoSuchGroup(1));
    }

    #[test]
    fn test_group_ids_are_not_reused() {
        let mut state = state_with(&[]);
        let a = state.add_group(1);
        state.remove_group(1).unwrap();
        let b = state.add_group(1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_set_group_budget() {
        let mut state = state_with(&["hello", "boxes"]);
        state.add_constraint(Constraint::contains("x"));
        state.add_group(0);
        state.assign_to_group(1, 1).unwrap();
        assert_eq!(state.filtered()[0], vec!["boxes"]);
        state.set_group_budget(1, 1).unwrap();
        assert_eq!(state.filtered()[0], vec!["boxes", "hello"]);
        assert_eq!(state.budget_of(GroupId::Strict), Some(0));
    }

    #[test]
    fn test_bindings_sorted_by_group_then_priority() {
        let mut state = state_with(&[]);
        state.add_constraint(Constraint::contains("ab"));
        state.add_constraint(Constraint::morse("a").unwrap());
        state.add_constraint(Constraint::regex("a.*").unwrap());
        state.add_constraint(Constraint::length_min(2).unwrap());
        let labels: Vec<String> = state.bindings().iter().map(|b| b.constraint.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Length is at least 2.",
                "Matches regexp a.*",
                "Must match the following Morse pattern: a",
                "Must contain the following characters: ab",
            ]
        );
    }

    #[test]
    fn test_groups_in_order_lists_empty_groups() {
        let mut state = state_with(&[]);
        state.add_group(3);
        let views = state.groups_in_order();
        assert_eq!(views.len(), 3);
        assert_eq!(views[0].id, GroupId::Strict);
        assert_eq!(views[1].id, GroupId::Default);
        assert_eq!(views[2].budget, 3);
        assert!(views.iter().all(|v| v.constraints.is_empty()));
    }

    #[test]
    fn test_dictionary_toggle_keeps_words() {
        let mut state = state_with(&["abc"]);
        state.toggle_dictionary(1).unwrap();
        assert!(state.filtered()[0].is_empty());
        state.toggle_dictionary(1).unwrap();
        assert_eq!(state.filtered()[0], vec!["abc"]);
        assert_eq!(state.toggle_dictionary(2).unwrap_err(), StateError::NoSuchDictionary(2));
    }

    #[test]
    fn test_add_and_remove_dictionary() {
        let mut state = state_with(&["abc"]);
        state.add_constraint(Constraint::length_exact(2).unwrap());
        state.add_dictionary(Dictionary::from_words("more", vec!["xy".to_string(), "xyz".to_string()]));
        assert_eq!(state.filtered()[1], vec!["xy"]);
        state.remove_dictionary(1).unwrap();
        assert_eq!(state.dictionaries().len(), 1);
        assert_eq!(state.filtered()[0], vec!["xy"]);
    }
}

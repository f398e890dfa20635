//! Constraints over candidate words.
//!
//! Every constraint reports an [`Outcome`] for a candidate: a number of
//! errors, or an outright rejection. Exact constraints only ever report zero
//! errors or reject, so they behave the same under any budget.

use crate::error::ConstraintError;
use crate::morse::MorsePattern;
use regex::Regex;
use std::fmt;

// Lower runs first inside a group. Only affects speed.
const LENGTH_PRIORITY: i32 = -10;
const POSITION_PRIORITY: i32 = -5;
const MORSE_PRIORITY: i32 = -2;
const REGEX_PRIORITY: i32 = 0;
const CONTAINS_PRIORITY: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Errors(usize),
    Reject,
}

impl Outcome {
    #[must_use]
    pub fn from_bool(pass: bool) -> Self {
        if pass { Self::Errors(0) } else { Self::Reject }
    }
}

/// Required count per letter `a`..`z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LetterCounts([usize; 26]);

impl LetterCounts {
    /// Counts ASCII letters case-insensitively and ignores everything else.
    #[must_use]
    pub fn of(s: &str) -> Self {
        let mut counts = [0; 26];
        for c in s.chars() {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() {
                counts[(c as u8 - b'a') as usize] += 1;
            }
        }
        Self(counts)
    }

    #[must_use]
    pub fn get(&self, letter: char) -> usize {
        let c = letter.to_ascii_lowercase();
        if c.is_ascii_lowercase() {
            self.0[(c as u8 - b'a') as usize]
        } else {
            0
        }
    }

    /// Letters of `self` that `available` lacks, counted with multiplicity.
    /// Stops and returns `None` as soon as the total exceeds `budget`.
    #[must_use]
    pub fn shortfall(&self, available: &Self, budget: usize) -> Option<usize> {
        let mut missing = 0;
        for (need, have) in self.0.iter().zip(available.0.iter()) {
            missing += need.saturating_sub(*have);
            if missing > budget {
                return None;
            }
        }
        Some(missing)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }
}

#[derive(Debug, Clone)]
pub enum ConstraintKind {
    LengthExact(usize),
    LengthMin(usize),
    LengthMax(usize),
    Contains { letters: String, required: LetterCounts },
    /// 1-indexed position whose character must be among `allowed`.
    Position { position: usize, allowed: String },
    /// 1-indexed positions with `first < second`.
    Agree { first: usize, second: usize },
    Regex { source: String, compiled: Regex },
    Morse(MorsePattern),
}

/// A single predicate over candidates.
///
/// The kind and its parameters are fixed at construction; only the active
/// flag may change afterwards.
#[derive(Debug, Clone)]
pub struct Constraint {
    kind: ConstraintKind,
    priority: i32,
    active: bool,
}

impl Constraint {
    fn new(kind: ConstraintKind, priority: i32) -> Self {
        Self {
            kind,
            priority,
            active: true,
        }
    }

    pub fn length_exact(len: usize) -> Result<Self, ConstraintError> {
        if len == 0 {
            return Err(ConstraintError::ZeroLength);
        }
        Ok(Self::new(ConstraintKind::LengthExact(len), LENGTH_PRIORITY))
    }

    pub fn length_min(len: usize) -> Result<Self, ConstraintError> {
        if len == 0 {
            return Err(ConstraintError::ZeroLength);
        }
        Ok(Self::new(ConstraintKind::LengthMin(len), LENGTH_PRIORITY))
    }

    pub fn length_max(len: usize) -> Result<Self, ConstraintError> {
        if len == 0 {
            return Err(ConstraintError::ZeroLength);
        }
        Ok(Self::new(ConstraintKind::LengthMax(len), LENGTH_PRIORITY))
    }

    /// The candidate must contain every letter of `letters`, with multiplicity,
    /// in any order.
    #[must_use]
    pub fn contains(letters: &str) -> Self {
        let required = LetterCounts::of(letters);
        Self::new(
            ConstraintKind::Contains {
                letters: letters.trim().to_string(),
                required,
            },
            CONTAINS_PRIORITY,
        )
    }

    pub fn position(position: usize, allowed: &str) -> Result<Self, ConstraintError> {
        if position == 0 {
            return Err(ConstraintError::ZeroPosition);
        }
        let allowed: String = allowed
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Ok(Self::new(
            ConstraintKind::Position { position, allowed },
            POSITION_PRIORITY,
        ))
    }

    /// Positions may be given in either order.
    pub fn agree(a: usize, b: usize) -> Result<Self, ConstraintError> {
        if a == 0 || b == 0 {
            return Err(ConstraintError::ZeroPosition);
        }
        if a == b {
            return Err(ConstraintError::EqualPositions(a));
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        Ok(Self::new(
            ConstraintKind::Agree { first, second },
            POSITION_PRIORITY,
        ))
    }

    /// The whole candidate must match `pattern`.
    pub fn regex(pattern: &str) -> Result<Self, ConstraintError> {
        let compiled = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self::new(
            ConstraintKind::Regex {
                source: pattern.to_string(),
                compiled,
            },
            REGEX_PRIORITY,
        ))
    }

    pub fn morse(pattern: &str) -> Result<Self, ConstraintError> {
        let pattern = MorsePattern::parse(pattern)?;
        Ok(Self::new(ConstraintKind::Morse(pattern), MORSE_PRIORITY))
    }

    #[must_use]
    pub fn kind(&self) -> &ConstraintKind {
        &self.kind
    }

    /// Whether the constraint can report errors other than zero.
    #[must_use]
    pub fn is_error_tolerant(&self) -> bool {
        matches!(
            self.kind,
            ConstraintKind::Contains { .. } | ConstraintKind::Morse(_)
        )
    }

    /// Upper bound on the errors any candidate can accrue.
    #[must_use]
    pub fn max_errors(&self) -> usize {
        match &self.kind {
            ConstraintKind::Contains { required, .. } => required.total(),
            ConstraintKind::Morse(pattern) => pattern.len(),
            _ => 0,
        }
    }

    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn toggle_active(&mut self) {
        self.active = !self.active;
    }

    /// Error count for `candidate` given that at most `budget` errors are
    /// still affordable. Anything above `budget` is reported as `Reject`.
    #[must_use]
    pub fn outcome(&self, candidate: &str, budget: usize) -> Outcome {
        match &self.kind {
            ConstraintKind::LengthExact(n) => Outcome::from_bool(candidate.chars().count() == *n),
            ConstraintKind::LengthMin(n) => Outcome::from_bool(candidate.chars().count() >= *n),
            ConstraintKind::LengthMax(n) => Outcome::from_bool(candidate.chars().count() <= *n),
            ConstraintKind::Contains { required, .. } => required
                .shortfall(&LetterCounts::of(candidate), budget)
                .map_or(Outcome::Reject, Outcome::Errors),
            ConstraintKind::Position { position, allowed } => Outcome::from_bool(
                candidate
                    .chars()
                    .nth(position - 1)
                    .is_some_and(|c| allowed.contains(c)),
            ),
            ConstraintKind::Agree { first, second } => {
                let mut chars = candidate.chars();
                let a = chars.nth(first - 1);
                let b = chars.nth(second - first - 1);
                Outcome::from_bool(matches!((a, b), (Some(a), Some(b)) if a == b))
            }
            ConstraintKind::Regex { compiled, .. } => Outcome::from_bool(compiled.is_match(candidate)),
            ConstraintKind::Morse(pattern) => pattern
                .mismatches(candidate, budget)
                .map_or(Outcome::Reject, Outcome::Errors),
        }
    }

    /// Plain pass/fail, i.e. zero errors allowed.
    #[must_use]
    pub fn accepts(&self, candidate: &str) -> bool {
        self.outcome(candidate, 0) == Outcome::Errors(0)
    }

    /// Description of the parameters, without the active marker.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.kind {
            ConstraintKind::LengthExact(n) => format!("Length is exactly {n}."),
            ConstraintKind::LengthMin(n) => format!("Length is at least {n}."),
            ConstraintKind::LengthMax(n) => format!("Length is at most {n}."),
            ConstraintKind::Contains { letters, .. } => {
                format!("Must contain the following characters: {letters}")
            }
            ConstraintKind::Position { position, allowed } => {
                format!("The {position}. character is among {allowed}.")
            }
            ConstraintKind::Agree { first, second } => {
                format!("The {first}. and {second}. characters agree.")
            }
            ConstraintKind::Regex { source, .. } => format!("Matches regexp {source}"),
            ConstraintKind::Morse(pattern) => {
                format!("Must match the following Morse pattern: {}", pattern.source())
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())?;
        if !self.active {
            write!(f, " (inactive)")?;
        }
        Ok(())
    }
}

//! Partial-knowledge Morse patterns.
//!
//! A pattern is a sequence of tokens, each resolving to the set of letters
//! that may appear at that position:
//! - `a`..`z`: exactly that letter
//! - `*`: any letter
//! - `1`..`4`: any letter whose code has that many symbols
//! - a run of 1-4 of `.`, `-`, `?`: letters whose code matches, `?` being
//!   either symbol (`.-?` matches `r` and `w`)
//!
//! Tokens are separated by whitespace; letters, digits and `*` may also be
//! written back to back (`a2*`), while a dot/dash run always forms a single
//! token.

use std::fmt;
use thiserror::Error;

pub const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

const MAX_CODE_LEN: usize = 4;

pub const MORSE_CODE: [(char, &str); 26] = [
    ('a', ".-"),
    ('b', "-..."),
    ('c', "-.-."),
    ('d', "-.."),
    ('e', "."),
    ('f', "..-."),
    ('g', "--."),
    ('h', "...."),
    ('i', ".."),
    ('j', ".---"),
    ('k', "-.-"),
    ('l', ".-.."),
    ('m', "--"),
    ('n', "-."),
    ('o', "---"),
    ('p', ".--."),
    ('q', "--.-"),
    ('r', ".-."),
    ('s', "..."),
    ('t', "-"),
    ('u', "..-"),
    ('v', "...-"),
    ('w', ".--"),
    ('x', "-..-"),
    ('y', "-.--"),
    ('z', "--.."),
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MorseError {
    #[error("Morse pattern is empty")]
    Empty,
    #[error("invalid character '{0}' in Morse pattern")]
    InvalidCharacter(char),
    #[error("Morse token '{0}' is longer than {MAX_CODE_LEN} symbols")]
    TokenTooLong(String),
}

/// A subset of the 26 lowercase ASCII letters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LetterSet(u32);

impl LetterSet {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self((1 << 26) - 1);

    fn bit(c: char) -> Option<u32> {
        let c = c.to_ascii_lowercase();
        c.is_ascii_lowercase().then(|| 1 << (c as u8 - b'a'))
    }

    #[must_use]
    pub fn from_letters(letters: &str) -> Self {
        Self(letters.chars().filter_map(Self::bit).fold(0, |acc, b| acc | b))
    }

    pub fn insert(&mut self, c: char) {
        if let Some(b) = Self::bit(c) {
            self.0 |= b;
        }
    }

    /// ASCII letters are matched case-insensitively; anything else is never a member.
    #[must_use]
    pub fn contains(self, c: char) -> bool {
        Self::bit(c).is_some_and(|b| self.0 & b != 0)
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn letters(self) -> impl Iterator<Item = char> {
        ALPHABET.chars().filter(move |&c| self.contains(c))
    }
}

impl fmt::Display for LetterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.letters() {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for LetterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LetterSet({self})")
    }
}

/// Letters whose code has exactly `len` symbols.
#[must_use]
pub fn letters_with_code_len(len: usize) -> LetterSet {
    let mut set = LetterSet::EMPTY;
    for (c, code) in MORSE_CODE {
        if code.len() == len {
            set.insert(c);
        }
    }
    set
}

/// Resolve a dot/dash/`?` run against the code table.
fn resolve_code_pattern(token: &str) -> Result<LetterSet, MorseError> {
    if token.len() > MAX_CODE_LEN {
        return Err(MorseError::TokenTooLong(token.to_string()));
    }
    let mut set = LetterSet::EMPTY;
    for (c, code) in MORSE_CODE {
        let matches = code.len() == token.len()
            && token.chars().zip(code.chars()).all(|(t, m)| t == '?' || t == m);
        if matches {
            set.insert(c);
        }
    }
    Ok(set)
}

/// A compiled Morse pattern: one acceptance set per position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorsePattern {
    source: String,
    tokens: Vec<String>,
    positions: Vec<LetterSet>,
}

impl MorsePattern {
    pub fn parse(pattern: &str) -> Result<Self, MorseError> {
        let tokens = tokenize(pattern)?;
        if tokens.is_empty() {
            return Err(MorseError::Empty);
        }
        let positions = tokens
            .iter()
            .map(|t| resolve_token(t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            source: pattern.trim().to_string(),
            tokens,
            positions,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    #[must_use]
    pub fn positions(&self) -> &[LetterSet] {
        &self.positions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of mismatching positions, or `None` if the candidate is shorter
    /// than the pattern or the count exceeds `budget`.
    #[must_use]
    pub fn mismatches(&self, candidate: &str, budget: usize) -> Option<usize> {
        let mut chars = candidate.chars();
        let mut errors = 0;
        for set in &self.positions {
            let c = chars.next()?;
            if !set.contains(c) {
                errors += 1;
                if errors > budget {
                    return None;
                }
            }
        }
        Some(errors)
    }
}

fn resolve_token(token: &str) -> Result<LetterSet, MorseError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_lowercase() => Ok(LetterSet::from_letters(token)),
        (Some('*'), None) => Ok(LetterSet::ALL),
        (Some(d @ '1'..='4'), None) => Ok(letters_with_code_len(d as usize - '0' as usize)),
        _ => resolve_code_pattern(token),
    }
}

fn tokenize(pattern: &str) -> Result<Vec<String>, MorseError> {
    let mut tokens = Vec::new();
    for word in pattern.split_whitespace() {
        let word = word.to_lowercase();
        let mut run = String::new();
        for c in word.chars() {
            match c {
                '.' | '-' | '?' => run.push(c),
                'a'..='z' | '*' | '1'..='4' => {
                    if !run.is_empty() {
                        tokens.push(std::mem::take(&mut run));
                    }
                    tokens.push(c.to_string());
                }
                other => return Err(MorseError::InvalidCharacter(other)),
            }
        }
        if !run.is_empty() {
            tokens.push(run);
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_table_is_a_bijection() {
        let mut codes: Vec<&str> = MORSE_CODE.iter().map(|(_, code)| *code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 26);
    }

    #[test]
    fn test_letters_by_code_length() {
        assert_eq!(letters_with_code_len(1), LetterSet::from_letters("et"));
        assert_eq!(letters_with_code_len(2), LetterSet::from_letters("aimn"));
        assert_eq!(letters_with_code_len(3).len(), 8);
        assert_eq!(letters_with_code_len(4).len(), 12);
    }

    #[test]
    fn test_single_letter_and_wildcard_tokens() {
        let pattern = MorsePattern::parse("a *").unwrap();
        assert_eq!(pattern.positions()[0], LetterSet::from_letters("a"));
        assert_eq!(pattern.positions()[1], LetterSet::ALL);
    }

    #[test]
    fn test_question_mark_matches_either_symbol() {
        let pattern = MorsePattern::parse(".-?").unwrap();
        assert_eq!(pattern.positions()[0], LetterSet::from_letters("rw"));
    }

    #[test]
    fn test_dot_is_literal() {
        // "." must not behave like a regex wildcard
        let pattern = MorsePattern::parse(".").unwrap();
        assert_eq!(pattern.positions()[0], LetterSet::from_letters("e"));
        let pattern = MorsePattern::parse("????").unwrap();
        assert_eq!(pattern.positions()[0], letters_with_code_len(4));
    }

    #[test]
    fn test_glued_tokens_are_split() {
        let pattern = MorsePattern::parse("A2* .-").unwrap();
        assert_eq!(pattern.tokens(), ["a", "2", "*", ".-"]);
        assert_eq!(pattern.len(), 4);
    }

    #[test]
    fn test_malformed_patterns_rejected() {
        assert_eq!(MorsePattern::parse("   "), Err(MorseError::Empty));
        assert_eq!(MorsePattern::parse("a 5"), Err(MorseError::InvalidCharacter('5')));
        assert_eq!(MorsePattern::parse("a#"), Err(MorseError::InvalidCharacter('#')));
        assert_eq!(
            MorsePattern::parse(".-.-."),
            Err(MorseError::TokenTooLong(".-.-.".to_string()))
        );
    }

    #[test]
    fn test_mismatches() {
        let pattern = MorsePattern::parse("a 2 *").unwrap();
        assert_eq!(pattern.mismatches("aim", 0), Some(0));
        assert_eq!(pattern.mismatches("aims", 0), Some(0));
        assert_eq!(pattern.mismatches("bim", 1), Some(1));
        assert_eq!(pattern.mismatches("bbm", 1), None);
        assert_eq!(pattern.mismatches("bbm", 2), Some(2));
        assert_eq!(pattern.mismatches("ai", 5), None);
    }

    #[test]
    fn test_letter_set_display() {
        assert_eq!(LetterSet::from_letters("TeA").to_string(), "aet");
        assert!(!LetterSet::ALL.contains('1'));
        assert!(LetterSet::ALL.contains('Q'));
    }
}

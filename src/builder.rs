//! Step-by-step construction of constraints from user input.
//!
//! A [`ConstraintBuilder`] waits for one argument at a time. Feeding it a
//! line either asks for the next argument, yields the finished constraint,
//! or aborts (empty line). Arguments are validated as they arrive, so a
//! builder never holds an invalid argument.

use crate::constraint::Constraint;
use crate::error::ConstraintError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgKind {
    /// Integer greater than zero.
    Positive,
    Text,
}

#[derive(Debug, Clone, Copy)]
struct Prompt {
    text: &'static str,
    kind: ArgKind,
}

const LENGTH_PROMPTS: &[Prompt] = &[Prompt {
    text: "Please enter length: ",
    kind: ArgKind::Positive,
}];

/// The kinds of constraint a user can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipe {
    LengthExact,
    LengthMax,
    LengthMin,
    Contains,
    Position,
    Agree,
    Morse,
    Regex,
}

impl Recipe {
    /// Menu order.
    pub const ALL: [Recipe; 8] = [
        Recipe::LengthExact,
        Recipe::LengthMax,
        Recipe::LengthMin,
        Recipe::Contains,
        Recipe::Position,
        Recipe::Agree,
        Recipe::Morse,
        Recipe::Regex,
    ];

    /// 1-based, as listed in the menu.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index.checked_sub(1)?).copied()
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::LengthExact => "Match length exactly",
            Self::LengthMax => "Ensure maximal length",
            Self::LengthMin => "Ensure minimal length",
            Self::Contains => "Ensure that a substring is contained (in any order, with multiplicity)",
            Self::Position => "A given position is in a set of characters",
            Self::Agree => "Some characters are equal",
            Self::Morse => "Filter by (partial knowledge of) morse code",
            Self::Regex => "Match regular expression",
        }
    }

    fn prompts(self) -> &'static [Prompt] {
        match self {
            Self::LengthExact | Self::LengthMax | Self::LengthMin => LENGTH_PROMPTS,
            Self::Contains => &[Prompt {
                text: "Enter substring: ",
                kind: ArgKind::Text,
            }],
            Self::Position => &[
                Prompt {
                    text: "Enter position (1-indexed): ",
                    kind: ArgKind::Positive,
                },
                Prompt {
                    text: "Enter possible characters: ",
                    kind: ArgKind::Text,
                },
            ],
            Self::Agree => &[
                Prompt {
                    text: "Enter first position (1-indexed): ",
                    kind: ArgKind::Positive,
                },
                Prompt {
                    text: "Enter second position (1-indexed): ",
                    kind: ArgKind::Positive,
                },
            ],
            Self::Morse => &[Prompt {
                text: "Morse conditions, separated by whitespace: 1-4 (code length), \
                       a-z (that letter), * (any letter), runs of . - ? (code, ? = either): ",
                kind: ArgKind::Text,
            }],
            Self::Regex => &[Prompt {
                text: "Enter regular expression required to match: ",
                kind: ArgKind::Text,
            }],
        }
    }

    #[must_use]
    pub fn builder(self) -> ConstraintBuilder {
        ConstraintBuilder::new(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Arg {
    Number(usize),
    Text(String),
}

/// Construction in progress: the recipe and the arguments accepted so far.
#[derive(Debug, Clone)]
pub struct ConstraintBuilder {
    recipe: Recipe,
    args: Vec<Arg>,
}

#[derive(Debug)]
pub enum Step {
    Awaiting(ConstraintBuilder),
    Built(Constraint),
    Aborted,
}

impl ConstraintBuilder {
    #[must_use]
    pub fn new(recipe: Recipe) -> Self {
        Self {
            recipe,
            args: Vec::new(),
        }
    }

    /// The question for the argument currently awaited.
    #[must_use]
    pub fn prompt(&self) -> &'static str {
        self.current().text
    }

    fn current(&self) -> Prompt {
        self.recipe.prompts()[self.args.len()]
    }

    /// Supply the awaited argument. An empty line aborts construction.
    pub fn feed(mut self, input: &str) -> Result<Step, ConstraintError> {
        let raw = input.trim_end_matches(['\n', '\r']);
        if raw.trim().is_empty() {
            return Ok(Step::Aborted);
        }
        let arg = match self.current().kind {
            ArgKind::Positive => {
                let n: usize = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConstraintError::NotANumber(raw.trim().to_string()))?;
                if n == 0 {
                    return Err(match self.recipe {
                        Recipe::LengthExact | Recipe::LengthMax | Recipe::LengthMin => {
                            ConstraintError::ZeroLength
                        }
                        _ => ConstraintError::ZeroPosition,
                    });
                }
                Arg::Number(n)
            }
            ArgKind::Text => Arg::Text(raw.to_string()),
        };
        self.args.push(arg);

        if self.args.len() < self.recipe.prompts().len() {
            Ok(Step::Awaiting(self))
        } else {
            self.finish().map(Step::Built)
        }
    }

    fn finish(self) -> Result<Constraint, ConstraintError> {
        use Arg::{Number, Text};
        match (self.recipe, self.args.as_slice()) {
            (Recipe::LengthExact, [Number(n)]) => Constraint::length_exact(*n),
            (Recipe::LengthMax, [Number(n)]) => Constraint::length_max(*n),
            (Recipe::LengthMin, [Number(n)]) => Constraint::length_min(*n),
            (Recipe::Contains, [Text(s)]) => Ok(Constraint::contains(s)),
            (Recipe::Position, [Number(p), Text(s)]) => Constraint::position(*p, s),
            (Recipe::Agree, [Number(a), Number(b)]) => Constraint::agree(*a, *b),
            (Recipe::Morse, [Text(s)]) => Constraint::morse(s),
            (Recipe::Regex, [Text(s)]) => Constraint::regex(s),
            (recipe, args) => unreachable!("{recipe:?} finished with arguments {args:?}"),
        }
    }
}

/// Run a builder to completion on a sequence of input lines.
pub fn build_from_lines<'a, I>(recipe: Recipe, lines: I) -> Result<Option<Constraint>, ConstraintError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut builder = recipe.builder();
    for line in lines {
        match builder.feed(line)? {
            Step::Awaiting(next) => builder = next,
            Step::Built(constraint) => return Ok(Some(constraint)),
            Step::Aborted => return Ok(None),
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ConstraintKind;

    #[test]
    fn test_recipe_from_index() {
        assert_eq!(Recipe::from_index(1), Some(Recipe::LengthExact));
        assert_eq!(Recipe::from_index(8), Some(Recipe::Regex));
        assert_eq!(Recipe::from_index(0), None);
        assert_eq!(Recipe::from_index(9), None);
    }

    #[test]
    fn test_single_argument_recipe() {
        let builder = Recipe::LengthExact.builder();
        assert_eq!(builder.prompt(), "Please enter length: ");
        match builder.feed("5\n").unwrap() {
            Step::Built(c) => assert!(matches!(c.kind(), ConstraintKind::LengthExact(5))),
            other => panic!("Expected Built, got {other:?}"),
        }
    }

    #[test]
    fn test_two_argument_recipe() {
        let builder = Recipe::Position.builder();
        let Step::Awaiting(builder) = builder.feed("2").unwrap() else {
            panic!("Expected a second prompt");
        };
        assert_eq!(builder.prompt(), "Enter possible characters: ");
        let Step::Built(c) = builder.feed("AE").unwrap() else {
            panic!("Expected Built");
        };
        assert!(c.accepts("bar"));
        assert!(!c.accepts("bbr"));
    }

    #[test]
    fn test_empty_input_aborts() {
        assert!(matches!(Recipe::Regex.builder().feed("").unwrap(), Step::Aborted));
        assert!(matches!(Recipe::Agree.builder().feed("  \n").unwrap(), Step::Aborted));
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(matches!(
            Recipe::LengthMin.builder().feed("abc"),
            Err(ConstraintError::NotANumber(_))
        ));
        assert!(matches!(
            Recipe::LengthMin.builder().feed("-3"),
            Err(ConstraintError::NotANumber(_))
        ));
        assert!(matches!(
            Recipe::LengthMin.builder().feed("0"),
            Err(ConstraintError::ZeroLength)
        ));
        assert!(matches!(
            Recipe::Position.builder().feed("0"),
            Err(ConstraintError::ZeroPosition)
        ));
    }

    #[test]
    fn test_equal_agree_positions_rejected_at_the_end() {
        let result = build_from_lines(Recipe::Agree, ["3", "3"]);
        assert!(matches!(result, Err(ConstraintError::EqualPositions(3))));
    }

    #[test]
    fn test_build_from_lines() {
        let c = build_from_lines(Recipe::Morse, ["a 2 *"]).unwrap().unwrap();
        assert!(c.accepts("aim"));
        assert!(build_from_lines(Recipe::Agree, ["1"]).unwrap().is_none());
        assert!(matches!(
            build_from_lines(Recipe::Regex, ["(unclosed"]),
            Err(ConstraintError::Regex(_))
        ));
    }

    #[test]
    fn test_text_argument_keeps_inner_spaces() {
        let c = build_from_lines(Recipe::Morse, [".- ..  *\n"]).unwrap().unwrap();
        assert!(matches!(c.kind(), ConstraintKind::Morse(p) if p.len() == 3));
    }
}

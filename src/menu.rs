//! The interactive session: menu commands, the status report and the loop
//! that ties a frontend to the [`State`].

use crate::builder::{Recipe, Step};
use crate::error::CommandError;
use crate::state::{GroupId, State};
use crate::wordbank::{DictSpec, Dictionary};
use crate::normalize::Normalizer;
use crate::{debug_log, info_log};

/// One line of menu input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    ToggleEvaluation,
    AddConstraint(Recipe),
    RemoveConstraint(Option<usize>),
    ToggleConstraint(Option<usize>),
    SetDefaultBudget(Option<usize>),
    AddGroup(Option<usize>),
    RemoveGroup(Option<usize>),
    SetGroupBudget(Option<usize>, Option<usize>),
    /// Move a constraint into a custom group; group 0 is the default group.
    MoveConstraint(Option<usize>, Option<usize>),
    Print(Option<usize>),
    Save(Option<usize>, Option<String>),
    AddDictionary(Option<String>),
    ToggleDictionary(Option<usize>),
    RemoveDictionary(Option<usize>),
    Reload,
}

fn number(s: &str) -> Result<usize, CommandError> {
    s.parse().map_err(|_| CommandError::NotANumber(s.to_string()))
}

fn numbers(rest: &str) -> Result<Vec<usize>, CommandError> {
    rest.split_whitespace().map(number).collect()
}

fn one(rest: &str) -> Result<Option<usize>, CommandError> {
    Ok(numbers(rest)?.first().copied())
}

fn two(rest: &str) -> Result<(Option<usize>, Option<usize>), CommandError> {
    let nums = numbers(rest)?;
    Ok((nums.first().copied(), nums.get(1).copied()))
}

fn text(rest: &str) -> Option<String> {
    let rest = rest.trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

impl Command {
    /// Parse a menu line. Returns `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        let Some(first) = line.chars().next() else {
            return Ok(None);
        };
        let lower = line.to_lowercase();
        let rest = &line[first.len_utf8()..];

        let command = match first.to_ascii_lowercase() {
            'x' => Self::Exit,
            'a' => Self::ToggleEvaluation,
            'r' => Self::RemoveConstraint(one(rest)?),
            't' => Self::ToggleConstraint(one(rest)?),
            'j' => Self::SetDefaultBudget(one(rest)?),
            'p' => Self::Print(one(rest)?),
            'm' => {
                let (f, g) = two(rest)?;
                Self::MoveConstraint(f, g)
            }
            'f' => {
                let n = number(rest.trim())?;
                Self::AddConstraint(Recipe::from_index(n).ok_or(CommandError::NoSuchRecipe(n))?)
            }
            's' => {
                let mut parts = rest.trim().splitn(2, char::is_whitespace);
                let index = match parts.next().filter(|p| !p.is_empty()) {
                    Some(p) => Some(number(p)?),
                    None => None,
                };
                Self::Save(index, parts.next().and_then(text))
            }
            'g' if lower.starts_with("gd") => Self::RemoveGroup(one(&line[2..])?),
            'g' if lower.starts_with("gb") => {
                let (g, b) = two(&line[2..])?;
                Self::SetGroupBudget(g, b)
            }
            'g' => Self::AddGroup(one(rest)?),
            'd' if lower.starts_with("da") => Self::AddDictionary(text(&line[2..])),
            'd' if lower.starts_with("dt") => Self::ToggleDictionary(one(&line[2..])?),
            'd' if lower.starts_with("dd") => Self::RemoveDictionary(one(&line[2..])?),
            'd' if lower.starts_with("dr") => Self::Reload,
            _ => return Err(CommandError::Unrecognized(line.to_string())),
        };
        Ok(Some(command))
    }
}

/// Menu help, one entry per command.
#[must_use]
pub fn menu_lines(evaluating: bool) -> Vec<String> {
    let mut lines = vec![
        if evaluating {
            "a: Stop evaluating filters".to_string()
        } else {
            "a: Start evaluating filters".to_string()
        },
        "r<n>: Remove filter    t<n>: (de)activate filter    j<n>: Allowed deviations (default group)".to_string(),
        "g<n>: New group with n deviations    gd<g>: Delete group    gb<g> <n>: Group deviations".to_string(),
        "m<f> <g>: Move filter f to group g (0 = default)".to_string(),
        "da <path>: Add dictionary    dt<n>: (de)activate    dd<n>: Delete    dr: Reload all".to_string(),
    ];
    if evaluating {
        lines.push("p<n>: Print candidates    s<n> <file>: Save candidates to file".to_string());
    }
    lines.push("Add filter:".to_string());
    for (i, recipe) in Recipe::ALL.iter().enumerate() {
        lines.push(format!("    f{}: {}", i + 1, recipe.description()));
    }
    lines.push("x: Exit".to_string());
    lines
}

/// A group header and its numbered constraints, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSection {
    /// `None` for the strict group and a default group without deviations.
    pub header: Option<String>,
    pub filters: Vec<(usize, String)>,
}

/// Everything the status panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub evaluating: bool,
    pub dictionaries: Vec<String>,
    pub groups: Vec<GroupSection>,
}

impl StatusReport {
    #[must_use]
    pub fn from_state(state: &State) -> Self {
        let dictionaries = state
            .dictionaries()
            .iter()
            .zip(state.filtered())
            .enumerate()
            .map(|(i, (dict, filtered))| {
                if state.is_evaluating() && dict.is_active() {
                    format!("{}: {dict} ({} out of {} entries)", i + 1, filtered.len(), dict.len())
                } else {
                    format!("{}: {dict} ({} entries)", i + 1, dict.len())
                }
            })
            .collect();

        let mut groups = Vec::new();
        let mut index = 1;
        let mut letter = b'A';
        for view in state.groups_in_order() {
            let header = match view.id {
                GroupId::Strict => None,
                GroupId::Default if view.budget == 0 => None,
                GroupId::Default => Some(format!(
                    "The following filters are fuzzily matched, allowing a total of {} deviations.",
                    view.budget
                )),
                GroupId::Custom(_) => {
                    let header = format!(
                        "{}: The following filters are fuzzily matched, allowing a total of {} deviations.",
                        letter as char, view.budget
                    );
                    letter = letter.saturating_add(1);
                    Some(header)
                }
            };
            let filters = view
                .constraints
                .iter()
                .map(|c| {
                    let entry = (index, c.to_string());
                    index += 1;
                    entry
                })
                .collect();
            groups.push(GroupSection { header, filters });
        }

        Self {
            evaluating: state.is_evaluating(),
            dictionaries,
            groups,
        }
    }

    #[must_use]
    pub fn has_filters(&self) -> bool {
        self.groups.iter().any(|g| !g.filters.is_empty())
    }

    /// Plain-text rendering, shared by both frontends.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.evaluating {
            lines.push("***Evaluation of filters is currently turned off***".to_string());
        }
        lines.push("Currently loaded dictionaries:".to_string());
        lines.extend(self.dictionaries.iter().map(|d| format!("    {d}")));
        if self.has_filters() {
            lines.push("Currently selected filters:".to_string());
        } else {
            lines.push("No filters selected".to_string());
        }
        for section in &self.groups {
            if let Some(header) = &section.header {
                lines.push(format!("    {header}"));
                if section.filters.is_empty() {
                    lines.push("        **NO FILTERS IN THIS GROUP**".to_string());
                }
            }
            lines.extend(section.filters.iter().map(|(i, f)| format!("        {i}: {f}")));
        }
        lines
    }
}

/// What a frontend must provide to drive a session.
pub trait Interface {
    fn display_status(&mut self, report: &StatusReport, menu: &[String]);
    /// Ask for a line. `None` ends the session (end of input, or quit).
    fn read_line(&mut self, prompt: &str) -> Option<String>;
    fn display_candidates(&mut self, title: &str, candidates: &[String]);
    fn display_message(&mut self, message: &str);
    fn display_error(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Run the menu loop until the user exits or input ends.
pub fn run_session<I: Interface>(state: &mut State, interface: &mut I) {
    info_log!("Session started");
    loop {
        state.validate();
        interface.display_status(&StatusReport::from_state(state), &menu_lines(state.is_evaluating()));
        let Some(line) = interface.read_line("Please select command: ") else {
            break;
        };
        debug_log!("Menu input: {:?}", line);
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                interface.display_error(&e.to_string());
                continue;
            }
        };
        if execute(state, interface, command) == Flow::Exit {
            break;
        }
    }
    info_log!("Session ended");
}

/// Use `given` or ask for the number; `None` aborts the command.
fn ask_number<I: Interface>(interface: &mut I, given: Option<usize>, prompt: &str) -> Option<usize> {
    if given.is_some() {
        return given;
    }
    let line = interface.read_line(prompt)?;
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match number(line) {
        Ok(n) => Some(n),
        Err(e) => {
            interface.display_error(&format!("{e}\nAborting."));
            None
        }
    }
}

fn ask_text<I: Interface>(interface: &mut I, given: Option<String>, prompt: &str) -> Option<String> {
    given.or_else(|| interface.read_line(prompt).and_then(|l| text(&l)))
}

/// A single loaded dictionary needs no index.
fn ask_dictionary<I: Interface>(state: &State, interface: &mut I, given: Option<usize>) -> Option<usize> {
    match state.dictionaries().len() {
        0 => {
            interface.display_error("No dictionaries loaded");
            None
        }
        1 if given.is_none() => Some(1),
        _ => ask_number(interface, given, "Input index of dictionary: "),
    }
}

fn report<I: Interface, E: std::fmt::Display>(interface: &mut I, result: Result<(), E>) {
    if let Err(e) = result {
        interface.display_error(&e.to_string());
    }
}

fn execute<I: Interface>(state: &mut State, interface: &mut I, command: Command) -> Flow {
    match command {
        Command::Exit => return Flow::Exit,
        Command::ToggleEvaluation => state.set_evaluating(!state.is_evaluating()),
        Command::AddConstraint(recipe) => add_constraint(state, interface, recipe),
        Command::RemoveConstraint(n) => {
            if let Some(n) = ask_number(interface, n, "Input index of filter: ") {
                report(interface, state.remove_constraint(n).map(|_| ()));
            }
        }
        Command::ToggleConstraint(n) => {
            if let Some(n) = ask_number(interface, n, "Input index of filter: ") {
                report(interface, state.toggle_constraint(n));
            }
        }
        Command::SetDefaultBudget(n) => {
            if let Some(n) = ask_number(interface, n, "Enter the number of deviations allowed for the filters: ") {
                state.set_default_budget(n);
            }
        }
        Command::AddGroup(n) => {
            if let Some(n) = ask_number(interface, n, "Enter the number of deviations allowed in the new group: ") {
                state.add_group(n);
            }
        }
        Command::RemoveGroup(g) => {
            if let Some(g) = ask_number(interface, g, "Input index of group (A = 1): ") {
                report(interface, state.remove_group(g));
            }
        }
        Command::SetGroupBudget(g, n) => {
            if let Some(g) = ask_number(interface, g, "Input index of group (A = 1): ")
                && let Some(n) = ask_number(interface, n, "Enter the number of deviations allowed: ")
            {
                report(interface, state.set_group_budget(g, n));
            }
        }
        Command::MoveConstraint(f, g) => {
            if let Some(f) = ask_number(interface, f, "Input index of filter: ")
                && let Some(g) = ask_number(interface, g, "Input index of group (A = 1, 0 = default): ")
            {
                let result = if g == 0 {
                    state.unassign_from_group(f)
                } else {
                    state.assign_to_group(f, g)
                };
                report(interface, result);
            }
        }
        Command::Print(n) if state.is_evaluating() => {
            if let Some(n) = ask_dictionary(state, interface, n) {
                match state.filtered().get(n.wrapping_sub(1)) {
                    Some(words) => {
                        let title = format!("Candidates in {}", state.dictionaries()[n - 1].spec().display);
                        interface.display_candidates(&title, words);
                    }
                    None => interface.display_error(&format!("Number {n} out of range.")),
                }
            }
        }
        Command::Save(n, path) if state.is_evaluating() => {
            if let Some(n) = ask_dictionary(state, interface, n)
                && let Some(path) = ask_text(interface, path, "Please enter filename: ")
            {
                match state.save_filtered(n, &path) {
                    Ok(count) => interface.display_message(&format!("Saved {count} candidates to {path}")),
                    Err(e) => interface.display_error(&e.to_string()),
                }
            }
        }
        Command::Print(_) | Command::Save(..) => {
            interface.display_error("Evaluation is turned off; press 'a' to start evaluating filters");
        }
        Command::AddDictionary(path) => {
            if let Some(path) = ask_text(interface, path, "Path of the dictionary: ") {
                let dict = Dictionary::open(DictSpec::new(&path, Normalizer::default()));
                state.add_dictionary(dict);
            }
        }
        Command::ToggleDictionary(n) => {
            if let Some(n) = ask_dictionary(state, interface, n) {
                report(interface, state.toggle_dictionary(n));
            }
        }
        Command::RemoveDictionary(n) => {
            if let Some(n) = ask_dictionary(state, interface, n) {
                report(interface, state.remove_dictionary(n).map(|_| ()));
            }
        }
        Command::Reload => state.reload(),
    }
    Flow::Continue
}

/// Walk the user through the prompts of `recipe`. Nothing is added unless
/// every argument was valid.
fn add_constraint<I: Interface>(state: &mut State, interface: &mut I, recipe: Recipe) {
    let mut builder = recipe.builder();
    loop {
        let Some(line) = interface.read_line(builder.prompt()) else {
            return;
        };
        match builder.feed(&line) {
            Ok(Step::Awaiting(next)) => builder = next,
            Ok(Step::Built(constraint)) => {
                state.add_constraint(constraint);
                return;
            }
            Ok(Step::Aborted) => {
                interface.display_message("Aborted.");
                return;
            }
            Err(e) => {
                interface.display_error(&format!("Error: {e}\nAborting."));
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse("x"), Ok(Some(Command::Exit)));
        assert_eq!(Command::parse(" A "), Ok(Some(Command::ToggleEvaluation)));
        assert_eq!(Command::parse(""), Ok(None));
        assert_eq!(Command::parse("dr"), Ok(Some(Command::Reload)));
    }

    #[test]
    fn test_parse_numeric_arguments() {
        assert_eq!(Command::parse("r3"), Ok(Some(Command::RemoveConstraint(Some(3)))));
        assert_eq!(Command::parse("t 2"), Ok(Some(Command::ToggleConstraint(Some(2)))));
        assert_eq!(Command::parse("r"), Ok(Some(Command::RemoveConstraint(None))));
        assert_eq!(Command::parse("j2"), Ok(Some(Command::SetDefaultBudget(Some(2)))));
        assert_eq!(Command::parse("g1"), Ok(Some(Command::AddGroup(Some(1)))));
        assert_eq!(Command::parse("gd1"), Ok(Some(Command::RemoveGroup(Some(1)))));
        assert_eq!(Command::parse("gb1 4"), Ok(Some(Command::SetGroupBudget(Some(1), Some(4)))));
        assert_eq!(Command::parse("m2 0"), Ok(Some(Command::MoveConstraint(Some(2), Some(0)))));
        assert_eq!(Command::parse("dt2"), Ok(Some(Command::ToggleDictionary(Some(2)))));
        assert_eq!(Command::parse("r-1"), Err(CommandError::NotANumber("-1".to_string())));
    }

    #[test]
    fn test_parse_add_filter() {
        assert_eq!(Command::parse("f1"), Ok(Some(Command::AddConstraint(Recipe::LengthExact))));
        assert_eq!(Command::parse("f7"), Ok(Some(Command::AddConstraint(Recipe::Morse))));
        assert_eq!(Command::parse("f9"), Err(CommandError::NoSuchRecipe(9)));
        assert!(matches!(Command::parse("f"), Err(CommandError::NotANumber(_))));
    }

    #[test]
    fn test_parse_paths() {
        assert_eq!(
            Command::parse("s1 out file.txt"),
            Ok(Some(Command::Save(Some(1), Some("out file.txt".to_string()))))
        );
        assert_eq!(Command::parse("s"), Ok(Some(Command::Save(None, None))));
        assert_eq!(
            Command::parse("da /tmp/words"),
            Ok(Some(Command::AddDictionary(Some("/tmp/words".to_string()))))
        );
    }

    #[test]
    fn test_parse_unrecognized() {
        assert_eq!(Command::parse("q"), Err(CommandError::Unrecognized("q".to_string())));
        assert_eq!(Command::parse("dz"), Err(CommandError::Unrecognized("dz".to_string())));
    }

    #[test]
    fn test_status_report_groups_and_indices() {
        let words = vec!["abba".to_string(), "evil".to_string()];
        let mut state = State::new(vec![Dictionary::from_words("test", words)], 0, true);
        state.add_constraint(Constraint::length_exact(4).unwrap());
        state.add_constraint(Constraint::contains("v"));
        state.add_constraint(Constraint::contains("b"));
        state.add_group(2);
        state.assign_to_group(3, 1).unwrap();
        state.add_group(1);

        let report = StatusReport::from_state(&state);
        assert_eq!(report.dictionaries, vec!["1: test (1 out of 2 entries)"]);
        assert_eq!(report.groups.len(), 4);
        assert_eq!(report.groups[0].header, None);
        assert_eq!(report.groups[0].filters, vec![(1, "Length is exactly 4.".to_string())]);
        assert_eq!(report.groups[1].header, None);
        assert_eq!(report.groups[1].filters[0].0, 2);
        assert!(report.groups[2].header.as_deref().unwrap().starts_with("A: "));
        assert_eq!(report.groups[2].filters[0].0, 3);
        assert!(report.groups[3].header.as_deref().unwrap().starts_with("B: "));

        let lines = report.lines();
        assert!(lines.contains(&"        **NO FILTERS IN THIS GROUP**".to_string()));
    }

    #[test]
    fn test_menu_lines_depend_on_evaluation() {
        let on = menu_lines(true);
        let off = menu_lines(false);
        assert!(on[0].contains("Stop"));
        assert!(off[0].contains("Start"));
        assert!(on.iter().any(|l| l.starts_with("p<n>")));
        assert!(!off.iter().any(|l| l.starts_with("p<n>")));
        assert!(on.contains(&"    f8: Match regular expression".to_string()));
    }
}

// Library interface for wordfilter
// Frontends and integration tests go through these modules

pub mod builder;
pub mod cli;
pub mod constraint;
pub mod error;
pub mod filter;
pub mod logging;
pub mod menu;
pub mod morse;
pub mod normalize;
pub mod state;
pub mod tui;
pub mod wordbank;

// Re-export commonly used items for easier testing
pub use builder::{Recipe, build_from_lines};
pub use constraint::{Constraint, ConstraintKind, Outcome};
pub use error::{CommandError, ConstraintError, StateError};
pub use filter::{GroupPlan, apply_filter_groups, apply_filters, evaluate, partition};
pub use menu::{Interface, run_session};
pub use normalize::Normalizer;
pub use state::{GroupId, State};
pub use wordbank::{DictSpec, Dictionary, Encoding, load_words_from_file, load_words_from_str};

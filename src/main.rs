use std::io;
use wordfilter::cli::{CliInterface, parse_cli};
use wordfilter::logging::init_logging;
use wordfilter::tui::TuiInterface;
use wordfilter::wordbank::{DictSpec, DictStatus, Dictionary};
use wordfilter::{State, run_session};

fn main() {
    let cli = parse_cli();

    if let Err(e) = init_logging(cli.log_level) {
        eprintln!("Logging disabled: {e}");
    }
    log::info!("Starting wordfilter with {} dictionaries", cli.dictionaries.len());

    let dictionaries: Vec<Dictionary> = cli
        .dictionaries
        .iter()
        .map(|path| Dictionary::open(DictSpec::new(path, cli.normalizer).with_encoding(cli.encoding)))
        .collect();
    for dict in &dictionaries {
        if let DictStatus::Failed(message) = dict.status() {
            eprintln!("Failed to load '{}': {message}", dict.spec().display);
        }
    }

    let mut state = State::new(dictionaries, cli.default_budget, !cli.no_eval);

    if !cli.plain {
        match TuiInterface::new() {
            Ok(mut tui) => {
                run_session(&mut state, &mut tui);
                return;
            }
            Err(e) => {
                log::warn!("TUI unavailable, falling back to plain mode: {e}");
                eprintln!("Failed to start the terminal UI ({e}); using plain mode.");
            }
        }
    }

    let stdin = io::stdin();
    let mut interface = CliInterface::new(stdin.lock(), io::stdout());
    run_session(&mut state, &mut interface);
}

use quipsolve::cli::{parse_cli_args, CliRequest};
use quipsolve::cli_pretty_printing::{
    display_analysis, display_daily_solution, display_solve_results, failed_to_solve,
    input_is_empty,
};
use quipsolve::config::set_global_config;
use quipsolve::derivation;
use quipsolve::feed;
use quipsolve::key::SubstitutionKey;
use quipsolve::perform_solving;

fn main() {
    let (request, config) = parse_cli_args();

    match request {
        CliRequest::Solve { text, clue } => {
            if text.is_empty() {
                input_is_empty();
                return;
            }
            match perform_solving(&text, config) {
                Ok(results) => display_solve_results(&text, &results, clue.as_deref()),
                Err(e) => failed_to_solve(&e.to_string()),
            }
        }
        CliRequest::Daily { kind } => {
            set_global_config(config);
            match feed::fetch_daily(kind) {
                Ok(daily) => {
                    let mapping = feed::letter_mapping(&daily);
                    display_daily_solution(&daily, &mapping);
                }
                Err(e) => failed_to_solve(&e.to_string()),
            }
        }
        CliRequest::Analyze { text, clue } => {
            set_global_config(config);
            if text.is_empty() {
                input_is_empty();
                return;
            }
            let mut key = SubstitutionKey::new();
            if let Some((c, p)) = clue.as_deref().and_then(derivation::from_clue) {
                key.set(c, p);
            }
            display_analysis(&text, &key);
        }
    }
}

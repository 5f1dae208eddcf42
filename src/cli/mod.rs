//! Parses CLI arguments into a library request plus a `Config`.

use std::{fs::File, io::Read};

use crate::config::Config;
use crate::feed::PuzzleKind;
/// This doc string acts as a help message when the user runs '--help' in CLI
/// mode, as do all doc strings on fields
use clap::Parser;
use log::trace;

/// The struct for Clap CLI arguments
#[derive(Parser)]
#[command(about, long_about = None)]
pub struct Opts {
    /// The cryptogram text to work on
    #[arg(short, long)]
    text: Option<String>,

    /// A level of verbosity, and can be used multiple times
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Opens a file for solving
    /// Use instead of `--text`
    #[arg(short, long)]
    file: Option<String>,

    /// A single-letter hint of the form "X = A", merged into the derived
    /// mapping and never overwritten by it
    #[arg(short, long)]
    clue: Option<String>,

    /// Fetch today's solution for a puzzle category (cryptoquip or
    /// cryptoquote) instead of solving
    #[arg(short, long)]
    daily: Option<String>,

    /// Analyze the ciphertext (letter frequencies, repeated sequences)
    /// instead of submitting it to the solver
    #[arg(short, long)]
    analyze: bool,

    /// Base URL of the solving oracle
    #[arg(long)]
    oracle_url: Option<String>,

    /// Run in API mode, this will return the results instead of printing them
    #[arg(long)]
    api_mode: Option<bool>,
}

/// What the binary was asked to do.
pub enum CliRequest {
    /// Submit the text to the remote solver and poll for results.
    Solve {
        /// The ciphertext.
        text: String,
        /// Optional single-letter hint.
        clue: Option<String>,
    },
    /// Fetch and display a daily solution.
    Daily {
        /// Which feed to query.
        kind: PuzzleKind,
    },
    /// Run local analysis only.
    Analyze {
        /// The ciphertext.
        text: String,
        /// Optional single-letter hint.
        clue: Option<String>,
    },
}

/// Parse CLI Arguments into a request for the library plus a config struct.
///
/// # Panics
/// This function can panic when it gets both a file and text input at the
/// same time, or when a given puzzle category does not exist.
pub fn parse_cli_args() -> (CliRequest, Config) {
    let opts: Opts = Opts::parse();
    let min_log_level = match opts.verbose {
        0 => "Warn",
        1 => "Info",
        2 => "Debug",
        _ => "Trace",
    };
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, min_log_level),
    );

    // If both the file and text are provided, bail because we're not sure
    // which one to use
    if opts.file.is_some() && opts.text.is_some() {
        panic!("Both a file and text were provided. Please choose one input");
    }

    trace!("Parsed the arguments");

    let mut config = Config {
        verbose: opts.verbose,
        ..Config::default()
    };
    if let Some(url) = &opts.oracle_url {
        config.oracle_url = url.clone();
    }
    if let Some(api_mode) = opts.api_mode {
        config.api_mode = api_mode;
    }

    if let Some(kind_name) = &opts.daily {
        let kind = PuzzleKind::from_name(kind_name)
            .unwrap_or_else(|| panic!("Unknown puzzle category {:?}. Use cryptoquip or cryptoquote", kind_name));
        return (CliRequest::Daily { kind }, config);
    }

    let input_text: String = if let Some(path) = opts.file {
        read_and_parse_file(path)
    } else {
        opts.text.unwrap_or_default()
    };

    let request = if opts.analyze {
        CliRequest::Analyze {
            text: input_text,
            clue: opts.clue,
        }
    } else {
        CliRequest::Solve {
            text: input_text,
            clue: opts.clue,
        }
    };
    (request, config)
}

/// When the CLI is called with `-f` to open a file
/// this function opens it
/// # Panics
/// This can panic when opening a file which does not exist!
pub fn read_and_parse_file(file_path: String) -> String {
    let mut file = File::open(file_path).unwrap();
    let mut contents = String::new();
    file.read_to_string(&mut contents).unwrap();
    // On Unix systems a line is defined as "\n{text}\n"
    // Which means a file created in an editor usually carries a trailing
    // newline the user did not mean to solve, so we remove it
    if contents.ends_with(['\n', '\r']) {
        contents.strip_suffix(['\n', '\r']).unwrap().to_owned()
    } else {
        contents
    }
}

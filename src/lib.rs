//! quipsolve is a cryptogram solving toolkit: substitution-key modelling,
//! key derivation, text analysis and a polling client for a remote solving
//! oracle.

/// Frequency analysis and repeated n-gram detection used for solving hints
pub mod analysis;
/// The CLI input parser turns arguments into a library request
pub mod cli;
/// The CLI Pretty Printing module contains the functions that print results
pub mod cli_pretty_printing;
/// Applies a substitution key to render ciphertext as (partial) plaintext
pub mod codec;
/// The Config module enables a configuration module
/// Like a global API to access config details
pub mod config;
/// Derives substitution keys from aligned texts and clues
pub mod derivation;
/// Unified error types
pub mod error;
/// Client for the daily-solution feed endpoints
pub mod feed;
/// The substitution key model: partial letter mapping with conflict-aware
/// merging and the canonical key-string format
pub mod key;
/// Client for the remote solving oracle
pub mod oracle;
/// The solve session state machine: submit, poll, cancel
pub mod session;
/// Host side of the background computation unit
pub mod worker;

use crate::config::{get_config, set_global_config, Config};
use crate::error::QuipsolveError;
use crate::oracle::HttpOracle;
use crate::session::{RankedSolution, SolveParams, SolveSession, ThreadSleeper};
use log::debug;
use std::time::Duration;

/// The main function to call which performs a full solving run: submits the
/// ciphertext to the oracle and polls until it reports solutions, the
/// attempt budget runs out, or an error surfaces.
/// ```no_run
/// use quipsolve::perform_solving;
/// use quipsolve::config::Config;
/// let config = Config::default();
/// let solutions = perform_solving("JGV YXK", config)?;
/// println!("{}", solutions[0].plaintext);
/// # Ok::<(), quipsolve::error::QuipsolveError>(())
/// ```
pub fn perform_solving(
    text: &str,
    config: Config,
) -> Result<Vec<RankedSolution>, QuipsolveError> {
    set_global_config(config);
    let config = get_config();
    debug!("Solving with oracle at {}", config.oracle_url);

    let oracle = HttpOracle::new(&config.oracle_url, Duration::from_secs(config.http_timeout))?;
    let mut session = SolveSession::new(oracle);
    session.submit(text, SolveParams::default())?;
    session.run(&ThreadSleeper)?;
    Ok(session.results().to_vec())
}

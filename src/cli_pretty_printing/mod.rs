//! CLI Pretty Printing Module
//!
//! All user-facing output goes through here, so the visual appearance stays
//! consistent and API mode can suppress printing in one place. Library code
//! never prints; it returns data and errors, and the binary decides what to
//! show.

use crate::analysis::FrequencyProfile;
use crate::codec;
use crate::config::get_config;
use crate::feed::DailySolution;
use crate::key::{MappingConflict, SubstitutionKey};
use crate::session::RankedSolution;
use ansi_term::Colour;

/// Formats a success message.
pub fn success(text: &str) -> String {
    Colour::Green.bold().paint(text).to_string()
}

/// Formats a warning message.
pub fn warning(text: &str) -> String {
    Colour::Red.bold().paint(text).to_string()
}

/// Formats a neutral statement.
pub fn statement(text: &str) -> String {
    Colour::White.paint(text).to_string()
}

/// Formats a dimmed question/hint line.
pub fn hint(text: &str) -> String {
    Colour::Yellow.paint(text).to_string()
}

/// Prints the letter-mapping table of a key, one `X -> A` row per mapped
/// letter, sorted by cipher letter.
pub fn display_mapping(key: &SubstitutionKey) {
    if get_config().api_mode {
        return;
    }
    if key.is_empty() {
        println!("{}", statement("No letters mapped yet."));
        return;
    }
    for (cipher, plain) in key.to_display_pairs() {
        println!("  {} -> {}", cipher, plain);
    }
}

/// Prints merge conflicts as warnings. Conflicts are expected noise, so
/// they never fail the run.
pub fn display_conflicts(conflicts: &[MappingConflict]) {
    if get_config().api_mode {
        return;
    }
    for conflict in conflicts {
        println!(
            "{}",
            warning(&format!(
                "Conflicting mapping for {}: {} vs {}",
                conflict.cipher_symbol, conflict.previous, conflict.incoming
            ))
        );
    }
}

/// Prints the ranked solutions of a completed solve, best first, with the
/// derived letter mapping of the top candidate. A clue entry outranks the
/// derived ones.
pub fn display_solve_results(ciphertext: &str, results: &[RankedSolution], clue: Option<&str>) {
    if get_config().api_mode {
        return;
    }
    let Some(best) = results.first() else {
        println!("{}", warning("No solution found."));
        return;
    };

    println!("{}", success("Complete solution:"));
    println!("{}", best.plaintext);

    let (mapping, conflicts) = crate::derivation::derive(ciphertext, &best.plaintext, clue);
    display_conflicts(&conflicts);
    println!();
    println!("{}", statement("Letter mapping:"));
    display_mapping(&mapping);

    if results.len() > 1 {
        println!();
        println!("{}", statement("Other candidates:"));
        for candidate in &results[1..] {
            match candidate.score {
                Some(score) => println!("  [{}] {}", score, candidate.plaintext),
                None => println!("  {}", candidate.plaintext),
            }
        }
    }
}

/// Prints a daily solution record with its letter mapping.
pub fn display_daily_solution(daily: &DailySolution, mapping: &SubstitutionKey) {
    if get_config().api_mode {
        return;
    }
    if let Some(date) = &daily.date {
        println!("{}", statement(&format!("Date: {}", date)));
    }
    println!("{}", statement("Today's puzzle:"));
    println!("{}", daily.puzzle);
    if let Some(hint_text) = &daily.hint {
        println!("{}", hint(&format!("Hint: {}", hint_text)));
    }
    println!();
    println!("{}", success("Solution:"));
    println!("{}", daily.solution);
    if let Some(author) = &daily.author {
        println!("{}", statement(&format!("Quote by: {}", author)));
    }
    println!();
    println!("{}", statement("Letter mapping:"));
    display_mapping(mapping);
}

/// Prints the frequency/n-gram analysis of a ciphertext, along with the
/// partial decoding under `key` when any letters are mapped.
pub fn display_analysis(ciphertext: &str, key: &SubstitutionKey) {
    if get_config().api_mode {
        return;
    }
    let profile = FrequencyProfile::of(ciphertext);

    println!(
        "{}",
        statement(&format!("Letters: {}", profile.total_letters()))
    );
    println!("{}", statement("Letter frequencies:"));
    for (letter, count) in crate::analysis::frequency_of(ciphertext) {
        println!("  {}: {}", letter, count);
    }

    if !profile.repeated_ngrams.is_empty() {
        println!("{}", statement("Repeated sequences:"));
        for (gram, count) in &profile.repeated_ngrams {
            println!("  {} ({}x)", gram, count);
        }
    }

    if !key.is_empty() {
        println!();
        println!("{}", statement("Partial decoding:"));
        println!("{}", codec::decode(ciphertext, key));
    }
}

/// Prints the failure message for an unsolved run.
pub fn failed_to_solve(message: &str) {
    if get_config().api_mode {
        return;
    }
    println!("{}", warning(message));
}

/// Told the user nothing was passed in.
pub fn input_is_empty() {
    if get_config().api_mode {
        return;
    }
    println!(
        "{}",
        warning("No input was provided. Please use quipsolve --help")
    );
}

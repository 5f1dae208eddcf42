//! Host side of the background computation unit.
//!
//! The heavy cryptanalysis runs in an isolated unit that communicates
//! exclusively through asynchronous message passing; this module owns the
//! handle to it. The unit contract: it is restartable (a fresh instance is
//! always safe to create after termination) and NOT resumable after
//! cancellation, so cancelling always tears the instance down and a new
//! one is created for the next run.
//!
//! Every instance gets a generation number and every update it emits is
//! tagged with it. [`WorkerHost::drain_updates`] drops messages from
//! superseded instances, which is what guarantees a stale unit can never
//! touch the state of a newer run.

use crate::session::SolveParams;
use crossbeam::channel::{unbounded, Receiver, Sender};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::thread;

/// Handshake message sent to a freshly created unit.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Handshake {
    /// Always true; the unit replies with its first update when it has
    /// loaded its dictionaries.
    pub ready: bool,
}

/// A solve request in the unit's wire shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComputeRequest {
    /// The ciphertext to work on.
    pub input_text: String,
    /// Puzzle language code.
    pub lang: String,
    /// Iteration budget for the search.
    pub iterations: u32,
    /// Cap on the number of reported candidates.
    pub max_results: u32,
    /// Dictionary-weight scalar for the scoring.
    pub dictionary_weight: f64,
    /// Spacing handling mode; this system always sends 0.
    pub spacing_mode: u8,
    /// How often the unit reports incremental progress, in iterations.
    pub report_interval: u32,
    /// Whether the unit may bail out early once the score plateaus.
    pub fast_convergence: bool,
    /// Solving mode; this system always sends "general".
    pub mode: String,
}

impl ComputeRequest {
    /// Builds the wire request for `input_text` from session parameters.
    pub fn new(input_text: &str, params: &SolveParams) -> Self {
        ComputeRequest {
            input_text: input_text.to_string(),
            lang: params.language.clone(),
            iterations: params.iterations,
            max_results: params.max_results,
            dictionary_weight: params.dictionary_weight,
            spacing_mode: 0,
            report_interval: 1000,
            fast_convergence: true,
            mode: "general".to_string(),
        }
    }
}

/// One scored candidate reported by the unit. The score follows the
/// unit's own ordering convention and is carried verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredCandidate {
    /// Provider-defined score.
    pub score: f64,
    /// Key string in the unit's format.
    pub key: String,
    /// Candidate plaintext.
    pub text: String,
}

/// An incremental update from the unit. Any subset of the fields may be
/// present; the last update of a run carries `isFinal: true`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ComputeUpdate {
    /// Progress percentage, 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Current candidate list; replaces the previously reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ScoredCandidate>>,
    /// True exactly once, on the last update of a run.
    #[serde(rename = "isFinal", default)]
    pub is_final: bool,
}

/// The computation itself, behind a seam so hosts can run a real engine
/// or a scripted one in tests. `emit` may be called any number of times;
/// the last call should carry `is_final: true`.
pub trait ComputeEngine: Send + 'static {
    /// Runs one solve to completion, emitting incremental updates.
    fn run(&mut self, request: ComputeRequest, emit: &mut dyn FnMut(ComputeUpdate));
}

/// Owns at most one live unit instance at a time.
///
/// The host never mutates an instance in place: starting a run while one
/// is live terminates the old instance first (its thread may still be
/// winding down, but its generation is retired so nothing it sends is
/// ever delivered).
pub struct WorkerHost {
    sender: Sender<(u64, ComputeUpdate)>,
    receiver: Receiver<(u64, ComputeUpdate)>,
    /// Generation of the live instance. Zero means no instance was ever
    /// started.
    current_generation: u64,
    live: bool,
}

impl Default for WorkerHost {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerHost {
    /// Creates a host with no live instance.
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        WorkerHost {
            sender,
            receiver,
            current_generation: 0,
            live: false,
        }
    }

    /// Generation of the live instance, if any.
    pub fn generation(&self) -> u64 {
        self.current_generation
    }

    /// Whether an instance is considered live. A final update flips this
    /// back off during [`WorkerHost::drain_updates`].
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Starts a fresh instance running `engine` on `request`, terminating
    /// any previous instance first. Returns the new instance generation.
    pub fn start<E: ComputeEngine>(&mut self, mut engine: E, request: ComputeRequest) -> u64 {
        if self.live {
            debug!("Starting a new unit instance over a live one; terminating the old instance");
            self.terminate();
        }
        self.current_generation += 1;
        self.live = true;
        let generation = self.current_generation;
        let sender = self.sender.clone();
        trace!("Spawning unit instance generation {}", generation);

        thread::spawn(move || {
            let mut emit = |update: ComputeUpdate| {
                // The host may have moved on; sending is best-effort and
                // the drain discards anything stale.
                let _ = sender.send((generation, update));
            };
            engine.run(request, &mut emit);
        });
        generation
    }

    /// Terminates the live instance. Its thread is left to finish on its
    /// own; everything it sends from now on is discarded because its
    /// generation is retired.
    pub fn terminate(&mut self) {
        if !self.live {
            return;
        }
        debug!(
            "Terminating unit instance generation {}",
            self.current_generation
        );
        self.live = false;
    }

    /// Drains all pending updates from the live instance, discarding any
    /// from superseded instances. A final update marks the instance as no
    /// longer live.
    pub fn drain_updates(&mut self) -> Vec<ComputeUpdate> {
        let mut updates = Vec::new();
        while let Ok((generation, update)) = self.receiver.try_recv() {
            if generation != self.current_generation || !self.live {
                trace!(
                    "Discarding update from superseded instance generation {}",
                    generation
                );
                continue;
            }
            if update.is_final {
                self.live = false;
            }
            updates.push(update);
        }
        updates
    }
}

//! The solve session state machine.
//!
//! A session drives one cancellable, progress-reporting solving run against
//! the oracle: submit a job, poll for results on a fixed interval with a
//! bounded attempt budget, surface the ranked result list. Transition rules
//! are side-effect-free with respect to timing; the actual suspension
//! between polls is delegated to a [`Sleeper`] adapter so the logic stays
//! testable without clocks.
//!
//! Only one job is active per session. Submitting while a job is in flight
//! implicitly cancels it first, and every job carries a generation number so
//! a message from a superseded job can never update the state of a newer
//! one.

use crate::config::get_config;
use crate::error::QuipsolveError;
use crate::oracle::{Solution, SolveOracle};
use crate::worker::ComputeUpdate;
use log::{debug, info, trace};
use std::time::Duration;

/// Validation message for an empty submission.
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a cipher text.";

/// Where the session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No job submitted, or the previous one was fully dealt with.
    Idle,
    /// Job request sent, waiting for the creation response.
    Submitting,
    /// Job accepted, status requests in flight.
    Polling,
    /// Terminal status received with at least one solution.
    Completed,
    /// User cancelled mid-poll.
    Cancelled,
    /// Validation passed but the run failed (transport, oracle error, or
    /// exhausted polling budget).
    Failed,
}

/// Status of one [`SolveJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Created, not yet acknowledged by the oracle.
    Pending,
    /// Acknowledged, being polled.
    Polling,
    /// Finished with solutions.
    Completed,
    /// Discarded by the user.
    Cancelled,
    /// Ended in an error.
    Failed,
}

/// Parameters sent along with a solve request. Language is fixed to
/// English in this system.
#[derive(Debug, Clone)]
pub struct SolveParams {
    /// Iteration budget for the search.
    pub iterations: u32,
    /// Cap on the number of returned candidates.
    pub max_results: u32,
    /// Dictionary-weight scalar for the scoring.
    pub dictionary_weight: f64,
    /// Puzzle language.
    pub language: String,
}

impl Default for SolveParams {
    fn default() -> Self {
        SolveParams {
            iterations: 20_000,
            max_results: 3,
            dictionary_weight: 1.0,
            language: "en".to_string(),
        }
    }
}

/// One entry of the ranked result list.
///
/// The score is an opaque ordering key: whether higher or lower is better
/// is the provider's convention, so this crate carries it verbatim and
/// keeps the provider's list order.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSolution {
    /// Provider-defined score; the HTTP oracle omits it.
    pub score: Option<f64>,
    /// The plaintext candidate.
    pub plaintext: String,
    /// The raw key string in provider format.
    pub key: String,
}

impl From<Solution> for RankedSolution {
    fn from(solution: Solution) -> Self {
        RankedSolution {
            score: None,
            plaintext: solution.plaintext,
            key: solution.key,
        }
    }
}

/// One solving run against the oracle.
#[derive(Debug, Clone)]
pub struct SolveJob {
    /// Opaque token issued by the oracle.
    pub id: String,
    /// The submitted ciphertext.
    pub ciphertext: String,
    /// Parameters this job was submitted with.
    pub params: SolveParams,
    /// Current status.
    pub status: JobStatus,
    /// Ranked result list; each poll response replaces it wholesale.
    pub results: Vec<RankedSolution>,
}

/// Adapter for the suspension between polling attempts.
pub trait Sleeper {
    /// Blocks the caller for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by `std::thread::sleep`.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A solving session owning at most one active job and the oracle handle
/// used to drive it.
pub struct SolveSession<O: SolveOracle> {
    oracle: O,
    state: SessionState,
    job: Option<SolveJob>,
    /// Single current-error slot; replaced by the next attempt.
    error: Option<String>,
    /// Last displayed progress percentage. Out-of-order values are shown
    /// as received.
    progress: Option<f64>,
    /// Bumped on every submit and cancel. Messages tagged with an older
    /// generation are discarded.
    generation: u64,
}

impl<O: SolveOracle> SolveSession<O> {
    /// Creates an idle session around an oracle handle.
    pub fn new(oracle: O) -> Self {
        SolveSession {
            oracle,
            state: SessionState::Idle,
            job: None,
            error: None,
            progress: None,
            generation: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The active (or last) job, if any.
    pub fn job(&self) -> Option<&SolveJob> {
        self.job.as_ref()
    }

    /// The current ranked result list.
    pub fn results(&self) -> &[RankedSolution] {
        self.job.as_ref().map(|j| j.results.as_slice()).unwrap_or(&[])
    }

    /// The message in the current-error slot, if any.
    pub fn current_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Last reported progress percentage.
    pub fn progress(&self) -> Option<f64> {
        self.progress
    }

    /// The live job generation. Updates must be tagged with this value to
    /// be accepted by [`SolveSession::apply_update`].
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Submits a new job.
    ///
    /// An empty or whitespace-only ciphertext is rejected before any
    /// network call and without a state transition. If a job is already
    /// Submitting or Polling it is implicitly cancelled first.
    pub fn submit(&mut self, ciphertext: &str, params: SolveParams) -> Result<(), QuipsolveError> {
        if matches!(self.state, SessionState::Submitting | SessionState::Polling) {
            debug!("Submit while a job is in flight, discarding the previous job");
            self.discard_active_job();
        }
        // Terminal states return to Idle on the next submission.
        if self.state != SessionState::Idle {
            self.state = SessionState::Idle;
        }

        if ciphertext.trim().is_empty() {
            let err = QuipsolveError::Validation(EMPTY_INPUT_MESSAGE.to_string());
            self.error = Some(err.to_string());
            return Err(err);
        }

        self.state = SessionState::Submitting;
        self.error = None;
        self.progress = None;
        self.generation += 1;
        info!("Submitting cipher to the oracle");

        match self.oracle.submit(ciphertext) {
            Ok(id) => {
                trace!("Oracle accepted job {}", id);
                self.job = Some(SolveJob {
                    id,
                    ciphertext: ciphertext.to_string(),
                    params,
                    status: JobStatus::Pending,
                    results: Vec::new(),
                });
                self.state = SessionState::Polling;
                Ok(())
            }
            Err(e) => {
                self.job = None;
                self.state = SessionState::Failed;
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Performs one status request. Returns `Ok(true)` once the job is
    /// terminal. Outside the Polling state this is a no-op reporting
    /// completion, so a cancelled loop winds down without extra requests.
    pub fn poll_once(&mut self) -> Result<bool, QuipsolveError> {
        if self.state != SessionState::Polling {
            return Ok(true);
        }
        let Some(job) = self.job.as_mut() else {
            return Ok(true);
        };
        job.status = JobStatus::Polling;

        match self.oracle.status(&job.id) {
            Ok(response) => {
                let done = response.is_done();
                if let Some(progress) = response.progress {
                    self.progress = Some(progress);
                }
                // The response list replaces the displayed one, it never
                // appends to it.
                job.results = response
                    .solutions
                    .into_iter()
                    .map(RankedSolution::from)
                    .collect();

                if !done {
                    return Ok(false);
                }
                if job.results.is_empty() {
                    job.status = JobStatus::Failed;
                    self.state = SessionState::Failed;
                    self.error = Some(QuipsolveError::NoSolution.to_string());
                    return Err(QuipsolveError::NoSolution);
                }
                info!("Oracle reported completion with {} solutions", job.results.len());
                job.status = JobStatus::Completed;
                self.state = SessionState::Completed;
                Ok(true)
            }
            Err(e) => {
                job.status = JobStatus::Failed;
                self.state = SessionState::Failed;
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Runs the polling loop to a terminal state: at most
    /// `max_poll_attempts` status requests, `poll_interval_ms` apart.
    /// Exhausting the budget without a terminal status fails the session
    /// closed; retrying is a new explicit submit.
    pub fn run(&mut self, sleeper: &dyn Sleeper) -> Result<(), QuipsolveError> {
        let config = get_config();
        for attempt in 0..config.max_poll_attempts {
            if self.state != SessionState::Polling {
                return Ok(());
            }
            trace!(
                "Checking status (attempt {}/{})",
                attempt + 1,
                config.max_poll_attempts
            );
            if self.poll_once()? {
                return Ok(());
            }
            if attempt + 1 < config.max_poll_attempts {
                sleeper.sleep(Duration::from_millis(config.poll_interval_ms));
            }
        }

        if let Some(job) = self.job.as_mut() {
            job.status = JobStatus::Failed;
        }
        self.state = SessionState::Failed;
        self.error = Some(QuipsolveError::NoSolution.to_string());
        Err(QuipsolveError::NoSolution)
    }

    /// Cancels the active job. Valid only while Polling; anywhere else
    /// this is a logged no-op. Cancellation discards in-flight work and
    /// resets progress and results; the job is not resumable.
    pub fn cancel(&mut self) {
        if self.state != SessionState::Polling {
            debug!("cancel() ignored in state {:?}", self.state);
            return;
        }
        info!("Cancelling the active job");
        self.state = SessionState::Cancelled;
        self.generation += 1;
        self.progress = None;
        if let Some(job) = self.job.as_mut() {
            job.status = JobStatus::Cancelled;
            job.results.clear();
        }
    }

    /// Applies an incremental update from a background computation unit.
    ///
    /// `generation` is the value of [`SolveSession::generation`] at the
    /// time the producing instance was started. Updates from a superseded
    /// generation are discarded without touching any state. Progress and
    /// results are last-write-wins.
    pub fn apply_update(&mut self, generation: u64, update: &ComputeUpdate) {
        if generation != self.generation {
            debug!(
                "Dropping update from superseded generation {} (current {})",
                generation, self.generation
            );
            return;
        }
        if self.state != SessionState::Polling {
            debug!("Dropping update received in state {:?}", self.state);
            return;
        }

        if let Some(progress) = update.progress {
            self.progress = Some(progress);
        }
        if let Some(job) = self.job.as_mut() {
            if let Some(items) = &update.items {
                job.results = items
                    .iter()
                    .map(|item| RankedSolution {
                        score: Some(item.score),
                        plaintext: item.text.clone(),
                        key: item.key.clone(),
                    })
                    .collect();
            }
            if update.is_final {
                if job.results.is_empty() {
                    job.status = JobStatus::Failed;
                    self.state = SessionState::Failed;
                    self.error = Some(QuipsolveError::NoSolution.to_string());
                } else {
                    job.status = JobStatus::Completed;
                    self.state = SessionState::Completed;
                }
            }
        }
    }

    /// Drops the in-flight job when a new submission supersedes it.
    fn discard_active_job(&mut self) {
        self.generation += 1;
        self.progress = None;
        if let Some(job) = self.job.as_mut() {
            job.status = JobStatus::Cancelled;
            job.results.clear();
        }
        self.state = SessionState::Idle;
    }
}

/// No-op sleeper for tests.
#[cfg(test)]
pub struct NoopSleeper;

#[cfg(test)]
impl Sleeper for NoopSleeper {
    fn sleep(&self, _duration: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::StatusResponse;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Oracle stub replaying a scripted sequence of status responses.
    struct ScriptedOracle {
        submit_result: Result<String, String>,
        statuses: RefCell<VecDeque<StatusResponse>>,
        submit_calls: RefCell<u32>,
        status_calls: RefCell<u32>,
    }

    impl ScriptedOracle {
        fn accepting(statuses: Vec<StatusResponse>) -> Self {
            ScriptedOracle {
                submit_result: Ok("job-1".to_string()),
                statuses: RefCell::new(statuses.into()),
                submit_calls: RefCell::new(0),
                status_calls: RefCell::new(0),
            }
        }

        fn rejecting(message: &str) -> Self {
            ScriptedOracle {
                submit_result: Err(message.to_string()),
                statuses: RefCell::new(VecDeque::new()),
                submit_calls: RefCell::new(0),
                status_calls: RefCell::new(0),
            }
        }
    }

    impl SolveOracle for ScriptedOracle {
        fn submit(&self, _ciphertext: &str) -> Result<String, QuipsolveError> {
            *self.submit_calls.borrow_mut() += 1;
            self.submit_result
                .clone()
                .map_err(QuipsolveError::Oracle)
        }

        fn status(&self, _id: &str) -> Result<StatusResponse, QuipsolveError> {
            *self.status_calls.borrow_mut() += 1;
            self.statuses
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| QuipsolveError::Http("script exhausted".to_string()))
        }
    }

    fn working() -> StatusResponse {
        serde_json::from_str(r#"{"result": 1}"#).unwrap()
    }

    fn done_with_one() -> StatusResponse {
        serde_json::from_str(
            r#"{"result": 0, "solutions": [{"plaintext": "THE CAT", "key": "JGV -> THE"}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn empty_submit_is_rejected_without_oracle_call() {
        let oracle = ScriptedOracle::accepting(vec![]);
        let mut session = SolveSession::new(oracle);
        let result = session.submit("   ", SolveParams::default());
        assert!(result.is_err());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.current_error(), Some(EMPTY_INPUT_MESSAGE));
        assert_eq!(*session.oracle.submit_calls.borrow(), 0);
    }

    #[test]
    fn successful_submit_moves_to_polling() {
        let oracle = ScriptedOracle::accepting(vec![]);
        let mut session = SolveSession::new(oracle);
        session.submit("JGV YXK", SolveParams::default()).unwrap();
        assert_eq!(session.state(), SessionState::Polling);
        assert_eq!(session.job().unwrap().id, "job-1");
    }

    #[test]
    fn oracle_rejection_moves_to_failed_with_verbatim_message() {
        let oracle = ScriptedOracle::rejecting("ciphertext too long");
        let mut session = SolveSession::new(oracle);
        let result = session.submit("JGV", SolveParams::default());
        assert!(result.is_err());
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(session.current_error(), Some("ciphertext too long"));
    }

    #[test]
    fn failed_session_recovers_on_next_submit() {
        let oracle = ScriptedOracle::rejecting("boom");
        let mut session = SolveSession::new(oracle);
        session.submit("JGV", SolveParams::default()).unwrap_err();
        // The next submission replaces the error slot with its own outcome.
        session.submit("JGV", SolveParams::default()).unwrap_err();
        assert_eq!(session.current_error(), Some("boom"));
    }

    #[test]
    fn polling_completes_when_oracle_reports_done() {
        let oracle = ScriptedOracle::accepting(vec![working(), working(), done_with_one()]);
        let mut session = SolveSession::new(oracle);
        session.submit("JGV YXK", SolveParams::default()).unwrap();
        session.run(&NoopSleeper).unwrap();
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.results().len(), 1);
        assert_eq!(session.results()[0].plaintext, "THE CAT");
        assert_eq!(session.results()[0].score, None);
    }

    #[test]
    fn result_list_is_replaced_not_appended() {
        let with_two: StatusResponse = serde_json::from_str(
            r#"{"result": 1, "solutions": [
                {"plaintext": "A", "key": "A -> A"},
                {"plaintext": "B", "key": "B -> B"}
            ]}"#,
        )
        .unwrap();
        let oracle = ScriptedOracle::accepting(vec![with_two, done_with_one()]);
        let mut session = SolveSession::new(oracle);
        session.submit("JGV", SolveParams::default()).unwrap();
        session.poll_once().unwrap();
        assert_eq!(session.results().len(), 2);
        session.poll_once().unwrap();
        assert_eq!(session.results().len(), 1);
    }

    #[test]
    fn exhausted_budget_fails_with_no_solution_found() {
        let oracle = ScriptedOracle::accepting((0..25).map(|_| working()).collect());
        let mut session = SolveSession::new(oracle);
        session.submit("JGV", SolveParams::default()).unwrap();
        let err = session.run(&NoopSleeper).unwrap_err();
        assert!(matches!(err, QuipsolveError::NoSolution));
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(session.current_error(), Some("No solution found."));
        // Budget respected: exactly 20 status requests.
        assert_eq!(*session.oracle.status_calls.borrow(), 20);
    }

    #[test]
    fn terminal_status_without_solutions_is_no_solution() {
        let empty_done: StatusResponse = serde_json::from_str(r#"{"result": 0}"#).unwrap();
        let oracle = ScriptedOracle::accepting(vec![empty_done]);
        let mut session = SolveSession::new(oracle);
        session.submit("JGV", SolveParams::default()).unwrap();
        let err = session.run(&NoopSleeper).unwrap_err();
        assert!(matches!(err, QuipsolveError::NoSolution));
    }

    #[test]
    fn cancel_only_valid_from_polling() {
        let oracle = ScriptedOracle::accepting(vec![]);
        let mut session = SolveSession::new(oracle);
        session.cancel();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn cancel_mid_polling_resets_state_and_blocks_stale_updates() {
        let oracle = ScriptedOracle::accepting(vec![working()]);
        let mut session = SolveSession::new(oracle);
        session.submit("JGV", SolveParams::default()).unwrap();
        let stale_generation = session.generation();
        session.poll_once().unwrap();

        session.cancel();
        assert_eq!(session.state(), SessionState::Cancelled);
        assert!(session.results().is_empty());
        assert_eq!(session.progress(), None);

        // A late update from the superseded instance must not mutate
        // anything.
        let update: ComputeUpdate = serde_json::from_str(
            r#"{"progress": 90, "items": [{"score": 1.0, "key": "A -> B", "text": "LATE"}]}"#,
        )
        .unwrap();
        session.apply_update(stale_generation, &update);
        assert_eq!(session.state(), SessionState::Cancelled);
        assert!(session.results().is_empty());
        assert_eq!(session.progress(), None);
    }

    #[test]
    fn resubmit_performs_implicit_cancel() {
        let oracle = ScriptedOracle::accepting(vec![working(), done_with_one()]);
        let mut session = SolveSession::new(oracle);
        session.submit("JGV", SolveParams::default()).unwrap();
        let first_generation = session.generation();
        session.poll_once().unwrap();

        session.submit("YXK", SolveParams::default()).unwrap();
        assert!(session.generation() > first_generation);
        assert_eq!(session.state(), SessionState::Polling);
        assert_eq!(session.job().unwrap().ciphertext, "YXK");
    }

    #[test]
    fn progress_updates_are_displayed_as_received() {
        let p40: StatusResponse = serde_json::from_str(r#"{"result": 1, "progress": 40}"#).unwrap();
        let p30: StatusResponse = serde_json::from_str(r#"{"result": 1, "progress": 30}"#).unwrap();
        let oracle = ScriptedOracle::accepting(vec![p40, p30]);
        let mut session = SolveSession::new(oracle);
        session.submit("JGV", SolveParams::default()).unwrap();
        session.poll_once().unwrap();
        assert_eq!(session.progress(), Some(40.0));
        // Out-of-order progress is not clamped; last write wins.
        session.poll_once().unwrap();
        assert_eq!(session.progress(), Some(30.0));
    }
}

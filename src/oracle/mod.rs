//! Client for the remote solving oracle.
//!
//! The oracle is a black box: jobs are submitted with `POST /solve`, results
//! are polled with `POST /status`. The cryptanalysis technique behind it is
//! not this crate's concern; only the message contract is. The trait seam
//! exists so the session state machine can be driven by a scripted oracle
//! in tests.

use crate::error::QuipsolveError;
use log::{debug, trace};
use reqwest::header::CACHE_CONTROL;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request body for `POST /solve`.
#[derive(Debug, Serialize)]
pub struct SolveRequest {
    /// The raw ciphertext to crack.
    pub ciphertext: String,
}

/// Response body of a successful `POST /solve`.
#[derive(Debug, Deserialize)]
pub struct SolveResponse {
    /// Opaque job identifier issued by the oracle.
    #[serde(default)]
    pub id: Option<String>,
}

/// One candidate solution returned by the oracle.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Solution {
    /// The decoded text candidate.
    pub plaintext: String,
    /// The substitution key in the oracle's own string format.
    pub key: String,
}

/// Response body of `POST /status`.
///
/// `result == 0` signals terminal completion; any other value means the
/// oracle is still working. Fields default so variable response shapes
/// parse instead of failing the poll.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    /// Ranked candidate solutions, best first by the oracle's own
    /// convention.
    #[serde(default)]
    pub solutions: Vec<Solution>,
    /// Oracle status code. Zero is terminal.
    #[serde(default = "still_working")]
    pub result: i64,
    /// Optional progress percentage, 0-100.
    #[serde(default)]
    pub progress: Option<f64>,
}

/// Default `result` for responses that omit the field.
fn still_working() -> i64 {
    1
}

/// Error body the oracle sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct OracleErrorBody {
    #[serde(default)]
    error: Option<String>,
}

impl StatusResponse {
    /// Whether this response signals terminal completion.
    pub fn is_done(&self) -> bool {
        self.result == 0
    }
}

/// The seam between the session state machine and the wire.
pub trait SolveOracle {
    /// Submits a job and returns the oracle-issued job identifier.
    fn submit(&self, ciphertext: &str) -> Result<String, QuipsolveError>;
    /// Requests the current status of a job.
    fn status(&self, id: &str) -> Result<StatusResponse, QuipsolveError>;
}

/// `SolveOracle` implementation speaking HTTP/JSON to the remote service.
pub struct HttpOracle {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpOracle {
    /// Creates a client for the oracle at `base_url`.
    ///
    /// The client follows redirects explicitly and requests are sent with
    /// `Cache-Control: no-cache`; responses must never be served stale.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, QuipsolveError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| QuipsolveError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(HttpOracle {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POSTs `body` to `{base_url}{path}` and decodes the response.
    ///
    /// A non-2xx status is mapped to the oracle's own `error` message when
    /// the body carries one, else to `fallback` plus the status code.
    fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<R, QuipsolveError> {
        let url = format!("{}{}", self.base_url, path);
        trace!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .header(CACHE_CONTROL, "no-cache")
            .json(body)
            .send()
            .map_err(|e| QuipsolveError::Http(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<OracleErrorBody>()
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| format!("{}: {}", fallback, status.as_u16()));
            debug!("Oracle returned {} for {}: {}", status, url, message);
            return Err(QuipsolveError::Oracle(message));
        }

        response
            .json::<R>()
            .map_err(|e| QuipsolveError::Http(format!("Malformed response from {}: {}", url, e)))
    }
}

impl SolveOracle for HttpOracle {
    fn submit(&self, ciphertext: &str) -> Result<String, QuipsolveError> {
        let request = SolveRequest {
            ciphertext: ciphertext.trim().to_string(),
        };
        let response: SolveResponse =
            self.post("/solve", &request, "Failed to solve cipher")?;
        response
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| QuipsolveError::Oracle("No ID returned from API".to_string()))
    }

    fn status(&self, id: &str) -> Result<StatusResponse, QuipsolveError> {
        let request = serde_json::json!({ "id": id });
        self.post("/status", &request, "Failed to get solution status")
    }
}

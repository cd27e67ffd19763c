//! Request/response contract with the external safety and deadlock service.
//!
//! The service runs Banker's algorithm and RAG cycle detection; this module only
//! serializes the model, moves bytes through a `Transport`, and turns the answer into
//! a `Verdict`. Every failure comes back as an `Err`, so callers always see either a
//! verdict or an explicit error.

use crate::derive::GraphData;
use crate::dims::Dimensions;
use crate::error::{Error, Result};
use crate::matrix::{Matrix, MatrixStore};
use crate::status::{CheckStatus, DeadlockStatus, SafetyStatus};
use crate::Quantity;
use core::convert::TryFrom;
use log::debug;
use serde::{Deserialize, Serialize};

/// Request body for the check endpoint. This is a copy of the store taken when the check
/// starts; later edits do not affect a request already built.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    #[serde(rename = "P")]
    pub processes: usize,
    #[serde(rename = "R")]
    pub resources: usize,
    pub alloc: Vec<Vec<Quantity>>,
    pub maxd: Vec<Vec<Quantity>>,
    pub avail: Vec<Quantity>,
}

impl ModelSnapshot {
    /// `None` if the store has no dimensions yet.
    pub fn from_store(store: &MatrixStore) -> Option<Self> {
        let dims = store.dims()?;
        Some(Self {
            processes: dims.processes(),
            resources: dims.resources(),
            alloc: store.alloc().to_rows(),
            maxd: store.max().to_rows(),
            avail: store.avail().to_vec(),
        })
    }

    pub fn dims(&self) -> Option<Dimensions> {
        Dimensions::new(self.processes, self.resources)
    }
}

/// The `graph` part of a verdict: the service's own view of Allocation and Need.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct GraphPayload {
    #[serde(default)]
    pub alloc: Vec<Vec<Quantity>>,
    #[serde(default)]
    pub need: Vec<Vec<Quantity>>,
}

impl GraphPayload {
    /// Shapes the payload to `dims`. Ragged or short rows are tolerated; missing cells
    /// read as 0, extra cells are dropped.
    pub fn to_graph_data(&self, dims: Dimensions) -> GraphData {
        let (p, r) = (dims.processes(), dims.resources());
        GraphData {
            alloc: Matrix::from_rows_lenient(p, r, &self.alloc),
            need: Matrix::from_rows_lenient(p, r, &self.need),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Verdict {
    pub safe: bool,
    /// Process indices in execution order. Empty unless `safe`.
    pub safe_sequence: Vec<usize>,
    pub deadlock: bool,
    pub graph: Option<GraphPayload>,
}

impl Verdict {
    pub fn status(&self) -> CheckStatus {
        CheckStatus {
            safety: if self.safe {
                SafetyStatus::Safe(self.safe_sequence.clone())
            } else {
                SafetyStatus::Unsafe
            },
            deadlock: if self.deadlock {
                DeadlockStatus::Detected
            } else {
                DeadlockStatus::Clear
            },
        }
    }
}

// safeSequence entries arrive either as indices or as "P3"-style labels
#[derive(Deserialize)]
#[serde(untagged)]
enum RawProcessRef {
    Index(usize),
    Label(String),
}

#[derive(Deserialize)]
#[serde(try_from = "RawProcessRef")]
struct ProcessIndex(usize);

impl TryFrom<RawProcessRef> for ProcessIndex {
    type Error = String;
    fn try_from(raw: RawProcessRef) -> core::result::Result<Self, Self::Error> {
        match raw {
            RawProcessRef::Index(i) => Ok(ProcessIndex(i)),
            RawProcessRef::Label(label) => label
                .strip_prefix('P')
                .and_then(|digits| digits.parse::<usize>().ok())
                .map(ProcessIndex)
                .ok_or_else(|| format!("invalid process reference {:?}", label)),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    safe: Option<bool>,
    #[serde(default)]
    safe_sequence: Option<Vec<ProcessIndex>>,
    #[serde(default)]
    deadlock: Option<bool>,
    #[serde(default)]
    graph: Option<GraphPayload>,
}

fn malformed(msg: &str) -> Error {
    Error::Json(<serde_json::Error as serde::de::Error>::custom(msg))
}

/// Decodes a response body. A non-empty `error` field wins over everything else and
/// becomes `Error::Backend`; otherwise `safe` and `deadlock` must both be present.
pub fn decode_response(body: &str) -> Result<Verdict> {
    let raw: RawResponse = serde_json::from_str(body)?;
    if let Some(error) = raw.error.filter(|e| !e.is_empty()) {
        return Err(Error::Backend(error));
    }
    let safe = raw.safe.ok_or_else(|| malformed("missing field `safe`"))?;
    let deadlock = raw
        .deadlock
        .ok_or_else(|| malformed("missing field `deadlock`"))?;
    let safe_sequence = if safe {
        raw.safe_sequence
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.0)
            .collect()
    } else {
        Vec::new()
    };
    Ok(Verdict {
        safe,
        safe_sequence,
        deadlock,
        graph: raw.graph,
    })
}

/// Moves one JSON request body to the service and returns the response body.
///
/// Implementations return the body for any response the service produced, including
/// HTTP error statuses, because the service reports domain errors that way. Only a
/// failure to get a response at all is an `Err`.
pub trait Transport {
    fn post_json(&self, body: &str) -> Result<String>;
}

impl<F> Transport for F
where
    F: Fn(&str) -> Result<String>,
{
    fn post_json(&self, body: &str) -> Result<String> {
        self(body)
    }
}

/// Sends `snapshot` to the service and decodes the answer.
pub fn check_state(transport: &dyn Transport, snapshot: &ModelSnapshot) -> Result<Verdict> {
    let body = serde_json::to_string(snapshot)?;
    debug!(
        "check request: {}×{}, {} bytes",
        snapshot.processes,
        snapshot.resources,
        body.len()
    );
    let response = transport.post_json(&body)?;
    decode_response(&response)
}

#[cfg(not(target_arch = "wasm32"))]
pub use self::http::HttpTransport;

#[cfg(not(target_arch = "wasm32"))]
mod http {
    use super::*;
    use crate::config::GatewayConfig;
    use log::warn;

    /// Blocking HTTP transport. POSTs to the configured check URL.
    pub struct HttpTransport {
        agent: ureq::Agent,
        url: String,
    }

    impl HttpTransport {
        pub fn new(config: &GatewayConfig) -> Self {
            let mut builder = ureq::AgentBuilder::new();
            if let Some(timeout) = config.timeout {
                builder = builder.timeout(timeout);
            }
            Self {
                agent: builder.build(),
                url: config.url.clone(),
            }
        }

        pub fn url(&self) -> &str {
            &self.url
        }
    }

    impl Transport for HttpTransport {
        fn post_json(&self, body: &str) -> Result<String> {
            let resp = match self
                .agent
                .post(&self.url)
                .set("Content-Type", "application/json")
                .send_string(body)
            {
                Ok(resp) => resp,
                Err(ureq::Error::Status(code, resp)) => {
                    warn!("backend at {} answered HTTP {}", self.url, code);
                    resp
                }
                Err(e) => {
                    return Err(Error::Transport(format!("{}: {}", self.url, e)));
                }
            };
            resp.into_string()
                .map_err(|e| Error::Transport(format!("failed to read response body: {}", e)))
        }
    }
}

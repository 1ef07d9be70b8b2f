use thiserror::Error;

/// Failures surfaced by the publications and summarizer clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or a non-success status from the backend
    #[error("failed to fetch {what}: {reason}")]
    Fetch { what: String, reason: String },

    /// The request was valid but the resource does not exist
    #[error("publication '{0}' not found")]
    NotFound(String),

    /// The backend answered but the body did not match the expected shape
    #[error("failed to decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: reqwest::Error,
    },

    /// A summary request is already outstanding
    #[error("a summary is already being generated")]
    SummaryBusy,

    #[error("failed to generate summary: {0}")]
    Summarize(String),
}

impl ClientError {
    pub(crate) fn fetch(what: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Fetch {
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failures raised by the graph layout store.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("unknown graph node '{0}'")]
    UnknownNode(String),

    #[error("edge {source_id} -> {target_id} references a missing node")]
    DanglingEdge { source_id: String, target_id: String },

    #[error("layout loop has stopped")]
    Stopped,
}

use crate::common::defs::*;
use thiserror::Error;

/// Errors raised while building, sampling or persisting a model.
#[derive(Error, Debug)]
pub enum MdpError {
    #[error("availability refers to unknown states: {0:?}")]
    UnknownStates(Vec<Discrete>),

    #[error("missing states: {0:?}")]
    MissingStates(Vec<Discrete>),

    #[error("invalid (state, action) pairs: {0:?}")]
    InvalidActions(Vec<(Discrete, Discrete)>),

    #[error("transitions are missing (state, action) pairs: {0:?}")]
    MissingTransitions(Vec<(Discrete, Discrete)>),

    #[error("transitions keyed by out of range (state, action) pairs: {0:?}")]
    InvalidTransitionKeys(Vec<(Discrete, Discrete)>),

    #[error("transitions lead to out of range next states: {0:?}")]
    InvalidNextStates(Vec<(Discrete, Discrete, Discrete)>),

    #[error("policy has {found} entries, model has {expected} states")]
    InvalidPolicyLength { expected: usize, found: usize },

    #[error("policy picks unavailable actions: {0:?}")]
    InvalidPolicyActions(Vec<(Discrete, Discrete)>),

    #[error("expected {expected} rows of {expected} probabilities, got {found:?}")]
    MismatchedRowCount { expected: usize, found: Vec<usize> },

    #[error("state {0} has no available actions")]
    NoAvailableActions(Discrete),

    #[error("draw {x} not reached by cumulative probability {total} of ({state}, {action})")]
    SamplingExhausted {
        state: Discrete,
        action: Discrete,
        x: Continous,
        total: Continous,
    },

    #[error("expected serialization version {expected}, got {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MdpError {
    /// True for errors caused by malformed model or policy data.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            Self::SamplingExhausted { .. }
                | Self::VersionMismatch { .. }
                | Self::Json(_)
                | Self::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MdpError>;

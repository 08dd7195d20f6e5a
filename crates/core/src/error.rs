use thiserror::Error;
use uuid::Uuid;

/// Failures surfaced by the advisory operations.
///
/// None of these are fatal: callers render a corrective prompt and keep going.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdvisorError {
    #[error("invalid risk profile: {0:?} (expected Conservative, Moderate or Aggressive)")]
    InvalidProfile(String),

    #[error("invalid investment horizon: {0:?} (expected short, medium or long)")]
    InvalidHorizon(String),

    #[error("age {0} is outside the supported range 18..=90")]
    InvalidAge(u32),

    #[error("no risk profile selected; complete step 1 first")]
    NoProfileSelected,

    #[error("cluster {cluster_id} has a zero weight sum; cannot normalize")]
    ZeroWeightSum { cluster_id: i64 },

    #[error("investment amount must be a positive number (got {0})")]
    InvalidInvestment(f64),

    #[error("instrument dataset unavailable: {detail}")]
    DataUnavailable { detail: String },

    #[error("session {0} not found")]
    SessionNotFound(Uuid),
}

impl AdvisorError {
    pub fn data_unavailable(detail: impl Into<String>) -> Self {
        Self::DataUnavailable {
            detail: detail.into(),
        }
    }

    /// Stable machine-readable code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidProfile(_) => "invalid_profile",
            Self::InvalidHorizon(_) => "invalid_horizon",
            Self::InvalidAge(_) => "invalid_age",
            Self::NoProfileSelected => "no_profile_selected",
            Self::ZeroWeightSum { .. } => "zero_weight_sum",
            Self::InvalidInvestment(_) => "invalid_investment",
            Self::DataUnavailable { .. } => "data_unavailable",
            Self::SessionNotFound(_) => "session_not_found",
        }
    }
}

//! Structured failure values for the modify surface.
//!
//! Every mutation the gateway exposes resolves to either success or one of
//! these variants; none of them are fatal to the running engine. The reason
//! strings are what the display program shows the controller, so they are
//! part of the contract.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModifyError {
    /// The referenced flight plan does not exist at call time. Races with
    /// external deletion degrade to this variant.
    #[error("Flight plan not found.")]
    NotFound,

    /// A controller who is not tracking the aircraft attempted a mutation.
    #[error("Aircraft is being tracked by another controller.")]
    NotOwned,

    /// A facility-level guard rejected the transition.
    #[error("{0}")]
    GuardFailed(String),

    /// Malformed input rejected before reaching the engine.
    #[error("{0}")]
    InvalidInput(String),
}

impl ModifyError {
    pub fn guard_failed(reason: impl Into<String>) -> Self {
        ModifyError::GuardFailed(reason.into())
    }

    pub fn invalid_input(reason: impl Into<String>) -> Self {
        ModifyError::InvalidInput(reason.into())
    }
}

use crate::engine::presentation::state::{PresentationState, Trigger};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PresentationError {
    #[error("no transition from {from:?} on {trigger:?}")]
    InvalidTransition {
        from: PresentationState,
        trigger: Trigger,
    },
}

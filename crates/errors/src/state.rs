//! App state error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateError {
    #[error("state change on {app} from {from} to {to} is not allowed")]
    InvalidTransition {
        app: String,
        from: String,
        to: String,
    },
}

impl UserFacingError for StateError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::InvalidTransition { .. } => Some("state.invalid_transition"),
        }
    }
}

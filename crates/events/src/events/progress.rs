use serde::{Deserialize, Serialize};

/// Per-app progress events produced by aggregating operation progress
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgressEvent {
    /// An app's displayed percentage was updated
    Changed { reference: String, percent: u8 },

    /// The runner is estimating; no byte count is meaningful yet
    Unknown { reference: String },

    /// A lower percentage was computed and dropped to keep progress monotonic
    Discarded {
        reference: String,
        current: u8,
        computed: u8,
    },
}

impl ProgressEvent {
    #[must_use]
    pub fn reference(&self) -> &str {
        match self {
            Self::Changed { reference, .. }
            | Self::Unknown { reference }
            | Self::Discarded { reference, .. } => reference,
        }
    }
}

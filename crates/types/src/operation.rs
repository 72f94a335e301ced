//! Operation kinds reported by a transaction runner

use crate::AppState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use txflow_errors::TransactionError;

/// The kind of work a single operation performs.
///
/// Runners report kinds as strings; anything outside this set is rejected
/// when parsing rather than being treated as a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Install,
    InstallBundle,
    Update,
    Uninstall,
}

impl OperationKind {
    /// Stable lowercase name, also used in log messages ("failed to install ...").
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::InstallBundle => "install-bundle",
            Self::Update => "update",
            Self::Uninstall => "uninstall",
        }
    }

    /// Whether the operation puts software on disk.
    #[must_use]
    pub fn is_install_kind(self) -> bool {
        matches!(self, Self::Install | Self::InstallBundle | Self::Update)
    }

    /// The transient state an app sits in while this operation runs.
    #[must_use]
    pub fn active_state(self) -> AppState {
        match self {
            Self::Install | Self::InstallBundle | Self::Update => AppState::Installing,
            Self::Uninstall => AppState::Removing,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "install" => Ok(Self::Install),
            "install-bundle" => Ok(Self::InstallBundle),
            "update" => Ok(Self::Update),
            "uninstall" => Ok(Self::Uninstall),
            other => Err(TransactionError::UnknownOperationKind {
                kind: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_known_kinds() {
        for kind in [
            OperationKind::Install,
            OperationKind::InstallBundle,
            OperationKind::Update,
            OperationKind::Uninstall,
        ] {
            assert_eq!(kind.as_str().parse::<OperationKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = "rebase".parse::<OperationKind>().unwrap_err();
        assert!(matches!(err, TransactionError::UnknownOperationKind { kind } if kind == "rebase"));
    }

    #[test]
    fn active_states() {
        assert_eq!(OperationKind::Update.active_state(), AppState::Installing);
        assert_eq!(OperationKind::Uninstall.active_state(), AppState::Removing);
        assert!(!OperationKind::Uninstall.is_install_kind());
    }
}

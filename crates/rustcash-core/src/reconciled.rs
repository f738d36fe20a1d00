//! Split reconciliation state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The `<split:reconciled-state>` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReconciledState {
    /// `y`: reconciled against a statement.
    Reconciled,
    /// `n`: not reconciled.
    #[default]
    NotReconciled,
    /// `c`: cleared.
    Cleared,
    /// `f`: frozen.
    Frozen,
    /// `v`: voided.
    Voided,
}

/// Error returned for a reconcile flag outside `y n c f v`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid reconciled state {0:?}")]
pub struct ParseReconciledStateError(pub String);

impl ReconciledState {
    /// The single-letter flag as written in GnuCash files.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Reconciled => 'y',
            Self::NotReconciled => 'n',
            Self::Cleared => 'c',
            Self::Frozen => 'f',
            Self::Voided => 'v',
        }
    }
}

impl FromStr for ReconciledState {
    type Err = ParseReconciledStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "y" => Ok(Self::Reconciled),
            "n" => Ok(Self::NotReconciled),
            "c" => Ok(Self::Cleared),
            "f" => Ok(Self::Frozen),
            "v" => Ok(Self::Voided),
            _ => Err(ParseReconciledStateError(s.to_string())),
        }
    }
}

impl fmt::Display for ReconciledState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

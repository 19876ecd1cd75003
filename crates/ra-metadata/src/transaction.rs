//! Transaction support levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Level of transaction support declared by an outbound resource adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionSupport {
    NoTransaction,
    LocalTransaction,
    XATransaction,
}

impl TransactionSupport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoTransaction => "NoTransaction",
            Self::LocalTransaction => "LocalTransaction",
            Self::XATransaction => "XATransaction",
        }
    }
}

impl fmt::Display for TransactionSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionSupport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "NoTransaction" => Ok(Self::NoTransaction),
            "LocalTransaction" => Ok(Self::LocalTransaction),
            "XATransaction" => Ok(Self::XATransaction),
            other => Err(format!(
                "expected NoTransaction, LocalTransaction or XATransaction, found '{}'",
                other
            )),
        }
    }
}

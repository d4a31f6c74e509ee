//! Opaque operation handles exchanged with a chain client.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A signed, chain-encoded operation group ready for injection.
///
/// The contents are meaningful only to the chain client that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignedOperation(pub String);

impl SignedOperation {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Hash identifying an injected operation on chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationHash(pub String);

impl OperationHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//! Invocation error types.

use std::any::TypeId;

use thiserror::Error;

/// Boxed error raised by an interceptor body.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while configuring or traversing an interceptor chain.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// A required collaborator was missing or out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// State was read before it was ever set.
    #[error("{0} was not set")]
    NotInitialized(&'static str),

    /// `proceed()` was called with no interceptor left in the chain.
    ///
    /// Always a configuration defect: the chain must end with an entry that
    /// performs the target invocation without proceeding.
    #[error("cannot proceed: no interceptor or target handler left in the chain")]
    EndOfChain,

    /// A private data value does not match the type of its key.
    #[error("private data type mismatch: expected {expected}, found {found:?}")]
    TypeMismatch {
        /// Type named by the key.
        expected: &'static str,
        /// Runtime type of the rejected value.
        found: TypeId,
    },

    /// An interceptor refused the invocation.
    #[error("invocation rejected: {reason}")]
    Rejected {
        /// Why the invocation was refused.
        reason: String,
    },

    /// Failure raised by an interceptor body.
    #[error("interceptor '{name}' failed: {source}")]
    Interceptor {
        /// Interceptor that raised the failure.
        name: String,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },
}

impl InvocationError {
    /// Wrap an arbitrary failure raised inside the named interceptor.
    pub fn interceptor(name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Interceptor {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Refuse the invocation with a reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Whether this is the missing-terminal-handler defect.
    #[must_use]
    pub fn is_end_of_chain(&self) -> bool {
        matches!(self, Self::EndOfChain)
    }
}

/// Result type for invocation operations.
pub type Result<T> = std::result::Result<T, InvocationError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! Interceptor chains and the traversal cursor.
//!
//! An [`InterceptorChain`] is a window onto an immutable, shared backing
//! slice. Taking a suffix never copies entries, so a cloned continuation and
//! its origin share the same interceptors while keeping separate positions.
//!
//! A [`ChainCursor`] is a plain index into a chain. Retreating is a
//! decrement; there is no undo log.

use std::fmt;
use std::sync::Arc;

use crate::errors::{InvocationError, Result};
use crate::interceptor::Interceptor;

/// Ordered, immutable list of interceptors.
#[derive(Clone)]
pub struct InterceptorChain {
    entries: Arc<[Arc<dyn Interceptor>]>,
    offset: usize,
}

impl InterceptorChain {
    /// A chain with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Arc::from(Vec::new()),
            offset: 0,
        }
    }

    /// Build a chain over the given interceptors.
    #[must_use]
    pub fn new(interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        Self {
            entries: Arc::from(interceptors),
            offset: 0,
        }
    }

    /// Number of entries in this chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len() - self.offset
    }

    /// Whether the chain has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry at `index`, relative to the start of this chain.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arc<dyn Interceptor>> {
        self.interceptors().get(index)
    }

    /// Entries of this chain, in order.
    #[must_use]
    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.entries[self.offset..]
    }

    /// Chain over the entries from `start` to the end, sharing storage.
    ///
    /// A `start` past the end yields an empty chain.
    #[must_use]
    pub fn suffix(&self, start: usize) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            offset: (self.offset + start).min(self.entries.len()),
        }
    }

    /// Whether both chains view the same backing storage.
    #[must_use]
    pub fn shares_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    /// Names of the entries, in order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.interceptors()
            .iter()
            .map(|i| i.name().to_string())
            .collect()
    }
}

impl Default for InterceptorChain {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<Arc<dyn Interceptor>>> for InterceptorChain {
    fn from(interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        Self::new(interceptors)
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Bidirectional position within an [`InterceptorChain`].
///
/// The position is always within `0..=len`.
#[derive(Clone, Debug, Default)]
pub struct ChainCursor {
    chain: InterceptorChain,
    position: usize,
}

impl ChainCursor {
    /// Cursor at the start of `chain`.
    #[must_use]
    pub fn new(chain: InterceptorChain) -> Self {
        Self { chain, position: 0 }
    }

    /// Cursor positioned at `start`.
    ///
    /// Fails with [`InvocationError::InvalidArgument`] if `start` is past the
    /// end of the chain.
    pub fn at(chain: InterceptorChain, start: usize) -> Result<Self> {
        if start > chain.len() {
            return Err(InvocationError::InvalidArgument(format!(
                "start index {start} out of range for chain of {} interceptors",
                chain.len()
            )));
        }
        Ok(Self {
            chain,
            position: start,
        })
    }

    /// The chain this cursor walks.
    #[must_use]
    pub fn chain(&self) -> &InterceptorChain {
        &self.chain
    }

    /// Current position: the index of the entry [`advance`](Self::advance)
    /// would return.
    #[must_use]
    pub fn next_index(&self) -> usize {
        self.position
    }

    /// Whether an entry remains at or after the current position.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.position < self.chain.len()
    }

    /// Whether the cursor can step back.
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.position > 0
    }

    /// Return the entry at the current position and step past it.
    pub fn advance(&mut self) -> Option<Arc<dyn Interceptor>> {
        let next = self.chain.get(self.position).cloned()?;
        self.position += 1;
        Some(next)
    }

    /// Step back one entry. Returns `false` at the start of the chain.
    pub fn retreat(&mut self) -> bool {
        if self.has_previous() {
            self.position -= 1;
            true
        } else {
            false
        }
    }

    /// The entries not yet advanced past, as a chain sharing storage.
    #[must_use]
    pub fn remaining(&self) -> InterceptorChain {
        self.chain.suffix(self.position)
    }
}

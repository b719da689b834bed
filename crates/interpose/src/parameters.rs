//! Shared invocation arguments.
//!
//! [`Parameters`] is a handle to one argument vector. Cloning the handle does
//! not copy the arguments: a cloned [`InterceptorContext`](crate::InterceptorContext)
//! sees element writes made through the original, until either side installs
//! a different vector with `set_parameters`.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::errors::{InvocationError, Result};

/// Shared, ordered, mutable argument sequence.
#[derive(Clone, Default)]
pub struct Parameters {
    values: Arc<RwLock<Vec<Value>>>,
}

impl Parameters {
    /// Create a handle over the given arguments.
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values: Arc::new(RwLock::new(values)),
        }
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Whether there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Argument at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.values.read().get(index).cloned()
    }

    /// Replace the argument at `index`, returning the previous value.
    pub fn set(&self, index: usize, value: Value) -> Result<Value> {
        let mut values = self.values.write();
        let len = values.len();
        let slot = values.get_mut(index).ok_or_else(|| {
            InvocationError::InvalidArgument(format!(
                "parameter index {index} out of range for {len} parameters"
            ))
        })?;
        Ok(std::mem::replace(slot, value))
    }

    /// Append an argument.
    pub fn push(&self, value: Value) {
        self.values.write().push(value);
    }

    /// Replace every argument, returning the previous ones.
    pub fn replace(&self, values: Vec<Value>) -> Vec<Value> {
        std::mem::replace(&mut *self.values.write(), values)
    }

    /// Snapshot of the arguments.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.values.read().clone()
    }

    /// Whether both handles refer to the same argument storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }
}

impl From<Vec<Value>> for Parameters {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.read().iter()).finish()
    }
}

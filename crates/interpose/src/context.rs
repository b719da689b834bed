//! The interceptor context.
//!
//! [`InterceptorContext`] owns the state of one invocation (target, method,
//! parameters, context data, timer), its private data, and the cursor over
//! its interceptor chain. Interceptors receive it by mutable reference and
//! drive the chain with [`InterceptorContext::proceed`].
//!
//! ## Cursor bookkeeping
//!
//! `proceed()` advances the cursor, dispatches, and then steps the cursor
//! back once the nested call has returned, on success and failure alike.
//! Between two calls at the same depth the cursor therefore always points at
//! the same entry, which is what lets an interceptor proceed conditionally
//! or repeatedly, and what lets a clone resume from exactly where the
//! original was paused.
//!
//! A context is meant for one thread of execution. To continue an
//! invocation elsewhere, clone it: the clone is a separate continuation over
//! the remaining interceptors and can be moved to another thread.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::chain::{ChainCursor, InterceptorChain};
use crate::errors::{InvocationError, Result};
use crate::invocation::Invocation;
use crate::method::MethodDescriptor;
use crate::parameters::Parameters;
use crate::private_data::{Opaque, PrivateData, PrivateKey};

/// Mutable state shared by every interceptor of one invocation.
#[derive(Default)]
pub struct InterceptorContext {
    target: Option<Opaque>,
    method: Option<Arc<MethodDescriptor>>,
    parameters: Parameters,
    context_data: Option<HashMap<String, Value>>,
    timer: Option<Opaque>,
    private_data: PrivateData,
    cursor: ChainCursor,
    /// Bumped whenever the chain is replaced, so an in-flight `proceed()`
    /// leaves the new cursor alone when it unwinds.
    chain_generation: u64,
}

impl InterceptorContext {
    /// Create an empty context with no chain and uninitialized context data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Invocation state ────────────────────────────────────────────────

    /// The invocation target, if any.
    #[must_use]
    pub fn target(&self) -> Option<&Opaque> {
        self.target.as_ref()
    }

    /// The invocation target, downcast to `T`.
    #[must_use]
    pub fn target_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.target
            .as_ref()
            .and_then(|target| Arc::clone(target).downcast::<T>().ok())
    }

    /// Set the invocation target.
    pub fn set_target(&mut self, target: Option<Opaque>) {
        self.target = target;
    }

    /// The invoked method.
    #[must_use]
    pub fn method(&self) -> Option<&Arc<MethodDescriptor>> {
        self.method.as_ref()
    }

    /// Set the invoked method.
    pub fn set_method(&mut self, method: Option<Arc<MethodDescriptor>>) {
        self.method = method;
    }

    /// Handle to the invocation parameters.
    ///
    /// Writes through the handle are visible to every later interceptor and
    /// to the target handler.
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Install a parameter handle.
    pub fn set_parameters(&mut self, parameters: Parameters) {
        self.parameters = parameters;
    }

    /// Install a fresh parameter vector.
    pub fn set_parameter_values(&mut self, values: Vec<Value>) {
        self.parameters = Parameters::new(values);
    }

    /// The context data map.
    ///
    /// Fails with [`InvocationError::NotInitialized`] if the map was never
    /// set. An empty map that was set is returned normally.
    pub fn context_data(&self) -> Result<&HashMap<String, Value>> {
        self.context_data
            .as_ref()
            .ok_or(InvocationError::NotInitialized("context data"))
    }

    /// Mutable access to the context data map.
    pub fn context_data_mut(&mut self) -> Result<&mut HashMap<String, Value>> {
        self.context_data
            .as_mut()
            .ok_or(InvocationError::NotInitialized("context data"))
    }

    /// Set the context data map.
    pub fn set_context_data(&mut self, context_data: HashMap<String, Value>) {
        self.context_data = Some(context_data);
    }

    /// Whether the context data map was set.
    #[must_use]
    pub fn has_context_data(&self) -> bool {
        self.context_data.is_some()
    }

    /// The timer object, if any.
    #[must_use]
    pub fn timer(&self) -> Option<&Opaque> {
        self.timer.as_ref()
    }

    /// Set the timer object.
    pub fn set_timer(&mut self, timer: Option<Opaque>) {
        self.timer = timer;
    }

    /// Framework-facing view of this context.
    pub fn invocation_context(&mut self) -> Invocation<'_> {
        Invocation::new(self)
    }

    // ── Private data ────────────────────────────────────────────────────

    /// Look up a private data item by identity.
    #[must_use]
    pub fn private_data(&self, key: &PrivateKey) -> Option<Opaque> {
        self.private_data.get(key)
    }

    /// Store a private data item, or remove it when `value` is `None`.
    ///
    /// Returns the previous item. See [`PrivateData::put`] for the type-key
    /// contract.
    pub fn put_private_data(
        &mut self,
        key: PrivateKey,
        value: Option<Opaque>,
    ) -> Result<Option<Opaque>> {
        self.private_data.put(key, value)
    }

    /// Look up the private data item keyed by the type `T`.
    #[must_use]
    pub fn private_data_typed<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.private_data.get_typed::<T>()
    }

    /// Store the private data item keyed by the type `T`, or remove it.
    pub fn put_private_data_typed<T: Any + Send + Sync>(
        &mut self,
        value: Option<T>,
    ) -> Option<Arc<T>> {
        self.private_data.put_typed(value)
    }

    // ── Chain traversal ─────────────────────────────────────────────────

    /// The current interceptor chain.
    #[must_use]
    pub fn interceptors(&self) -> &InterceptorChain {
        self.cursor.chain()
    }

    /// Replace the chain and start a fresh traversal at its first entry.
    pub fn set_interceptors(&mut self, interceptors: impl Into<InterceptorChain>) {
        self.install(ChainCursor::new(interceptors.into()));
    }

    /// Replace the chain and position the cursor at `next_index`.
    ///
    /// Fails with [`InvocationError::InvalidArgument`] if `interceptors` is
    /// absent (pass an empty chain instead) or `next_index` is past its end.
    pub fn set_interceptor_chain(
        &mut self,
        interceptors: Option<InterceptorChain>,
        next_index: usize,
    ) -> Result<()> {
        let chain = interceptors.ok_or_else(|| {
            InvocationError::InvalidArgument("interceptor chain is absent".to_string())
        })?;
        let cursor = ChainCursor::at(chain, next_index)?;
        self.install(cursor);
        Ok(())
    }

    /// Current cursor position within the chain.
    #[must_use]
    pub fn next_interceptor_index(&self) -> usize {
        self.cursor.next_index()
    }

    /// Pass the invocation on to the next entry in the chain.
    ///
    /// Returns whatever that entry returns. Failures propagate unchanged.
    /// Either way the cursor is back at its pre-call position afterwards,
    /// including when the entry panics (the panic is resumed once the cursor
    /// has been restored).
    /// Fails with [`InvocationError::EndOfChain`] if no entry remains.
    pub fn proceed(&mut self) -> Result<Value> {
        let index = self.cursor.next_index();
        let Some(next) = self.cursor.advance() else {
            debug!(index, "proceed called with no interceptor left in the chain");
            return Err(InvocationError::EndOfChain);
        };
        let generation = self.chain_generation;
        trace!(index, interceptor = next.name(), "dispatching invocation");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| next.process_invocation(self)));

        if self.chain_generation == generation {
            let _ = self.cursor.retreat();
        }
        match outcome {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    fn install(&mut self, cursor: ChainCursor) {
        trace!(
            len = cursor.chain().len(),
            next_index = cursor.next_index(),
            "installing interceptor chain"
        );
        self.cursor = cursor;
        self.chain_generation = self.chain_generation.wrapping_add(1);
    }
}

/// Clones resume where this context would resume.
///
/// The clone gets copies of the context data (only if it was set) and of
/// the private data entries, shares the target, method, parameters and
/// timer, and walks a chain made of the entries from the current cursor
/// position to the end, starting at its first entry. Advancing either side
/// never moves the other's cursor.
impl Clone for InterceptorContext {
    fn clone(&self) -> Self {
        let remaining = self.cursor.remaining();
        trace!(
            from_index = self.cursor.next_index(),
            remaining = remaining.len(),
            "cloning interceptor context"
        );
        Self {
            target: self.target.clone(),
            method: self.method.clone(),
            parameters: self.parameters.clone(),
            context_data: self.context_data.clone(),
            timer: self.timer.clone(),
            private_data: self.private_data.clone(),
            cursor: ChainCursor::new(remaining),
            chain_generation: 0,
        }
    }
}

impl fmt::Debug for InterceptorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorContext")
            .field("has_target", &self.target.is_some())
            .field("method", &self.method)
            .field("parameters", &self.parameters)
            .field("context_data", &self.context_data)
            .field("private_data", &self.private_data)
            .field("interceptors", self.cursor.chain())
            .field("next_index", &self.cursor.next_index())
            .finish_non_exhaustive()
    }
}

//! Interceptor trait.
//!
//! Defines the [`Interceptor`] trait that every chain entry implements, plus
//! closure-backed implementations for the common cases.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::context::InterceptorContext;
use crate::errors::Result;

/// A single entry in an interceptor chain.
///
/// An interceptor may:
/// - inspect or mutate the shared invocation state before delegating,
/// - call [`InterceptorContext::proceed`] zero times (short-circuit) or more
///   than once (run the rest of the chain again),
/// - inspect or replace the result or failure `proceed()` produced.
///
/// The last entry of a chain performs the actual target call and must not
/// call `proceed()` itself.
pub trait Interceptor: Send + Sync {
    /// Name used in logs. Defaults to the implementing type's name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Handle the invocation described by `context`.
    fn process_invocation(&self, context: &mut InterceptorContext) -> Result<Value>;
}

type InterceptFn = dyn Fn(&mut InterceptorContext) -> Result<Value> + Send + Sync;
type TargetFn = dyn Fn(&InterceptorContext) -> Result<Value> + Send + Sync;

/// Interceptor backed by a closure.
pub struct FnInterceptor {
    name: String,
    handler: Box<InterceptFn>,
}

impl FnInterceptor {
    /// Wrap `handler` under `name`.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut InterceptorContext) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Box::new(handler),
        }
    }
}

impl Interceptor for FnInterceptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_invocation(&self, context: &mut InterceptorContext) -> Result<Value> {
        (self.handler)(context)
    }
}

impl fmt::Debug for FnInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInterceptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Terminal chain entry that performs the target call.
///
/// The handler only sees the context by shared reference, so it cannot
/// proceed further down the chain.
pub struct TargetInvoker {
    name: String,
    invoke: Box<TargetFn>,
}

impl TargetInvoker {
    /// Wrap `invoke` under `name`.
    pub fn new<F>(name: impl Into<String>, invoke: F) -> Self
    where
        F: Fn(&InterceptorContext) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            invoke: Box::new(invoke),
        }
    }
}

impl Interceptor for TargetInvoker {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_invocation(&self, context: &mut InterceptorContext) -> Result<Value> {
        (self.invoke)(context)
    }
}

impl fmt::Debug for TargetInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetInvoker")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Shorthand for a shared [`FnInterceptor`].
pub fn interceptor_fn<F>(name: impl Into<String>, handler: F) -> Arc<dyn Interceptor>
where
    F: Fn(&mut InterceptorContext) -> Result<Value> + Send + Sync + 'static,
{
    Arc::new(FnInterceptor::new(name, handler))
}

/// Shorthand for a shared [`TargetInvoker`].
pub fn target_fn<F>(name: impl Into<String>, invoke: F) -> Arc<dyn Interceptor>
where
    F: Fn(&InterceptorContext) -> Result<Value> + Send + Sync + 'static,
{
    Arc::new(TargetInvoker::new(name, invoke))
}

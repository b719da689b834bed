//! Framework-facing invocation view.
//!
//! Some callers expect the classic interceptor invocation shape (target,
//! method, parameters, context data, timer, proceed) rather than the full
//! [`InterceptorContext`]. [`Invocation`] provides that shape by forwarding
//! every call to the borrowed context; it holds no state of its own.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::context::InterceptorContext;
use crate::errors::Result;
use crate::method::MethodDescriptor;
use crate::private_data::Opaque;

/// The invocation shape exposed to framework-level interceptors.
pub trait InvocationContext {
    /// The invocation target.
    fn target(&self) -> Option<&Opaque>;

    /// The invoked method.
    fn method(&self) -> Option<&Arc<MethodDescriptor>>;

    /// Snapshot of the current parameters.
    fn parameters(&self) -> Vec<Value>;

    /// Replace the parameters.
    fn set_parameters(&mut self, parameters: Vec<Value>);

    /// The context data map.
    fn context_data(&mut self) -> Result<&mut HashMap<String, Value>>;

    /// The timer object.
    fn timer(&self) -> Option<&Opaque>;

    /// Continue with the next interceptor.
    fn proceed(&mut self) -> Result<Value>;
}

/// [`InvocationContext`] view over an [`InterceptorContext`].
#[derive(Debug)]
pub struct Invocation<'a> {
    context: &'a mut InterceptorContext,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(context: &'a mut InterceptorContext) -> Self {
        Self { context }
    }
}

impl InvocationContext for Invocation<'_> {
    fn target(&self) -> Option<&Opaque> {
        self.context.target()
    }

    fn method(&self) -> Option<&Arc<MethodDescriptor>> {
        self.context.method()
    }

    fn parameters(&self) -> Vec<Value> {
        self.context.parameters().to_vec()
    }

    fn set_parameters(&mut self, parameters: Vec<Value>) {
        self.context.set_parameter_values(parameters);
    }

    fn context_data(&mut self) -> Result<&mut HashMap<String, Value>> {
        self.context.context_data_mut()
    }

    fn timer(&self) -> Option<&Opaque> {
        self.context.timer()
    }

    fn proceed(&mut self) -> Result<Value> {
        self.context.proceed()
    }
}

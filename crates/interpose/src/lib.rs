//! # interpose
//!
//! Interceptor chain engine. An ordered list of [`Interceptor`]s observes and
//! augments a single method-style call while sharing one mutable
//! [`InterceptorContext`].
//!
//! ## Execution Model
//!
//! - [`InterceptorContext::proceed`] advances the chain cursor, dispatches to
//!   the next interceptor, and retreats the cursor once that call returns.
//!   The cursor therefore tracks call depth, so an interceptor may call
//!   `proceed()` zero times (short-circuit) or several times (replay).
//! - The last entry of a well-formed chain performs the actual target call
//!   (see [`TargetInvoker`]) and never calls `proceed()` itself. Running off
//!   the end of the chain is reported as [`InvocationError::EndOfChain`].
//! - Cloning a context mid-chain yields an independent continuation bound to
//!   the remaining suffix of the chain.
//!
//! ## Example
//!
//! ```rust
//! use interpose::{InterceptorContext, interceptor_fn, target_fn};
//! use serde_json::json;
//!
//! let mut ctx = InterceptorContext::new();
//! ctx.set_parameter_values(vec![json!(2), json!(3)]);
//! ctx.set_interceptors(vec![
//!     interceptor_fn("double", |ctx| {
//!         let result = ctx.proceed()?;
//!         Ok(json!(result.as_i64().unwrap_or_default() * 2))
//!     }),
//!     target_fn("add", |ctx| {
//!         let args = ctx.parameters().to_vec();
//!         Ok(json!(args[0].as_i64().unwrap_or_default() + args[1].as_i64().unwrap_or_default()))
//!     }),
//! ]);
//! assert_eq!(ctx.proceed().unwrap(), json!(10));
//! ```

#![deny(unsafe_code)]

pub mod chain;
pub mod context;
pub mod errors;
pub mod interceptor;
pub mod invocation;
pub mod logging;
pub mod method;
pub mod parameters;
pub mod private_data;

pub use chain::{ChainCursor, InterceptorChain};
pub use context::InterceptorContext;
pub use errors::{InvocationError, Result};
pub use interceptor::{FnInterceptor, Interceptor, TargetInvoker, interceptor_fn, target_fn};
pub use invocation::{Invocation, InvocationContext};
pub use method::MethodDescriptor;
pub use parameters::Parameters;
pub use private_data::{ObjectKey, Opaque, PrivateData, PrivateKey};

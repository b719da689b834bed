//! The demo chain: `[LogInterceptor, AuthInterceptor, (ReplayInterceptor), target]`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use interpose::{
    Interceptor, InterceptorContext, InvocationError, MethodDescriptor, Result, target_fn,
};
use serde_json::{Value, json};
use tracing::info;

/// Invocation target: greets every argument.
#[derive(Debug)]
pub struct Greeter {
    /// Word placed before the names.
    pub greeting: String,
}

impl Greeter {
    fn greet(&self, names: &[Value]) -> String {
        let names: Vec<String> = names
            .iter()
            .map(|v| v.as_str().map_or_else(|| v.to_string(), ToString::to_string))
            .collect();
        format!("{} {}", self.greeting, names.join(", "))
    }
}

/// Start time of the call, kept in private data.
struct CallStarted(Instant);

/// Logs the call and its outcome.
pub struct LogInterceptor;

impl Interceptor for LogInterceptor {
    fn name(&self) -> &str {
        "log"
    }

    fn process_invocation(&self, context: &mut InterceptorContext) -> Result<Value> {
        let method = context
            .method()
            .map_or_else(|| "<unknown>".to_string(), |m| m.signature());
        info!(%method, parameters = ?context.parameters(), "invocation started");
        let _ = context.put_private_data_typed(Some(CallStarted(Instant::now())));

        let result = context.proceed();

        let elapsed_us = context
            .private_data_typed::<CallStarted>()
            .map(|started| u64::try_from(started.0.elapsed().as_micros()).unwrap_or(u64::MAX))
            .unwrap_or_default();
        match &result {
            Ok(value) => info!(%method, %value, elapsed_us, "invocation finished"),
            Err(error) => info!(%method, %error, elapsed_us, "invocation failed"),
        }
        result
    }
}

/// Short-circuits calls whose first argument is the deny token.
pub struct AuthInterceptor {
    deny_token: String,
}

impl AuthInterceptor {
    /// Refuse calls whose first argument equals `deny_token`.
    pub fn new(deny_token: impl Into<String>) -> Self {
        Self {
            deny_token: deny_token.into(),
        }
    }
}

impl Interceptor for AuthInterceptor {
    fn name(&self) -> &str {
        "auth"
    }

    fn process_invocation(&self, context: &mut InterceptorContext) -> Result<Value> {
        let first = context.parameters().get(0);
        if first.as_ref().and_then(Value::as_str) == Some(self.deny_token.as_str()) {
            return Ok(json!({ "denied": true }));
        }
        if let Ok(data) = context.context_data_mut() {
            let _ = data.insert("authorized".to_string(), json!(true));
        }
        context.proceed()
    }
}

/// Runs the remaining chain twice: once on a clone with upper-cased
/// arguments, then on the original.
pub struct ReplayInterceptor;

impl Interceptor for ReplayInterceptor {
    fn name(&self) -> &str {
        "replay"
    }

    fn process_invocation(&self, context: &mut InterceptorContext) -> Result<Value> {
        let mut replay = context.clone();
        let shouted = context
            .parameters()
            .to_vec()
            .into_iter()
            .map(|v| match v {
                Value::String(s) => Value::String(s.to_uppercase()),
                other => other,
            })
            .collect();
        replay.set_parameter_values(shouted);

        let replayed = replay.proceed()?;
        let original = context.proceed()?;
        Ok(json!({ "original": original, "replay": replayed }))
    }
}

/// Terminal entry calling [`Greeter`] through the context target.
pub fn greeter_target() -> Arc<dyn Interceptor> {
    target_fn("greeter", |ctx| {
        let greeter = ctx.target_as::<Greeter>().ok_or_else(|| {
            InvocationError::interceptor("greeter", "target is not a Greeter")
        })?;
        Ok(json!({ "greeting": greeter.greet(&ctx.parameters().to_vec()) }))
    })
}

/// Build a ready-to-run context for the demo chain.
pub fn build_context(args: Vec<String>, deny_token: &str, fork: bool) -> InterceptorContext {
    let mut chain: Vec<Arc<dyn Interceptor>> = Vec::new();
    chain.push(Arc::new(LogInterceptor));
    chain.push(Arc::new(AuthInterceptor::new(deny_token)));
    if fork {
        chain.push(Arc::new(ReplayInterceptor));
    }
    chain.push(greeter_target());

    let mut context = InterceptorContext::new();
    context.set_target(Some(Arc::new(Greeter {
        greeting: "hello".to_string(),
    })));
    context.set_method(Some(Arc::new(
        MethodDescriptor::new("Greeter", "greet")
            .with_parameters(["String..."])
            .returning("String"),
    )));
    context.set_parameter_values(args.into_iter().map(Value::String).collect());
    context.set_context_data(HashMap::from([("caller".to_string(), json!("cli"))]));
    context.set_interceptors(chain);
    context
}

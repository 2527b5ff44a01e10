//! Per-page access evaluation
//!
//! An [`AccessSpec`] is a boolean literal, a synchronous predicate or an
//! asynchronous predicate. [`AccessEvaluator::evaluate`] turns it into a
//! [`Verdict`] without ever failing: predicate errors, panics and missing
//! configuration all become denials.
//!
//! Literals and synchronous predicates resolve immediately
//! ([`Evaluation::Ready`]); only asynchronous predicates suspend.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::{Future, IntoFuture};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use serde_json::Value;
use thiserror::Error;

use crate::config::{AccessDefault, PagesConfig};

/// Read-only view of the host's global state store
///
/// Predicates receive the accessor as their only argument, so they can be
/// tested against a plain map.
pub trait StateAccessor: Send + Sync {
    /// Returns the current value stored under `key`
    fn get(&self, key: &str) -> Option<Value>;

    /// True when `key` holds a truthy value (see [`truthy`])
    fn is_truthy(&self, key: &str) -> bool {
        self.get(key).as_ref().is_some_and(truthy)
    }
}

/// Shared handle passed to predicates and stored by navigators
pub type StateHandle = Arc<dyn StateAccessor>;

/// Accessor with no keys at all
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyState;

impl StateAccessor for EmptyState {
    fn get(&self, _key: &str) -> Option<Value> {
        None
    }
}

impl StateAccessor for HashMap<String, Value> {
    fn get(&self, key: &str) -> Option<Value> {
        HashMap::get(self, key).cloned()
    }
}

impl StateAccessor for BTreeMap<String, Value> {
    fn get(&self, key: &str) -> Option<Value> {
        BTreeMap::get(self, key).cloned()
    }
}

/// JSON truthiness: everything except `null`, `false`, `0` and `""`
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub type SyncPredicate = Arc<dyn Fn(&dyn StateAccessor) -> anyhow::Result<bool> + Send + Sync>;
pub type AsyncPredicate =
    Arc<dyn Fn(StateHandle) -> BoxFuture<'static, anyhow::Result<bool>> + Send + Sync>;

/// Access configuration of one page
#[derive(Clone)]
pub enum AccessSpec {
    Literal(bool),
    Predicate(SyncPredicate),
    AsyncPredicate(AsyncPredicate),
}

impl AccessSpec {
    pub fn allow() -> Self {
        Self::Literal(true)
    }

    pub fn deny() -> Self {
        Self::Literal(false)
    }

    /// Wraps a synchronous predicate
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_pages::access::{AccessSpec, StateAccessor};
    ///
    /// let admin_only = AccessSpec::predicate(|state: &dyn StateAccessor| {
    ///     Ok(state.get("role").is_some_and(|role| role == "admin"))
    /// });
    /// ```
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&dyn StateAccessor) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(predicate))
    }

    /// Wraps an asynchronous predicate
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_pages::access::AccessSpec;
    ///
    /// let logged_in = AccessSpec::asynchronous(|state| async move {
    ///     Ok(state.is_truthy("user"))
    /// });
    /// ```
    pub fn asynchronous<F, Fut>(predicate: F) -> Self
    where
        F: Fn(StateHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        Self::AsyncPredicate(Arc::new(move |state| predicate(state).boxed()))
    }
}

impl From<bool> for AccessSpec {
    fn from(value: bool) -> Self {
        Self::Literal(value)
    }
}

impl fmt::Debug for AccessSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::AsyncPredicate(_) => f.write_str("AsyncPredicate(..)"),
        }
    }
}

/// Why a page was not granted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// `access = false`
    Literal,
    /// A predicate returned `false`
    Predicate,
    /// No access setting and the default policy denies
    Unconfigured,
    /// A predicate returned an error or panicked
    Failed,
}

/// Result of one access check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Granted,
    Denied(Denial),
}

impl Verdict {
    pub fn is_granted(&self) -> bool {
        matches!(self, Verdict::Granted)
    }

    fn from_predicate(granted: bool) -> Self {
        if granted {
            Verdict::Granted
        } else {
            Verdict::Denied(Denial::Predicate)
        }
    }
}

/// A verdict that is either known now or still suspended on a predicate
pub enum Evaluation {
    Ready(Verdict),
    Pending(BoxFuture<'static, Verdict>),
}

impl Evaluation {
    /// The verdict, if it did not need to suspend
    pub fn now(&self) -> Option<Verdict> {
        match self {
            Evaluation::Ready(verdict) => Some(*verdict),
            Evaluation::Pending(_) => None,
        }
    }
}

impl IntoFuture for Evaluation {
    type Output = Verdict;
    type IntoFuture = BoxFuture<'static, Verdict>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Evaluation::Ready(verdict) => future::ready(verdict).boxed(),
            Evaluation::Pending(pending) => pending,
        }
    }
}

impl fmt::Debug for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Ready(verdict) => f.debug_tuple("Ready").field(verdict).finish(),
            Evaluation::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Failure inside a user-supplied predicate
///
/// Never escapes [`AccessEvaluator::evaluate`]; exposed through
/// [`AccessEvaluator::try_evaluate`] for diagnostics only.
#[derive(Debug, Error)]
pub enum AccessEvaluationError {
    #[error("access predicate failed: {0:#}")]
    Predicate(#[source] anyhow::Error),

    #[error("access predicate panicked: {0}")]
    Panicked(String),
}

/// Evaluates access specifications against a state accessor
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessEvaluator {
    default_access: AccessDefault,
}

impl AccessEvaluator {
    pub fn new(default_access: AccessDefault) -> Self {
        Self { default_access }
    }

    pub fn from_config(config: &PagesConfig) -> Self {
        Self::new(config.default_access)
    }

    pub fn default_access(&self) -> AccessDefault {
        self.default_access
    }

    /// Produces the verdict for `spec`, absorbing every failure into denial
    ///
    /// Literals and synchronous predicates return [`Evaluation::Ready`];
    /// asynchronous predicates return [`Evaluation::Pending`].
    pub fn evaluate(&self, spec: Option<&AccessSpec>, state: &StateHandle) -> Evaluation {
        match spec {
            None => Evaluation::Ready(self.unconfigured()),
            Some(AccessSpec::Literal(true)) => Evaluation::Ready(Verdict::Granted),
            Some(AccessSpec::Literal(false)) => Evaluation::Ready(Verdict::Denied(Denial::Literal)),
            Some(AccessSpec::Predicate(predicate)) => {
                let verdict = absorb(run_sync(predicate, state));
                tracing::debug!(?verdict, "access evaluated");
                Evaluation::Ready(verdict)
            }
            Some(AccessSpec::AsyncPredicate(predicate)) => {
                let pending = run_async(predicate, state);
                Evaluation::Pending(
                    async move {
                        let verdict = absorb(pending.await);
                        tracing::debug!(?verdict, "access evaluated");
                        verdict
                    }
                    .boxed(),
                )
            }
        }
    }

    /// Like [`evaluate`](Self::evaluate) but surfaces predicate failures
    ///
    /// Missing configuration still follows the default policy.
    pub async fn try_evaluate(
        &self,
        spec: Option<&AccessSpec>,
        state: &StateHandle,
    ) -> Result<bool, AccessEvaluationError> {
        match spec {
            None => Ok(self.unconfigured().is_granted()),
            Some(AccessSpec::Literal(value)) => Ok(*value),
            Some(AccessSpec::Predicate(predicate)) => run_sync(predicate, state),
            Some(AccessSpec::AsyncPredicate(predicate)) => run_async(predicate, state).await,
        }
    }

    fn unconfigured(&self) -> Verdict {
        match self.default_access {
            AccessDefault::Allow => Verdict::Granted,
            AccessDefault::Deny => Verdict::Denied(Denial::Unconfigured),
        }
    }
}

fn run_sync(predicate: &SyncPredicate, state: &StateHandle) -> Result<bool, AccessEvaluationError> {
    std::panic::catch_unwind(AssertUnwindSafe(|| predicate(state.as_ref())))
        .map_err(|payload| AccessEvaluationError::Panicked(panic_message(payload.as_ref())))?
        .map_err(AccessEvaluationError::Predicate)
}

fn run_async(
    predicate: &AsyncPredicate,
    state: &StateHandle,
) -> BoxFuture<'static, Result<bool, AccessEvaluationError>> {
    // The predicate call itself may panic before handing back a future
    let pending = match std::panic::catch_unwind(AssertUnwindSafe(|| predicate(Arc::clone(state)))) {
        Ok(pending) => pending,
        Err(payload) => {
            let err = AccessEvaluationError::Panicked(panic_message(payload.as_ref()));
            return future::ready(Err(err)).boxed();
        }
    };

    AssertUnwindSafe(pending)
        .catch_unwind()
        .map(|outcome| match outcome {
            Ok(result) => result.map_err(AccessEvaluationError::Predicate),
            Err(payload) => Err(AccessEvaluationError::Panicked(panic_message(payload.as_ref()))),
        })
        .boxed()
}

fn absorb(result: Result<bool, AccessEvaluationError>) -> Verdict {
    match result {
        Ok(granted) => Verdict::from_predicate(granted),
        Err(err) => {
            tracing::warn!(error = %err, "access predicate failed, denying");
            Verdict::Denied(Denial::Failed)
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

//! Resumable step sequences and action bodies.

use crate::context::Context;
use crate::error::ActionError;
use serde_json::Value;

/// Outcome of one resumption
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Suspended, handing a value to the driver
    Yielded(Value),
    /// Finished with a result
    Complete(Value),
}

impl Step {
    pub fn is_complete(&self) -> bool {
        matches!(self, Step::Complete(_))
    }
}

pub type StepResult = Result<Step, ActionError>;

/// A suspendable operation driven one resumption at a time.
pub trait StepSequence: Send {
    /// Resume with the value the last yield resolved to.
    fn advance(&mut self, input: Value) -> StepResult;

    /// Terminate early with `value`.
    fn finish(&mut self, value: Value) -> StepResult {
        Ok(Step::Complete(value))
    }

    /// Resume by raising `error` at the suspension point.
    fn fail(&mut self, error: ActionError) -> StepResult {
        Err(error)
    }
}

impl<S: StepSequence + ?Sized> StepSequence for Box<S> {
    fn advance(&mut self, input: Value) -> StepResult {
        (**self).advance(input)
    }

    fn finish(&mut self, value: Value) -> StepResult {
        (**self).finish(value)
    }

    fn fail(&mut self, error: ActionError) -> StepResult {
        (**self).fail(error)
    }
}

/// Step sequence whose `advance` is a closure.
pub struct FnSteps<F> {
    f: F,
}

pub fn from_fn<F>(f: F) -> FnSteps<F>
where
    F: FnMut(Value) -> StepResult + Send,
{
    FnSteps { f }
}

impl<F> StepSequence for FnSteps<F>
where
    F: FnMut(Value) -> StepResult + Send,
{
    fn advance(&mut self, input: Value) -> StepResult {
        (self.f)(input)
    }
}

/// The procedure an action wraps: a declared name plus a constructor for its steps.
pub trait ActionBody: Send + Sync {
    fn name(&self) -> &str;

    fn start(&self, params: Value, context: Context) -> Box<dyn StepSequence>;
}

/// Action body built from a function and an explicit name.
pub struct NamedBody<F> {
    name: String,
    f: F,
}

pub fn named<F, S>(name: impl Into<String>, f: F) -> NamedBody<F>
where
    F: Fn(Value, Context) -> S + Send + Sync,
    S: StepSequence + 'static,
{
    NamedBody {
        name: name.into(),
        f,
    }
}

impl<F, S> ActionBody for NamedBody<F>
where
    F: Fn(Value, Context) -> S + Send + Sync,
    S: StepSequence + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, params: Value, context: Context) -> Box<dyn StepSequence> {
        Box::new((self.f)(params, context))
    }
}

/// Action body named after the function identifier it wraps.
///
/// ```ignore
/// fn addTodo(params: Value, context: Context) -> impl StepSequence { ... }
/// let body = gendux::body!(addTodo);
/// assert_eq!(body.name(), "addTodo");
/// ```
#[macro_export]
macro_rules! body {
    ($f:ident) => {
        $crate::action::named(stringify!($f), $f)
    };
}

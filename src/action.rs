//! Context-Bound Actions
//!
//! An [`Action`] wraps a step procedure `(params, context) -> steps`. Invoking it captures
//! the ambient context at that moment; the returned [`ContextBound`] sequence installs that
//! captured context around every resumption (`advance`, `finish`, `fail`) and restores the
//! previous slot value afterwards on every path, so each step observes the same context
//! even when other operations run their own contexts in between or inside it.

mod flow;
mod sequence;
mod shape;

pub use flow::{EffectHandler, Flow, Immediate};
pub use sequence::{
    from_fn, named, ActionBody, FnSteps, NamedBody, Step, StepResult, StepSequence,
};
pub use shape::{FieldType, Shape, ShapeSource};

use crate::context::{current_context, run_with_context, Context};
use crate::error::ActionError;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Declared input and output shapes awaiting a body.
pub struct ActionBuilder {
    input: ShapeSource<Shape>,
    output: ShapeSource<FieldType>,
}

/// Declare an action's parameter shape and result type.
pub fn action(
    input: impl Into<ShapeSource<Shape>>,
    output: impl Into<ShapeSource<FieldType>>,
) -> ActionBuilder {
    ActionBuilder {
        input: input.into(),
        output: output.into(),
    }
}

impl ActionBuilder {
    pub fn wrap(self, body: impl ActionBody + 'static) -> Action {
        Action {
            body: Arc::new(body),
            input: self.input,
            output: self.output,
        }
    }
}

/// A wrapped, registrable action. Cheap to clone.
#[derive(Clone)]
pub struct Action {
    body: Arc<dyn ActionBody>,
    input: ShapeSource<Shape>,
    output: ShapeSource<FieldType>,
}

impl Action {
    /// Externally visible name, equal to the body's declared name.
    pub fn name(&self) -> &str {
        self.body.name()
    }

    pub fn body(&self) -> Arc<dyn ActionBody> {
        Arc::clone(&self.body)
    }

    /// Same shapes, different body.
    pub fn with_body(&self, body: impl ActionBody + 'static) -> Action {
        Action {
            body: Arc::new(body),
            input: self.input.clone(),
            output: self.output.clone(),
        }
    }

    /// Start the action under the current ambient context.
    ///
    /// Fails with a missing-context error when no context is installed.
    pub fn invoke(&self, params: Value) -> Result<ContextBound, ActionError> {
        let context = current_context()?;
        let shape = self.input.resolve(&context);
        shape
            .check(&params)
            .map_err(|(field, expected)| ActionError::InvalidParams {
                action: self.name().to_string(),
                field,
                expected: expected.to_string(),
            })?;
        let output = self.output.resolve(&context);

        let steps = run_with_context(&context, || self.body.start(params, context.clone()));
        debug!(action = self.name(), "Action started");

        Ok(ContextBound {
            action: self.name().to_string(),
            context,
            steps: Some(steps),
            output,
        })
    }

    /// Start the action and adapt it for the async driver.
    pub fn flow(&self, params: Value) -> Result<Flow, ActionError> {
        self.invoke(params).map(Flow::new)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").field("name", &self.name()).finish()
    }
}

/// Running action whose resumptions all execute under the captured context.
pub struct ContextBound {
    action: String,
    context: Context,
    steps: Option<Box<dyn StepSequence>>,
    output: FieldType,
}

impl ContextBound {
    pub fn action_name(&self) -> &str {
        &self.action
    }

    /// Context captured when the action was invoked.
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn is_finished(&self) -> bool {
        self.steps.is_none()
    }

    /// Terminate early by forwarding `finish(null)`. A completion produced this way is
    /// passed through without checking it against the output type.
    pub fn cancel(&mut self) -> StepResult {
        self.resume(|steps| steps.finish(Value::Null), false)
    }

    fn resume(
        &mut self,
        primitive: impl FnOnce(&mut dyn StepSequence) -> StepResult,
        check_output: bool,
    ) -> StepResult {
        let Some(steps) = self.steps.as_mut() else {
            return Ok(Step::Complete(Value::Null));
        };
        let result = run_with_context(&self.context, || primitive(&mut **steps));

        match result {
            Ok(Step::Yielded(value)) => Ok(Step::Yielded(value)),
            Ok(Step::Complete(value)) => {
                self.steps = None;
                debug!(action = %self.action, "Action completed");
                if !check_output || self.output.accepts(&value) {
                    Ok(Step::Complete(value))
                } else {
                    Err(ActionError::InvalidOutput {
                        action: self.action.clone(),
                        expected: self.output.to_string(),
                    })
                }
            }
            Err(error) => {
                self.steps = None;
                debug!(action = %self.action, error = %error, "Action failed");
                Err(error)
            }
        }
    }
}

impl fmt::Debug for ContextBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextBound")
            .field("action", &self.action)
            .field("finished", &self.is_finished())
            .finish()
    }
}

impl StepSequence for ContextBound {
    fn advance(&mut self, input: Value) -> StepResult {
        self.resume(|steps| steps.advance(input), true)
    }

    fn finish(&mut self, value: Value) -> StepResult {
        self.resume(|steps| steps.finish(value), true)
    }

    fn fail(&mut self, error: ActionError) -> StepResult {
        if self.is_finished() {
            debug!(action = %self.action, error = %error, "Dropping failure raised into a finished action");
        }
        self.resume(|steps| steps.fail(error), true)
    }
}

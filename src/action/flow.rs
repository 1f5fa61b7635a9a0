//! Async driver for context-bound actions.
//!
//! A [`Flow`] is the long-running process form of an action: it advances the sequence,
//! hands every yielded value to an [`EffectHandler`], and resumes with the resolved value
//! or forwards the handler's error through `fail`. Each resumption is a synchronous call,
//! so the ambient context never stays installed across an `.await`.

use super::{ContextBound, Step, StepSequence};
use crate::error::ActionError;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use tracing::debug;

/// Resolves values yielded by a running action.
#[async_trait]
pub trait EffectHandler: Send + Sync {
    async fn resolve(&self, effect: Value) -> Result<Value, ActionError>;
}

/// Resolves every yielded value to itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

#[async_trait]
impl EffectHandler for Immediate {
    async fn resolve(&self, effect: Value) -> Result<Value, ActionError> {
        Ok(effect)
    }
}

/// Running action adapted for async execution.
pub struct Flow {
    steps: ContextBound,
}

impl Flow {
    pub(crate) fn new(steps: ContextBound) -> Self {
        Self { steps }
    }

    /// Name of the action this flow runs.
    pub fn name(&self) -> &str {
        self.steps.action_name()
    }

    pub fn steps(&self) -> &ContextBound {
        &self.steps
    }

    /// Terminate early, forwarding `finish(null)` to the action. The early result is
    /// not checked against the action's output type.
    pub fn cancel(&mut self) -> Result<Step, ActionError> {
        debug!(action = self.name(), "Flow cancelled");
        self.steps.cancel()
    }

    /// Drive the action to completion.
    pub async fn run(self, handler: &dyn EffectHandler) -> Result<Value, ActionError> {
        self.run_until(handler, std::future::pending()).await
    }

    /// Drive the action until it completes or `cancel` resolves. Cancellation is
    /// forwarded as `finish(null)`; if the action keeps yielding afterwards it is
    /// driven on to completion.
    pub async fn run_until<C>(
        mut self,
        handler: &dyn EffectHandler,
        cancel: C,
    ) -> Result<Value, ActionError>
    where
        C: Future<Output = ()>,
    {
        tokio::pin!(cancel);
        let mut cancelled = false;
        let mut step = self.steps.advance(Value::Null);

        loop {
            let effect = match step? {
                Step::Complete(value) => return Ok(value),
                Step::Yielded(effect) => effect,
            };

            let resolved = tokio::select! {
                biased;
                _ = &mut cancel, if !cancelled => None,
                resolved = handler.resolve(effect) => Some(resolved),
            };

            step = match resolved {
                None => {
                    cancelled = true;
                    self.cancel()
                }
                Some(Ok(value)) => self.steps.advance(value),
                Some(Err(error)) => self.steps.fail(error),
            };
        }
    }
}

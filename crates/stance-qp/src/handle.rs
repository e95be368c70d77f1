//! Owning handle over a controller context with explicit destruction.

use tracing::debug;

use crate::context::{ConstructArgs, ControllerContext};
use crate::error::ControllerError;

/// Opaque owner of a [`ControllerContext`].
///
/// Destroying the handle tears the context down once; later calls are
/// no-ops and accessors report [`ControllerError::Destroyed`].
#[derive(Debug)]
pub struct ControllerHandle {
    context: Option<Box<ControllerContext>>,
}

impl ControllerHandle {
    pub fn create(args: &ConstructArgs) -> Result<Self, ControllerError> {
        ControllerContext::construct(args).map(Self::from_context)
    }

    pub fn from_context(context: ControllerContext) -> Self {
        Self {
            context: Some(Box::new(context)),
        }
    }

    pub const fn is_live(&self) -> bool {
        self.context.is_some()
    }

    pub fn context(&self) -> Result<&ControllerContext, ControllerError> {
        self.context.as_deref().ok_or(ControllerError::Destroyed)
    }

    pub fn context_mut(&mut self) -> Result<&mut ControllerContext, ControllerError> {
        self.context.as_deref_mut().ok_or(ControllerError::Destroyed)
    }

    /// Tear down the context. Returns `false` if it was already destroyed.
    pub fn destroy(&mut self) -> bool {
        match self.context.take() {
            Some(context) => {
                context.teardown();
                true
            }
            None => {
                debug!("destroy called on an already destroyed controller handle");
                false
            }
        }
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command: an invokable handler bound to a feature (§3.2).

use ciborium::value::Value;

use crate::device_model::context::RequestContext;
use crate::wire::StatusCode;

/// `(ctx, params) → (result, error)`.
pub trait CommandHandler: Send + Sync {
    fn invoke(&self, ctx: &RequestContext, params: Option<Value>) -> Result<Value, StatusCode>;
}

impl<F> CommandHandler for F
where
    F: Fn(&RequestContext, Option<Value>) -> Result<Value, StatusCode> + Send + Sync,
{
    fn invoke(&self, ctx: &RequestContext, params: Option<Value>) -> Result<Value, StatusCode> {
        self(ctx, params)
    }
}

pub struct Command {
    pub id: u8,
    pub name: String,
    pub handler: Box<dyn CommandHandler>,
}

impl Command {
    pub fn new(id: u8, name: impl Into<String>, handler: impl CommandHandler + 'static) -> Self {
        Self {
            id,
            name: name.into(),
            handler: Box::new(handler),
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

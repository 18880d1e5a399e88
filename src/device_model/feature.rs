// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Feature: a typed capability bundle owning attributes and commands
//! (§3.2), with an optional per-zone read hook (§9).

use std::collections::BTreeMap;
use std::sync::Arc;

use ciborium::value::Value;

use crate::device_model::attribute::{Access, Attribute};
use crate::device_model::command::Command;
use crate::device_model::context::RequestContext;
use crate::device_model::{ATTR_ATTRIBUTE_LIST, ATTR_COMMAND_LIST, ATTR_FEATURE_MAP};
use crate::error::Result;

/// Intercepts attribute reads before the stored value is returned. If it
/// yields a value, that value wins over the stored one (§3.2, §9).
///
/// Implemented by [`crate::features::energy_control::LimitResolver`] for
/// the per-zone limit attributes; the default (no hook) falls back to the
/// attribute's stored value.
pub trait AttributeReader: Send + Sync {
    fn read(&self, ctx: &RequestContext, attr_id: u16) -> Result<Option<Value>>;
}

pub struct Feature {
    pub feature_type: u8,
    pub revision: u16,
    pub feature_map: u32,
    pub attributes: BTreeMap<u16, Attribute>,
    pub commands: BTreeMap<u8, Command>,
    pub read_hook: Option<Arc<dyn AttributeReader>>,
}

impl Feature {
    pub fn new(feature_type: u8, revision: u16, feature_map: u32) -> Self {
        Self {
            feature_type,
            revision,
            feature_map,
            attributes: BTreeMap::new(),
            commands: BTreeMap::new(),
            read_hook: None,
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.insert(attribute.id, attribute);
        self
    }

    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.insert(command.id, command);
        self
    }

    pub fn with_read_hook(mut self, hook: Arc<dyn AttributeReader>) -> Self {
        self.read_hook = Some(hook);
        self
    }

    /// Read a single attribute honoring the caller-zone read hook (§4.8
    /// "Read"): if the hook yields a value for `attr_id`, it wins;
    /// otherwise fall back to the stored value. The three global
    /// attributes are synthesized and never delegate to the hook.
    pub fn read_attribute(&self, ctx: &RequestContext, attr_id: u16) -> Result<Option<Value>> {
        match attr_id {
            ATTR_FEATURE_MAP => return Ok(Some(Value::Integer((self.feature_map as i64).into()))),
            ATTR_ATTRIBUTE_LIST => {
                let ids: Vec<Value> = self
                    .attributes
                    .keys()
                    .map(|id| Value::Integer((*id as i64).into()))
                    .collect();
                return Ok(Some(Value::Array(ids)));
            }
            ATTR_COMMAND_LIST => {
                let ids: Vec<Value> = self
                    .commands
                    .keys()
                    .map(|id| Value::Integer((*id as i64).into()))
                    .collect();
                return Ok(Some(Value::Array(ids)));
            }
            _ => {}
        }

        if let Some(hook) = &self.read_hook {
            if let Some(value) = hook.read(ctx, attr_id)? {
                return Ok(Some(value));
            }
        }

        Ok(self.attributes.get(&attr_id).map(Attribute::value))
    }

    /// All non-global attribute ids, used by a Read with no `attrIds`
    /// filter (§4.8).
    pub fn all_attribute_ids(&self) -> Vec<u16> {
        self.attributes.keys().copied().collect()
    }

    pub fn is_writable(&self, attr_id: u16) -> bool {
        self.attributes
            .get(&attr_id)
            .map(|a| a.access.write)
            .unwrap_or(false)
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute: a typed, access-controlled value slot with a dirty flag for
//! subscription notification (§3.2).

use std::sync::atomic::{AtomicBool, Ordering};

use ciborium::value::Value;
use parking_lot::RwLock;

/// Access flags an attribute may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub read: bool,
    pub write: bool,
    pub subscribe: bool,
}

impl Access {
    pub const READ_ONLY: Access = Access {
        read: true,
        write: false,
        subscribe: true,
    };
    pub const READ_WRITE: Access = Access {
        read: true,
        write: true,
        subscribe: true,
    };
}

/// A constraint checked before a write is accepted.
#[derive(Debug, Clone)]
pub enum Constraint {
    None,
    IntRange { min: i64, max: i64 },
    OneOf(Vec<Value>),
}

impl Constraint {
    pub fn check(&self, value: &Value) -> bool {
        match self {
            Constraint::None => true,
            Constraint::IntRange { min, max } => match value {
                Value::Integer(i) => {
                    let i: i128 = (*i).into();
                    i >= *min as i128 && i <= *max as i128
                }
                _ => false,
            },
            Constraint::OneOf(values) => values.contains(value),
        }
    }
}

/// A single attribute slot owned by a [`crate::device_model::Feature`].
pub struct Attribute {
    pub id: u16,
    pub name: String,
    pub access: Access,
    pub nullable: bool,
    pub unit: Option<String>,
    pub constraint: Constraint,
    value: RwLock<Value>,
    dirty: AtomicBool,
}

impl Attribute {
    pub fn new(id: u16, name: impl Into<String>, access: Access, default: Value) -> Self {
        Self {
            id,
            name: name.into(),
            access,
            nullable: false,
            unit: None,
            constraint: Constraint::None,
            value: RwLock::new(default),
            dirty: AtomicBool::new(false),
        }
    }

    pub fn value(&self) -> Value {
        self.value.read().clone()
    }

    /// Set the stored value and mark the attribute dirty. Constraint
    /// checking is the caller's responsibility (the dispatch layer
    /// validates before applying, §4.8 "Write").
    pub fn set_value(&self, value: Value) {
        *self.value.write() = value;
        self.dirty.store(true, Ordering::Release);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Consume the dirty flag, returning whether it was set.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }
}

impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

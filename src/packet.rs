//! Composition root
//!
//! Generated entry modules call `packet(name, initializer)` and register each action
//! with `packet.action(name, fn)`. A registration whose key disagrees with the action's
//! own declared name is rejected so manifest keys and implementations stay in step.

use crate::action::Action;
use crate::error::PacketError;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Named group of registered actions.
#[derive(Clone)]
pub struct Packet {
    name: String,
    actions: BTreeMap<String, Action>,
}

impl Packet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register `action` under `name`. The action's declared name must equal `name`.
    pub fn action(&mut self, name: &str, action: Action) -> Result<(), PacketError> {
        if action.name() != name {
            return Err(PacketError::NameMismatch {
                expected: name.to_string(),
                actual: action.name().to_string(),
            });
        }
        debug!(packet = %self.name, action = name, "Registered action");
        self.actions.insert(name.to_string(), action);
        Ok(())
    }

    /// Replace a registered action with one derived from it.
    pub fn override_action(
        &mut self,
        name: &str,
        derive: impl FnOnce(&Action) -> Action,
    ) -> Result<(), PacketError> {
        let base = self.get(name).ok_or_else(|| PacketError::UnknownAction {
            packet: self.name.clone(),
            action: name.to_string(),
        })?;
        let derived = derive(base);
        self.action(name, derived)
    }

    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("name", &self.name)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

type Initializer = dyn Fn(&mut Packet) -> Result<(), PacketError> + Send + Sync;

/// A packet name plus the initializer that registers its actions.
#[derive(Clone)]
pub struct PacketDefinition {
    name: String,
    initializer: Arc<Initializer>,
}

/// Declare a packet.
pub fn packet(
    name: impl Into<String>,
    initializer: impl Fn(&mut Packet) -> Result<(), PacketError> + Send + Sync + 'static,
) -> PacketDefinition {
    PacketDefinition {
        name: name.into(),
        initializer: Arc::new(initializer),
    }
}

impl PacketDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the initializer against a fresh packet.
    pub fn build(&self) -> Result<Packet, PacketError> {
        let mut packet = Packet::new(self.name.clone());
        (self.initializer)(&mut packet)?;
        Ok(packet)
    }
}

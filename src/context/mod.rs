//! Context domain: the opaque context value, its builder, and the ambient slot.
//!
//! A [`Context`] is built once per top-level invocation by running service providers
//! against a [`ContextBuilder`], then frozen and shared by reference. Actions read it
//! through the ambient slot in [`slot`].

pub mod slot;

pub use slot::{current_context, has_context, run_with_context};

use crate::action::ContextBound;
use crate::error::{ActionError, PacketError};
use crate::packet::Packet;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Registers services into a context under construction.
pub trait ServiceProvider {
    fn register(&self, builder: &mut ContextBuilder);
}

struct ContextInner {
    services: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    packets: BTreeMap<String, Packet>,
}

/// Read-only context shared by every resumption of an operation.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl Context {
    /// Identity comparison: true when both handles refer to the same context.
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Service registered under type `T`.
    pub fn service<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.inner
            .services
            .get(&TypeId::of::<T>())
            .and_then(|service| Arc::clone(service).downcast::<T>().ok())
    }

    pub fn packet(&self, name: &str) -> Option<&Packet> {
        self.inner.packets.get(name)
    }

    pub fn packet_names(&self) -> impl Iterator<Item = &str> {
        self.inner.packets.keys().map(String::as_str)
    }

    /// Start a registered action with this context installed.
    pub fn dispatch(
        &self,
        packet: &str,
        action: &str,
        params: Value,
    ) -> Result<ContextBound, ActionError> {
        let packet = self
            .packet(packet)
            .ok_or_else(|| PacketError::UnknownPacket(packet.to_string()))?;
        let action = packet.get(action).ok_or_else(|| PacketError::UnknownAction {
            packet: packet.name().to_string(),
            action: action.to_string(),
        })?;
        run_with_context(self, || action.invoke(params))
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("services", &self.inner.services.len())
            .field("packets", &self.inner.packets.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Mutable context under construction.
#[derive(Default)]
pub struct ContextBuilder {
    services: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    packets: BTreeMap<String, Packet>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service, replacing any earlier service of the same type.
    pub fn provide<T: Any + Send + Sync>(&mut self, service: T) -> &mut Self {
        self.services.insert(TypeId::of::<T>(), Arc::new(service));
        self
    }

    /// Install a packet. Packet names are unique within a context.
    pub fn add_packet(&mut self, packet: Packet) -> Result<&mut Self, PacketError> {
        if self.packets.contains_key(packet.name()) {
            return Err(PacketError::DuplicatePacket(packet.name().to_string()));
        }
        self.packets.insert(packet.name().to_string(), packet);
        Ok(self)
    }

    pub fn build(self) -> Context {
        Context {
            inner: Arc::new(ContextInner {
                services: self.services,
                packets: self.packets,
            }),
        }
    }
}

/// Build a context by running each provider in order.
pub fn create_context(providers: &[&dyn ServiceProvider]) -> Context {
    let mut builder = ContextBuilder::new();
    for provider in providers {
        provider.register(&mut builder);
    }
    builder.build()
}

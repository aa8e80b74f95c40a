//! Opt-out aware usage telemetry.
//!
//! The opt-out flag lives in a [`SettingsStore`] under [`OPT_OUT_KEY`]. The
//! [`TelemetryContext`] is built once from the store and passed explicitly to
//! whatever records events.

pub mod store;

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

pub use store::{InMemorySettingsStore, JsonFileSettingsStore, SettingsError, SettingsStore};

pub const OPT_OUT_KEY: &str = "telemetry_opt_out";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryContext {
    pub session_id: Uuid,
    pub opted_out: bool,
}

impl TelemetryContext {
    /// Fresh session; the opt-out flag is read from `store`. Anything other
    /// than a stored `true` counts as opted in.
    pub fn load(store: &dyn SettingsStore) -> Result<Self, SettingsError> {
        let opted_out = matches!(store.get(OPT_OUT_KEY)?, Some(Value::Bool(true)));
        Ok(Self {
            session_id: Uuid::new_v4(),
            opted_out,
        })
    }

    pub fn set_opt_out(
        &mut self,
        store: &mut dyn SettingsStore,
        opted_out: bool,
    ) -> Result<(), SettingsError> {
        store.set(OPT_OUT_KEY, Value::Bool(opted_out))?;
        self.opted_out = opted_out;
        tracing::info!(opted_out, "telemetry preference saved");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryEvent {
    pub session_id: Uuid,
    pub name: String,
    pub properties: Map<String, Value>,
}

/// Buffers events for the host to ship.
#[derive(Debug)]
pub struct TelemetryClient {
    context: TelemetryContext,
    buffer: Vec<TelemetryEvent>,
}

impl TelemetryClient {
    pub fn new(context: TelemetryContext) -> Self {
        Self {
            context,
            buffer: Vec::new(),
        }
    }

    pub fn context(&self) -> &TelemetryContext {
        &self.context
    }

    /// Records `name`. Does nothing when the user opted out.
    pub fn track(&mut self, name: impl Into<String>, properties: Map<String, Value>) -> bool {
        if self.context.opted_out {
            return false;
        }
        let event = TelemetryEvent {
            session_id: self.context.session_id,
            name: name.into(),
            properties,
        };
        tracing::trace!(name = %event.name, "telemetry event");
        self.buffer.push(event);
        true
    }

    /// Opting out also drops anything still buffered.
    pub fn set_opt_out(
        &mut self,
        store: &mut dyn SettingsStore,
        opted_out: bool,
    ) -> Result<(), SettingsError> {
        self.context.set_opt_out(store, opted_out)?;
        if opted_out {
            self.buffer.clear();
        }
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn drain(&mut self) -> Vec<TelemetryEvent> {
        std::mem::take(&mut self.buffer)
    }
}

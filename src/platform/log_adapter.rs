use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::error::{already_initialized, DeliveryResult, InitResult};
use crate::event::{EventRecord, UserRecord, ViewRecord};
use crate::platform::adapter::PlatformAdapter;

const DEFAULT_TARGET: &str = "track_dispatch::log_adapter";

/// Development adapter that forwards every delivery to the `log` facade.
///
/// Useful as a local stand-in while wiring up real backends, and as the
/// reference implementation of the defensive state checks the contract asks
/// adapters to keep.
pub struct LogAdapter {
    key: String,
    target: Mutex<String>,
    initialized: AtomicBool,
    started: AtomicBool,
    max_parameters: Option<usize>,
}

impl LogAdapter {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            target: Mutex::new(DEFAULT_TARGET.to_string()),
            initialized: AtomicBool::new(false),
            started: AtomicBool::new(false),
            max_parameters: None,
        }
    }

    /// Declares a parameter ceiling, mimicking backends with one.
    pub fn with_max_parameters(mut self, max: usize) -> Self {
        self.max_parameters = Some(max);
        self
    }

    fn accepting(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    fn target(&self) -> String {
        self.target.lock().unwrap().clone()
    }
}

impl PlatformAdapter for LogAdapter {
    fn key(&self) -> &str {
        &self.key
    }

    fn initialize(&self, settings: &Map<String, Value>) -> InitResult<()> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(already_initialized(format!(
                "log adapter `{}` initialized twice",
                self.key
            )));
        }
        if let Some(Value::String(target)) = settings.get("target") {
            *self.target.lock().unwrap() = target.clone();
        }
        Ok(())
    }

    fn start(&self) {
        self.started.store(true, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.started.store(false, Ordering::SeqCst);
    }

    fn track_event(&self, record: &EventRecord) -> DeliveryResult {
        if !self.accepting() {
            return Ok(());
        }
        log::info!(
            target: &self.target(),
            "event {} params={} truncated={}",
            record.display_event(),
            record.parameters.len(),
            record.truncated
        );
        Ok(())
    }

    fn track_view(&self, record: &ViewRecord) -> DeliveryResult {
        if !self.accepting() {
            return Ok(());
        }
        log::info!(target: &self.target(), "{}", record.display_event());
        Ok(())
    }

    fn track_user(&self, record: &UserRecord) -> DeliveryResult {
        if !self.accepting() {
            return Ok(());
        }
        log::info!(
            target: &self.target(),
            "user {} email={}",
            record.identifier,
            record.email_or_unknown()
        );
        Ok(())
    }

    fn stop_tracking_user(&self, identifier: Option<&str>) -> DeliveryResult {
        if !self.accepting() {
            return Ok(());
        }
        log::info!(
            target: &self.target(),
            "stop tracking user {}",
            identifier.unwrap_or("<current>")
        );
        Ok(())
    }

    fn max_event_parameters(&self) -> Option<usize> {
        self.max_parameters
    }
}

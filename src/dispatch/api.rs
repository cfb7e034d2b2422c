use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;

use crate::error::DeliveryResult;
use crate::event::{is_scalar, EventRecord, UserRecord, ViewRecord};
use crate::platform::{ParameterPolicy, PlatformRegistry};

/// Reduces a platform UI object to the opaque title string the core tracks.
/// The core never inspects the handle itself.
pub trait ViewTitleResolver<H: ?Sized>: Send + Sync {
    fn title_for(&self, handle: &H) -> String;
}

/// The single entry point the application reports through.
///
/// Every `track_*` call returns `()` unconditionally: requests are validated
/// and normalized here, gated once on the global opt-out flag, then fanned
/// out to every started adapter. A failing or panicking adapter is logged
/// and skipped; the caller is never blocked on a backend and never sees an
/// error.
///
/// Holds a non-owning handle to the registry; cloning is cheap.
#[derive(Clone)]
pub struct Dispatcher {
    registry: PlatformRegistry,
}

impl Dispatcher {
    pub fn new(registry: PlatformRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    /// Reports one event. Parameters beyond an adapter's declared ceiling
    /// are truncated (default) or cause that one delivery to be skipped
    /// (strict policy), per adapter.
    pub fn track_event(&self, category: &str, name: &str, parameters: BTreeMap<String, Value>) {
        if self.registry.opt_out() {
            return;
        }
        if category.trim().is_empty() || name.trim().is_empty() {
            log::warn!("dropping event with empty category or name");
            return;
        }
        let record = EventRecord::new(category, name, sanitize_parameters(parameters));

        for (adapter, policy) in self.registry.started_snapshot() {
            let key = adapter.key();
            match adapter.max_event_parameters() {
                Some(max) if record.parameters.len() > max => match policy {
                    ParameterPolicy::Truncate => {
                        log::warn!(
                            "event `{}` exceeds {max} parameters for platform `{key}`; truncating",
                            record.display_event()
                        );
                        let truncated = record.truncated_to(max);
                        deliver(key, "event", || adapter.track_event(&truncated));
                    }
                    ParameterPolicy::Strict => {
                        log::warn!(
                            "event `{}` exceeds {max} parameters for platform `{key}`; skipping delivery",
                            record.display_event()
                        );
                    }
                },
                _ => deliver(key, "event", || adapter.track_event(&record)),
            }
        }
    }

    /// Reports a displayed screen by its opaque title.
    pub fn track_view(&self, title: &str) {
        if self.registry.opt_out() {
            return;
        }
        if title.trim().is_empty() {
            log::warn!("dropping view with empty title");
            return;
        }
        let record = ViewRecord::new(title);
        for (adapter, _) in self.registry.started_snapshot() {
            deliver(adapter.key(), "view", || adapter.track_view(&record));
        }
    }

    /// Reports a displayed screen from a UI handle, using the host's
    /// resolver to derive the title.
    pub fn track_view_handle<H: ?Sized>(&self, handle: &H, resolver: &dyn ViewTitleResolver<H>) {
        if self.registry.opt_out() {
            return;
        }
        self.track_view(&resolver.title_for(handle));
    }

    /// Attributes future events to the given user.
    pub fn track_user(&self, user: UserRecord) {
        if self.registry.opt_out() {
            return;
        }
        if user.identifier.trim().is_empty() {
            log::warn!("dropping user record with empty identifier");
            return;
        }
        let mut record = user;
        record.parameters = sanitize_parameters(std::mem::take(&mut record.parameters));
        for (adapter, _) in self.registry.started_snapshot() {
            deliver(adapter.key(), "user", || adapter.track_user(&record));
        }
    }

    /// Detaches the current (or the named) user identity.
    pub fn stop_tracking_user(&self, identifier: Option<&str>) {
        if self.registry.opt_out() {
            return;
        }
        for (adapter, _) in self.registry.started_snapshot() {
            deliver(adapter.key(), "stop-tracking-user", || {
                adapter.stop_tracking_user(identifier)
            });
        }
    }

    pub fn set_opt_out(&self, value: bool) {
        self.registry.set_opt_out(value);
    }

    pub fn opt_out(&self) -> bool {
        self.registry.opt_out()
    }

    pub fn start(&self) {
        self.registry.start_all();
    }

    pub fn stop(&self) {
        self.registry.stop_all();
    }
}

/// Drops parameter values backends cannot represent (null, arrays, objects).
fn sanitize_parameters(parameters: BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    let mut sanitized = BTreeMap::new();
    for (key, value) in parameters {
        if is_scalar(&value) {
            sanitized.insert(key, value);
        } else {
            log::warn!("dropping non-scalar parameter `{key}`");
        }
    }
    sanitized
}

/// Runs one adapter call, containing both delivery errors and panics so a
/// broken backend cannot affect the remaining adapters or the caller.
fn deliver<F>(key: &str, operation: &str, call: F)
where
    F: FnOnce() -> DeliveryResult,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            log::warn!("platform `{key}` failed to deliver {operation}: {err}");
        }
        Err(_) => {
            log::warn!("platform `{key}` panicked while delivering {operation}");
        }
    }
}

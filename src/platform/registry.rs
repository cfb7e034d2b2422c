use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::ConfigResolver;
use crate::platform::adapter::{ParameterPolicy, PlatformAdapter};

/// Where an adapter sits between registration and teardown.
///
/// `Disabled` is terminal: an adapter whose `initialize` failed is excluded
/// from every future transition and fan-out for the rest of the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Initialized,
    Started,
    Stopped,
    Disabled,
}

struct PlatformEntry {
    adapter: Arc<dyn PlatformAdapter>,
    lifecycle: Lifecycle,
    policy: ParameterPolicy,
}

/// Owns the registered adapters, their lifecycle states, and the global
/// opt-out flag.
///
/// All mutations run under one mutex so a dispatch never observes a
/// half-applied transition; the opt-out flag is additionally mirrored in an
/// atomic so the dispatcher's fast path reads it without locking. At every
/// instant, `Started` implies the user has not opted out.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct PlatformRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    entries: Mutex<Vec<PlatformEntry>>,
    opt_out: AtomicBool,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                entries: Mutex::new(Vec::new()),
                opt_out: AtomicBool::new(false),
            }),
        }
    }

    /// Registers an adapter and initializes it from its resolved settings.
    ///
    /// Initialization failure (including a missing settings payload)
    /// disables the adapter for the process lifetime and is reported once at
    /// warn level; it never propagates to the caller, and other
    /// registrations are unaffected. Duplicate keys are rejected.
    pub fn register(&self, adapter: Arc<dyn PlatformAdapter>, resolver: &dyn ConfigResolver) {
        let mut entries = self.inner.entries.lock().unwrap();
        let key = adapter.key().to_string();
        if entries.iter().any(|entry| entry.adapter.key() == key) {
            log::warn!("platform `{key}` is already registered; ignoring duplicate");
            return;
        }

        let (lifecycle, policy) = match resolver
            .resolve(&key)
            .and_then(|settings| adapter.initialize(&settings).map(|()| settings))
        {
            Ok(settings) => (Lifecycle::Initialized, ParameterPolicy::from_settings(&settings)),
            Err(err) => {
                log::warn!("platform `{key}` failed to initialize and is disabled: {err}");
                (Lifecycle::Disabled, ParameterPolicy::default())
            }
        };

        entries.push(PlatformEntry {
            adapter,
            lifecycle,
            policy,
        });
    }

    /// Current opt-out state; lock-free.
    pub fn opt_out(&self) -> bool {
        self.inner.opt_out.load(Ordering::SeqCst)
    }

    /// Flips the global opt-out flag and propagates the change: opting out
    /// stops every started adapter, opting back in starts every adapter that
    /// is initialized or stopped. Setting the current value again is a no-op
    /// with no adapter calls.
    ///
    /// The flag is flipped before the dependent transitions, both under the
    /// registry lock, so the dispatcher's lock-free read can only suppress
    /// an event during the toggle, never leak one.
    pub fn set_opt_out(&self, value: bool) {
        let mut entries = self.inner.entries.lock().unwrap();
        if self.inner.opt_out.load(Ordering::SeqCst) == value {
            return;
        }
        self.inner.opt_out.store(value, Ordering::SeqCst);
        if value {
            stop_started(&mut entries);
        } else {
            start_stopped(&mut entries);
        }
    }

    /// Starts every initialized or stopped adapter. No-op while opted out.
    pub fn start_all(&self) {
        let mut entries = self.inner.entries.lock().unwrap();
        if self.inner.opt_out.load(Ordering::SeqCst) {
            log::debug!("start_all ignored while opted out");
            return;
        }
        start_stopped(&mut entries);
    }

    /// Stops every started adapter (e.g. on application backgrounding).
    pub fn stop_all(&self) {
        let mut entries = self.inner.entries.lock().unwrap();
        stop_started(&mut entries);
    }

    /// Explicit teardown: stops every started adapter and drops all entries.
    pub fn shutdown(&self) {
        let mut entries = self.inner.entries.lock().unwrap();
        stop_started(&mut entries);
        entries.clear();
    }

    pub fn lifecycle_of(&self, key: &str) -> Option<Lifecycle> {
        self.inner
            .entries
            .lock()
            .unwrap()
            .iter()
            .find(|entry| entry.adapter.key() == key)
            .map(|entry| entry.lifecycle)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Started adapters with their policies, in registration order. Taken
    /// under the lock, iterated outside it, so no lock is held across
    /// adapter calls and registration during a fan-out cannot invalidate
    /// iteration.
    pub(crate) fn started_snapshot(&self) -> Vec<(Arc<dyn PlatformAdapter>, ParameterPolicy)> {
        self.inner
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.lifecycle == Lifecycle::Started)
            .map(|entry| (Arc::clone(&entry.adapter), entry.policy))
            .collect()
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn start_stopped(entries: &mut [PlatformEntry]) {
    for entry in entries {
        if matches!(entry.lifecycle, Lifecycle::Initialized | Lifecycle::Stopped) {
            entry.adapter.start();
            entry.lifecycle = Lifecycle::Started;
        }
    }
}

fn stop_started(entries: &mut [PlatformEntry]) {
    for entry in entries {
        if entry.lifecycle == Lifecycle::Started {
            entry.adapter.stop();
            entry.lifecycle = Lifecycle::Stopped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticConfigResolver;
    use crate::error::{backend_failure, DeliveryResult, InitResult};
    use crate::event::{EventRecord, UserRecord, ViewRecord};
    use serde_json::Map;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct ProbeAdapter {
        key: String,
        fail_init: bool,
        starts: AtomicUsize,
        stops: AtomicUsize,
    }

    impl ProbeAdapter {
        fn new(key: &str) -> Self {
            Self {
                key: key.to_string(),
                ..Default::default()
            }
        }

        fn failing(key: &str) -> Self {
            Self {
                key: key.to_string(),
                fail_init: true,
                ..Default::default()
            }
        }
    }

    impl PlatformAdapter for ProbeAdapter {
        fn key(&self) -> &str {
            &self.key
        }

        fn initialize(&self, _settings: &Map<String, serde_json::Value>) -> InitResult<()> {
            if self.fail_init {
                return Err(backend_failure("bad credentials"));
            }
            Ok(())
        }

        fn start(&self) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }

        fn track_event(&self, _record: &EventRecord) -> DeliveryResult {
            Ok(())
        }

        fn track_view(&self, _record: &ViewRecord) -> DeliveryResult {
            Ok(())
        }

        fn track_user(&self, _record: &UserRecord) -> DeliveryResult {
            Ok(())
        }

        fn stop_tracking_user(&self, _identifier: Option<&str>) -> DeliveryResult {
            Ok(())
        }
    }

    fn resolver_for(keys: &[&str]) -> StaticConfigResolver {
        let mut resolver = StaticConfigResolver::new();
        for key in keys {
            resolver = resolver.with_platform(*key, Map::new());
        }
        resolver
    }

    #[test]
    fn register_initializes_and_start_all_starts() {
        let registry = PlatformRegistry::new();
        let adapter = Arc::new(ProbeAdapter::new("a"));
        registry.register(adapter.clone(), &resolver_for(&["a"]));
        assert_eq!(registry.lifecycle_of("a"), Some(Lifecycle::Initialized));

        registry.start_all();
        assert_eq!(registry.lifecycle_of("a"), Some(Lifecycle::Started));
        assert_eq!(adapter.starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_initialize_disables_permanently() {
        let registry = PlatformRegistry::new();
        let adapter = Arc::new(ProbeAdapter::failing("broken"));
        registry.register(adapter.clone(), &resolver_for(&["broken"]));
        assert_eq!(registry.lifecycle_of("broken"), Some(Lifecycle::Disabled));

        registry.start_all();
        registry.set_opt_out(true);
        registry.set_opt_out(false);
        registry.stop_all();
        assert_eq!(registry.lifecycle_of("broken"), Some(Lifecycle::Disabled));
        assert_eq!(adapter.starts.load(Ordering::SeqCst), 0);
        assert_eq!(adapter.stops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_settings_disable_the_adapter() {
        let registry = PlatformRegistry::new();
        let adapter = Arc::new(ProbeAdapter::new("unconfigured"));
        registry.register(adapter, &StaticConfigResolver::new());
        assert_eq!(
            registry.lifecycle_of("unconfigured"),
            Some(Lifecycle::Disabled)
        );
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let registry = PlatformRegistry::new();
        registry.register(Arc::new(ProbeAdapter::new("a")), &resolver_for(&["a"]));
        registry.register(Arc::new(ProbeAdapter::new("a")), &resolver_for(&["a"]));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn opt_out_stops_and_opt_in_restarts() {
        let registry = PlatformRegistry::new();
        let adapter = Arc::new(ProbeAdapter::new("a"));
        registry.register(adapter.clone(), &resolver_for(&["a"]));
        registry.start_all();

        registry.set_opt_out(true);
        assert!(registry.opt_out());
        assert_eq!(registry.lifecycle_of("a"), Some(Lifecycle::Stopped));
        assert_eq!(adapter.stops.load(Ordering::SeqCst), 1);

        registry.set_opt_out(false);
        assert_eq!(registry.lifecycle_of("a"), Some(Lifecycle::Started));
        assert_eq!(adapter.starts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn set_opt_out_is_idempotent() {
        let registry = PlatformRegistry::new();
        let adapter = Arc::new(ProbeAdapter::new("a"));
        registry.register(adapter.clone(), &resolver_for(&["a"]));
        registry.start_all();

        registry.set_opt_out(true);
        registry.set_opt_out(true);
        assert_eq!(adapter.stops.load(Ordering::SeqCst), 1);

        registry.set_opt_out(false);
        registry.set_opt_out(false);
        assert_eq!(adapter.starts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn start_all_is_a_no_op_while_opted_out() {
        let registry = PlatformRegistry::new();
        let adapter = Arc::new(ProbeAdapter::new("a"));
        registry.register(adapter.clone(), &resolver_for(&["a"]));

        registry.set_opt_out(true);
        registry.start_all();
        assert_eq!(registry.lifecycle_of("a"), Some(Lifecycle::Initialized));
        assert_eq!(adapter.starts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn shutdown_stops_and_clears() {
        let registry = PlatformRegistry::new();
        let adapter = Arc::new(ProbeAdapter::new("a"));
        registry.register(adapter.clone(), &resolver_for(&["a"]));
        registry.start_all();

        registry.shutdown();
        assert!(registry.is_empty());
        assert_eq!(adapter.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn snapshot_contains_only_started_entries_in_order() {
        let registry = PlatformRegistry::new();
        registry.register(Arc::new(ProbeAdapter::new("first")), &resolver_for(&["first"]));
        registry.register(
            Arc::new(ProbeAdapter::failing("second")),
            &resolver_for(&["second"]),
        );
        registry.register(Arc::new(ProbeAdapter::new("third")), &resolver_for(&["third"]));
        registry.start_all();

        let keys: Vec<_> = registry
            .started_snapshot()
            .iter()
            .map(|(adapter, _)| adapter.key().to_string())
            .collect();
        assert_eq!(keys, vec!["first", "third"]);
    }
}

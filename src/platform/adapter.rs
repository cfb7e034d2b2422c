use serde_json::{Map, Value};

use crate::error::{DeliveryResult, InitResult};
use crate::event::{EventRecord, UserRecord, ViewRecord};

/// Settings key selecting the over-limit policy for one adapter.
pub const STRICT_PARAMETERS_SETTING: &str = "strict_parameters";

/// What to do when an event carries more parameters than the adapter's
/// declared ceiling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParameterPolicy {
    /// Drop the extra parameters (stable key order) and flag the record as
    /// truncated. The default.
    #[default]
    Truncate,
    /// Skip this adapter for this one delivery; other adapters still
    /// receive the full record.
    Strict,
}

impl ParameterPolicy {
    /// Reads the policy from an adapter's resolved settings. Absent or
    /// non-boolean values mean [`ParameterPolicy::Truncate`].
    pub fn from_settings(settings: &Map<String, Value>) -> Self {
        match settings.get(STRICT_PARAMETERS_SETTING) {
            Some(Value::Bool(true)) => ParameterPolicy::Strict,
            _ => ParameterPolicy::Truncate,
        }
    }
}

/// The capability contract every analytics backend implements.
///
/// Adapters are driven exclusively through the [`PlatformRegistry`]: the
/// application never calls these methods directly. The registry guarantees
/// `initialize` runs at most once and that `track_*` only arrives while the
/// adapter is started and the user has not opted out, but adapters must
/// defensively re-check their own state, since direct misuse is a
/// programming error the contract tolerates gracefully.
///
/// `track_*` failures are swallowed and logged by the dispatcher; they never
/// reach application code.
///
/// [`PlatformRegistry`]: crate::platform::PlatformRegistry
pub trait PlatformAdapter: Send + Sync {
    /// Unique backend identifier, immutable after registration. Doubles as
    /// the lookup key for the configuration resolver.
    fn key(&self) -> &str;

    /// One-time setup from the resolved settings payload. A second call is
    /// a programming error and fails fast with
    /// `platform/already-initialized`.
    fn initialize(&self, settings: &Map<String, Value>) -> InitResult<()>;

    /// Begin accepting `track_*` calls.
    fn start(&self);

    /// Cease accepting `track_*` calls. Safe to call when never started.
    fn stop(&self);

    fn track_event(&self, record: &EventRecord) -> DeliveryResult;

    fn track_view(&self, record: &ViewRecord) -> DeliveryResult;

    fn track_user(&self, record: &UserRecord) -> DeliveryResult;

    /// Detach the current (or the named) user identity from future events.
    fn stop_tracking_user(&self, identifier: Option<&str>) -> DeliveryResult;

    /// Backend-specific ceiling on event parameters, enforced centrally by
    /// the dispatcher. `None` means unlimited.
    fn max_event_parameters(&self) -> Option<usize> {
        None
    }
}

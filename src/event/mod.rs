use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Sentinel reported to backends that require a non-empty email address when
/// the caller did not supply one.
pub const UNKNOWN_EMAIL: &str = "unknown-email";

/// One trackable fact: a category/name pair plus optional scalar parameters.
///
/// Records are immutable value objects; the dispatcher clones them per
/// adapter when a ceiling policy requires truncation, so no adapter ever
/// observes another adapter's view of the event.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventRecord {
    pub category: String,
    pub name: String,
    pub parameters: BTreeMap<String, Value>,
    /// Set when the ceiling policy dropped parameters for this delivery.
    pub truncated: bool,
}

impl EventRecord {
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        parameters: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            parameters,
            truncated: false,
        }
    }

    /// The normalized flat form used by backends without structured event
    /// support: `"{category} - {name}"`.
    pub fn display_event(&self) -> String {
        format!("{} - {}", self.category, self.name)
    }

    /// Copy of this record keeping only the first `max` parameters in key
    /// order, flagged as truncated. Returns an unflagged clone when the
    /// record already fits.
    pub fn truncated_to(&self, max: usize) -> Self {
        if self.parameters.len() <= max {
            return self.clone();
        }
        let parameters = self
            .parameters
            .iter()
            .take(max)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self {
            category: self.category.clone(),
            name: self.name.clone(),
            parameters,
            truncated: true,
        }
    }
}

/// A displayed screen, reduced by the caller (or a [`ViewTitleResolver`])
/// to an opaque title string.
///
/// [`ViewTitleResolver`]: crate::dispatch::ViewTitleResolver
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViewRecord {
    pub title: String,
}

impl ViewRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Normalized flat form: `"TrackView - {title}"`.
    pub fn display_event(&self) -> String {
        format!("TrackView - {}", self.title)
    }
}

/// Identity of the user events should be attributed to.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserRecord {
    pub identifier: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub parameters: BTreeMap<String, Value>,
}

impl UserRecord {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            email: None,
            full_name: None,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    pub fn with_parameters(mut self, parameters: BTreeMap<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    /// The email address, or the [`UNKNOWN_EMAIL`] sentinel for backends
    /// that cannot represent an absent value.
    pub fn email_or_unknown(&self) -> &str {
        self.email.as_deref().unwrap_or(UNKNOWN_EMAIL)
    }
}

/// Whether a parameter value is deliverable. Backends only understand
/// scalars; arrays, objects and nulls are a malformed-value condition.
pub fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

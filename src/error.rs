use std::fmt::{Display, Formatter};

/// Why a platform adapter failed to come up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitErrorCode {
    MissingSettings,
    InvalidSettings,
    AlreadyInitialized,
    Backend,
}

impl InitErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitErrorCode::MissingSettings => "platform/missing-settings",
            InitErrorCode::InvalidSettings => "platform/invalid-settings",
            InitErrorCode::AlreadyInitialized => "platform/already-initialized",
            InitErrorCode::Backend => "platform/backend",
        }
    }
}

/// The only failure the core ever reports: an adapter could not initialize.
///
/// A registered adapter that returns this from `initialize` is disabled for
/// the rest of the process; the error is logged once and never reaches the
/// application's control flow.
#[derive(Clone, Debug)]
pub struct InitError {
    pub code: InitErrorCode,
    message: String,
}

impl InitError {
    pub fn new(code: InitErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl Display for InitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for InitError {}

pub type InitResult<T> = Result<T, InitError>;

pub fn missing_settings(message: impl Into<String>) -> InitError {
    InitError::new(InitErrorCode::MissingSettings, message)
}

pub fn invalid_settings(message: impl Into<String>) -> InitError {
    InitError::new(InitErrorCode::InvalidSettings, message)
}

pub fn already_initialized(message: impl Into<String>) -> InitError {
    InitError::new(InitErrorCode::AlreadyInitialized, message)
}

pub fn backend_failure(message: impl Into<String>) -> InitError {
    InitError::new(InitErrorCode::Backend, message)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryErrorCode {
    Backend,
    Network,
}

impl DeliveryErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryErrorCode::Backend => "delivery/backend",
            DeliveryErrorCode::Network => "delivery/network",
        }
    }
}

/// A single delivery failed inside an adapter.
///
/// Swallowed at the fan-out boundary: the dispatcher logs it and moves on to
/// the next adapter. There is no retry queue; backends that want retry
/// implement it internally.
#[derive(Clone, Debug)]
pub struct DeliveryError {
    pub code: DeliveryErrorCode,
    message: String,
}

impl DeliveryError {
    pub fn new(code: DeliveryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl Display for DeliveryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for DeliveryError {}

pub type DeliveryResult = Result<(), DeliveryError>;

pub fn backend_delivery(message: impl Into<String>) -> DeliveryError {
    DeliveryError::new(DeliveryErrorCode::Backend, message)
}

pub fn network_delivery(message: impl Into<String>) -> DeliveryError {
    DeliveryError::new(DeliveryErrorCode::Network, message)
}

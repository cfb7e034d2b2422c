//! Fan-out analytics event dispatcher.
//!
//! One [`Dispatcher`] is the only thing the application talks to: it
//! validates and normalizes each report, applies the global opt-out gate
//! once, and fans the report out to every started backend adapter held by
//! the [`PlatformRegistry`]. Adapters implement the [`PlatformAdapter`]
//! contract; a broken or misconfigured backend is isolated, never visible
//! to application code.
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::Map;
//! use track_dispatch::config::StaticConfigResolver;
//! use track_dispatch::dispatch::Dispatcher;
//! use track_dispatch::platform::{LogAdapter, PlatformRegistry};
//!
//! let resolver = StaticConfigResolver::new().with_platform("console", Map::new());
//! let registry = PlatformRegistry::new();
//! registry.register(Arc::new(LogAdapter::new("console")), &resolver);
//!
//! let dispatcher = Dispatcher::new(registry);
//! dispatcher.start();
//! dispatcher.track_event("Login", "Success", Default::default());
//! ```
//!
//! [`Dispatcher`]: crate::dispatch::Dispatcher
//! [`PlatformRegistry`]: crate::platform::PlatformRegistry
//! [`PlatformAdapter`]: crate::platform::PlatformAdapter

pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod platform;

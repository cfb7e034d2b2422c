mod adapter;
mod log_adapter;
mod registry;

pub use adapter::{ParameterPolicy, PlatformAdapter, STRICT_PARAMETERS_SETTING};
pub use log_adapter::LogAdapter;
pub use registry::{Lifecycle, PlatformRegistry};

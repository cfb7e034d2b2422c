mod api;

pub use api::{Dispatcher, ViewTitleResolver};

pub mod client;
pub mod contents;
pub mod error;
#[cfg(feature = "api")]
pub mod http;
pub mod payload;
pub mod prompt;
pub mod selection;
pub mod series;
pub mod snapshot;
pub mod stage;

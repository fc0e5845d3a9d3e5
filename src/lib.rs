//! Reference-range store for laboratory test parameters.
//!
//! The desktop UI runs `labrefd` as a sidecar and talks to it over
//! line-delimited JSON (see [`ipc`]). The storage and parsing layers are also
//! usable directly.

pub mod backup;
pub mod catalog;
pub mod db;
pub mod error;
pub mod import;
pub mod ipc;
pub mod model;
pub mod range;
pub mod settings;
pub mod store;
pub mod validate;

pub use error::{StoreError, StoreResult};
pub use import::{parse_json_import, ImportKeys, ImportOutcome, SkippedEntry};
pub use model::{Parameter, ParameterFields};
pub use range::{parse_range, ParsedRange};
pub use store::{ApplySummary, ParameterStore};
pub use validate::validate_fields;

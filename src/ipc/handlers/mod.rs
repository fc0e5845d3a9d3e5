pub mod backup;
pub mod core;
pub mod import;
pub mod parameters;
pub mod settings;

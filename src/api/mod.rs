// HTTP APIs

pub mod settings;

pub use settings::{create_settings_router, SettingsAppState};

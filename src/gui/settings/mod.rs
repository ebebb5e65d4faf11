pub mod data;
mod modal;

pub use data::SettingsData;
pub use modal::SettingsModal;

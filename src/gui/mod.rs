mod actions;
mod add_word;
mod app;
mod auth_view;
mod backup_view;
mod error_modal;
mod review;
pub mod settings;
mod table;
mod top_bar;

pub use app::VocabApp;
pub use settings::SettingsData;

use crate::gui::{
    error_modal::ErrorModal,
    settings::SettingsModal,
};

pub struct Modals {
    pub error: ErrorModal,
    pub settings: SettingsModal,
}

impl Default for Modals {
    fn default() -> Self {
        Self { error: ErrorModal::new(), settings: SettingsModal::new() }
    }
}

use eframe::egui::{
    self,
    containers,
};

use super::actions::{
    ActionQueue,
    UiAction,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    AddWords,
    Review,
    Vocabulary,
    Backup,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::AddWords, Tab::Review, Tab::Vocabulary, Tab::Backup];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::AddWords => "Add Words",
            Tab::Review => "Review",
            Tab::Vocabulary => "Vocabulary",
            Tab::Backup => "Backup",
        }
    }
}

pub struct TopBar;

impl TopBar {
    pub fn show(ctx: &egui::Context, current: Tab, email: &str, actions: &mut ActionQueue) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            containers::menu::Bar::new().ui(ui, |ui| {
                egui::widgets::global_theme_preference_switch(ui);
                ui.separator();

                for tab in Tab::ALL {
                    if ui.selectable_label(current == tab, tab.label()).clicked() && current != tab
                    {
                        actions.push(UiAction::SelectTab(tab));
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Sign Out").clicked() {
                        actions.push(UiAction::SignOut);
                    }
                    if ui.button("Settings").clicked() {
                        actions.push(UiAction::OpenSettings);
                    }
                    ui.small(email);
                });
            });
        });
    }
}

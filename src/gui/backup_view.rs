use eframe::egui;

use super::actions::{
    ActionQueue,
    UiAction,
};
use crate::core::NewVocabularyEntry;

pub struct BackupView {
    pending_import: Option<Vec<NewVocabularyEntry>>,
    importing: bool,
    status: Option<String>,
}

impl BackupView {
    pub fn new() -> Self {
        Self { pending_import: None, importing: false, status: None }
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    /// Holds parsed items until the user confirms the import.
    pub fn confirm_import(&mut self, items: Vec<NewVocabularyEntry>) {
        self.pending_import = Some(items);
    }

    pub fn import_started(&mut self) {
        self.importing = true;
        self.status = None;
    }

    pub fn import_finished(&mut self, status: impl Into<String>) {
        self.importing = false;
        self.status = Some(status.into());
    }

    pub fn show(&mut self, ui: &mut egui::Ui, entry_count: usize, actions: &mut ActionQueue) {
        ui.heading("Backup");
        ui.add_space(8.0);

        ui.group(|ui| {
            ui.strong("Export");
            ui.label(format!("Save all {} words to a JSON file.", entry_count));
            if ui.add_enabled(entry_count > 0, egui::Button::new("Export Backup")).clicked() {
                actions.push(UiAction::ExportBackup);
            }
        });

        ui.add_space(12.0);

        ui.group(|ui| {
            ui.strong("Import");
            ui.label("Restore words from a previously exported backup file.");
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::YELLOW, "⚠");
                ui.label("Importing the same file twice creates duplicate words.");
            });
            let label = if self.importing { "Importing..." } else { "Import Backup" };
            if ui.add_enabled(!self.importing, egui::Button::new(label)).clicked() {
                actions.push(UiAction::PickImportFile);
            }
        });

        if let Some(status) = &self.status {
            ui.add_space(12.0);
            ui.label(status);
        }

        self.show_confirmation(ui.ctx(), actions);
    }

    fn show_confirmation(&mut self, ctx: &egui::Context, actions: &mut ActionQueue) {
        let Some(items) = &self.pending_import else {
            return;
        };

        let mut confirmed = false;
        let modal = egui::Modal::new(egui::Id::new("import_confirm_modal")).show(ctx, |ui| {
            ui.set_width(320.0);
            ui.label(format!("Found {} items. Import them?", items.len()));
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui.button("Import").clicked() {
                    confirmed = true;
                    ui.close();
                }
                if ui.button("Cancel").clicked() {
                    ui.close();
                }
            });
        });

        if modal.should_close() {
            if let Some(items) = self.pending_import.take() {
                if confirmed {
                    actions.push(UiAction::ConfirmImport(items));
                }
            }
        }
    }
}

impl Default for BackupView {
    fn default() -> Self {
        Self::new()
    }
}

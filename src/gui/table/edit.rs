use eframe::egui;

use crate::{
    core::{
        EntryId,
        EntryPatch,
        VocabularyEntry,
    },
    gui::{
        actions::{
            ActionQueue,
            UiAction,
        },
        add_word::part_of_speech_combo,
    },
};

pub struct EditEntryModal {
    draft: Option<VocabularyEntry>,
}

impl EditEntryModal {
    pub fn new() -> Self {
        Self { draft: None }
    }

    pub fn open(&mut self, entry: &VocabularyEntry) {
        self.draft = Some(entry.clone());
    }

    pub fn show(&mut self, ctx: &egui::Context, actions: &mut ActionQueue) {
        let Some(draft) = &mut self.draft else {
            return;
        };

        let modal = egui::Modal::new(egui::Id::new("edit_entry_modal")).show(ctx, |ui| {
            ui.set_width(420.0);
            ui.heading("Edit Word");
            ui.add_space(8.0);

            egui::Grid::new("edit_entry_grid").num_columns(2).spacing([12.0, 8.0]).show(ui, |ui| {
                ui.label("Word");
                ui.text_edit_singleline(&mut draft.term);
                ui.end_row();

                ui.label("Meaning");
                ui.add(egui::TextEdit::multiline(&mut draft.definition).desired_rows(3));
                ui.end_row();

                ui.label("Translation");
                ui.text_edit_singleline(&mut draft.translation);
                ui.end_row();

                ui.label("Part of speech");
                part_of_speech_combo(ui, "edit_entry_pos", &mut draft.part_of_speech);
                ui.end_row();

                ui.label("Notes");
                ui.add(egui::TextEdit::multiline(&mut draft.notes).desired_rows(2));
                ui.end_row();
            });

            ui.add_space(10.0);

            ui.horizontal(|ui| {
                let can_save = !draft.term.trim().is_empty();
                if ui.add_enabled(can_save, egui::Button::new("Save")).clicked() {
                    actions.push(UiAction::UpdateEntry {
                        id: draft.id.clone(),
                        patch: EntryPatch::edited_fields(draft),
                    });
                    ui.close();
                }
                if ui.button("Cancel").clicked() {
                    ui.close();
                }
            });
        });

        if modal.should_close() {
            self.draft = None;
        }
    }
}

/// Asks before an entry is removed for good.
pub struct DeleteConfirmation {
    target: Option<(EntryId, String)>,
}

impl DeleteConfirmation {
    pub fn new() -> Self {
        Self { target: None }
    }

    pub fn open(&mut self, entry: &VocabularyEntry) {
        self.target = Some((entry.id.clone(), entry.term.clone()));
    }

    pub fn show(&mut self, ctx: &egui::Context, actions: &mut ActionQueue) {
        let Some((id, term)) = &self.target else {
            return;
        };

        let modal = egui::Modal::new(egui::Id::new("delete_entry_modal")).show(ctx, |ui| {
            ui.set_width(320.0);
            ui.label(format!("Delete \"{}\"? This cannot be undone.", term));
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui.button("Delete").clicked() {
                    actions.push(UiAction::DeleteEntry(id.clone()));
                    ui.close();
                }
                if ui.button("Cancel").clicked() {
                    ui.close();
                }
            });
        });

        if modal.should_close() {
            self.target = None;
        }
    }
}

mod edit;
pub mod filter;

use eframe::egui;
use egui_extras::{
    Column,
    TableBuilder,
};
use filter::WordFilter;

use self::edit::{
    DeleteConfirmation,
    EditEntryModal,
};
use super::actions::{
    ActionQueue,
    UiAction,
};
use crate::core::{
    models::PARTS_OF_SPEECH,
    VocabularyEntry,
};

pub struct VocabularyTable {
    filter: WordFilter,
    edit_modal: EditEntryModal,
    delete_confirmation: DeleteConfirmation,
}

impl VocabularyTable {
    pub fn new() -> Self {
        Self {
            filter: WordFilter::default(),
            edit_modal: EditEntryModal::new(),
            delete_confirmation: DeleteConfirmation::new(),
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, entries: &[VocabularyEntry], actions: &mut ActionQueue) {
        self.filter_bar(ui);
        ui.add_space(6.0);

        let visible = self.filter.visible_indices(entries);
        ui.label(format!("{} of {} words", visible.len(), entries.len()));
        ui.add_space(4.0);

        let text_height = egui::TextStyle::Body
            .resolve(ui.style())
            .size
            .max(ui.spacing().interact_size.y);

        TableBuilder::new(ui)
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::exact(28.0))
            .column(Column::auto().at_least(100.0))
            .column(Column::remainder().at_least(160.0).clip(true))
            .column(Column::auto().at_least(80.0))
            .column(Column::auto().at_least(70.0))
            .column(Column::auto().at_least(110.0))
            .header(24.0, |mut header| {
                header.col(|ui| {
                    ui.strong("★");
                });
                header.col(|ui| {
                    ui.strong("Word");
                });
                header.col(|ui| {
                    ui.strong("Meaning");
                });
                header.col(|ui| {
                    ui.strong("Translation");
                });
                header.col(|ui| {
                    ui.strong("Type");
                });
                header.col(|ui| {
                    ui.strong("Actions");
                });
            })
            .body(|body| {
                body.rows(text_height, visible.len(), |mut row| {
                    let entry = &entries[visible[row.index()]];

                    row.col(|ui| {
                        let star = if entry.favorite { "★" } else { "☆" };
                        if ui.small_button(star).clicked() {
                            actions.push(UiAction::SetFavorite {
                                id: entry.id.clone(),
                                favorite: !entry.favorite,
                            });
                        }
                    });
                    row.col(|ui| {
                        ui.strong(&entry.term);
                    });
                    row.col(|ui| {
                        ui.label(&entry.definition).on_hover_text(&entry.notes);
                    });
                    row.col(|ui| {
                        ui.label(&entry.translation);
                    });
                    row.col(|ui| {
                        ui.label(&entry.part_of_speech);
                    });
                    row.col(|ui| {
                        if ui.small_button("Edit").clicked() {
                            self.edit_modal.open(entry);
                        }
                        if ui.small_button("Delete").clicked() {
                            self.delete_confirmation.open(entry);
                        }
                    });
                });
            });

        self.edit_modal.show(ui.ctx(), actions);
        self.delete_confirmation.show(ui.ctx(), actions);
    }

    fn filter_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Search");
            ui.add(
                egui::TextEdit::singleline(&mut self.filter.search)
                    .hint_text("word, meaning or translation")
                    .desired_width(240.0),
            );

            let selected =
                self.filter.part_of_speech.clone().unwrap_or_else(|| "All Types".to_string());
            egui::ComboBox::from_id_salt("table_pos_filter").selected_text(selected).show_ui(
                ui,
                |ui| {
                    ui.selectable_value(&mut self.filter.part_of_speech, None, "All Types");
                    for pos in PARTS_OF_SPEECH {
                        ui.selectable_value(
                            &mut self.filter.part_of_speech,
                            Some(pos.to_string()),
                            *pos,
                        );
                    }
                },
            );

            if !self.filter.search.is_empty() && ui.small_button("Clear").clicked() {
                self.filter.search.clear();
            }
        });
    }
}

impl Default for VocabularyTable {
    fn default() -> Self {
        Self::new()
    }
}

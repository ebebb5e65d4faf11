use eframe::egui;
use tracing::{
    debug,
    info,
    warn,
};

use super::actions::{
    ActionQueue,
    UiAction,
};
use crate::{
    core::{
        models::PARTS_OF_SPEECH,
        utils::trimmed,
        NewVocabularyEntry,
        TaskError,
        TemporaryWord,
    },
    dictionary::DefinitionHit,
};

pub(super) fn part_of_speech_combo(ui: &mut egui::Ui, id_salt: &str, value: &mut String) {
    egui::ComboBox::from_id_salt(id_salt).selected_text(value.as_str()).show_ui(ui, |ui| {
        for pos in PARTS_OF_SPEECH {
            ui.selectable_value(value, pos.to_string(), *pos);
        }
    });
}

/// Entry form plus the list of words parked for later.
pub struct AddWordView {
    form: NewVocabularyEntry,
    validation_error: Option<String>,
    saving: bool,
    fetching: bool,
}

impl AddWordView {
    pub fn new() -> Self {
        Self { form: NewVocabularyEntry::default(), validation_error: None, saving: false, fetching: false }
    }

    pub fn set_term(&mut self, term: &str) {
        self.form.term = term.to_string();
    }

    pub fn lookup_started(&mut self) {
        self.fetching = true;
    }

    /// Fills meaning and part of speech from a lookup, unless the term was edited since.
    pub fn apply_definition(
        &mut self,
        word: &str,
        result: Result<Option<DefinitionHit>, TaskError>,
    ) {
        self.fetching = false;
        if trimmed(&self.form.term) != trimmed(word) {
            debug!("Ignoring definition for '{}', the term has changed", word);
            return;
        }
        match result {
            Ok(Some(hit)) => {
                self.form.definition = hit.definition;
                self.form.part_of_speech = hit.part_of_speech;
            }
            Ok(None) => info!("No dictionary definition found for '{}'", word),
            Err(e) => warn!("Dictionary lookup for '{}' failed: {}", word, e),
        }
    }

    pub fn save_started(&mut self) {
        self.saving = true;
    }

    /// Clears the whole form after a saved entry.
    pub fn entry_saved(&mut self, saved: bool) {
        self.saving = false;
        if saved {
            self.form = NewVocabularyEntry::default();
        }
    }

    /// Clears only the term after it was parked as a temporary word.
    pub fn temporary_word_saved(&mut self, saved: bool) {
        self.saving = false;
        if saved {
            self.form.term.clear();
        }
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        temporary_words: &[TemporaryWord],
        actions: &mut ActionQueue,
    ) {
        ui.heading("Add a Word");
        ui.add_space(8.0);

        egui::Grid::new("add_word_grid").num_columns(2).spacing([12.0, 8.0]).show(ui, |ui| {
            ui.label("Word");
            ui.horizontal(|ui| {
                ui.add(egui::TextEdit::singleline(&mut self.form.term).desired_width(240.0));
                let term = trimmed(&self.form.term);
                let label = if self.fetching { "Fetching..." } else { "Auto-fetch definition" };
                if ui.add_enabled(!term.is_empty() && !self.fetching, egui::Button::new(label)).clicked()
                {
                    actions.push(UiAction::LookupDefinition(term));
                }
            });
            ui.end_row();

            ui.label("Meaning");
            ui.add(
                egui::TextEdit::multiline(&mut self.form.definition)
                    .desired_rows(3)
                    .desired_width(360.0),
            );
            ui.end_row();

            ui.label("Translation");
            ui.add(egui::TextEdit::singleline(&mut self.form.translation).desired_width(360.0));
            ui.end_row();

            ui.label("Part of speech");
            part_of_speech_combo(ui, "add_word_pos", &mut self.form.part_of_speech);
            ui.end_row();

            ui.label("Notes");
            ui.add(
                egui::TextEdit::multiline(&mut self.form.notes)
                    .desired_rows(2)
                    .desired_width(360.0),
            );
            ui.end_row();
        });

        ui.add_space(8.0);

        ui.horizontal(|ui| {
            if ui.add_enabled(!self.saving, egui::Button::new("Save Word")).clicked() {
                match self.form.validate() {
                    Ok(()) => {
                        self.validation_error = None;
                        let mut entry = self.form.clone();
                        entry.term = trimmed(&entry.term);
                        actions.push(UiAction::AddEntry(entry));
                    }
                    Err(e) => self.validation_error = Some(e.to_string()),
                }
            }

            let term = trimmed(&self.form.term);
            if ui.add_enabled(!self.saving && !term.is_empty(), egui::Button::new("Save Temp")).clicked()
            {
                self.validation_error = None;
                actions.push(UiAction::AddTemporaryWord(term));
            }
        });

        if let Some(error) = &self.validation_error {
            ui.colored_label(egui::Color32::RED, error);
        }

        ui.add_space(16.0);
        ui.separator();
        ui.heading("Temporary Words");

        if temporary_words.is_empty() {
            ui.weak("Nothing saved for later.");
            return;
        }

        egui::ScrollArea::vertical().id_salt("temporary_words").show(ui, |ui| {
            for word in temporary_words {
                ui.horizontal(|ui| {
                    ui.label(&word.word);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("Delete").clicked() {
                            actions.push(UiAction::DeleteTemporaryWord(word.id.clone()));
                        }
                        if ui.small_button("Use").clicked() {
                            actions.push(UiAction::UseTemporaryWord(word.clone()));
                        }
                    });
                });
            }
        });
    }
}

impl Default for AddWordView {
    fn default() -> Self {
        Self::new()
    }
}

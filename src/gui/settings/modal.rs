use eframe::egui;

use super::data::SettingsData;

pub struct SettingsModal {
    open: bool,
    original: SettingsData,
    draft: SettingsData,
    delay_input: String,
    validation_error: Option<String>,
}

impl SettingsModal {
    pub fn new() -> Self {
        Self {
            open: false,
            original: SettingsData::default(),
            draft: SettingsData::default(),
            delay_input: String::new(),
            validation_error: None,
        }
    }

    pub fn open_settings(&mut self, current_settings: SettingsData) {
        self.delay_input = current_settings.settle_delay_ms.to_string();
        self.original = current_settings.clone();
        self.draft = current_settings;
        self.validation_error = None;
        self.open = true;
    }

    fn is_dirty(&self) -> bool {
        self.draft != self.original
            || self.delay_input != self.original.settle_delay_ms.to_string()
    }

    pub fn show(&mut self, ctx: &egui::Context) -> Option<SettingsData> {
        if !self.open {
            return None;
        }

        let mut result: Option<SettingsData> = None;

        let modal = egui::Modal::new(egui::Id::new("settings_modal")).show(ctx, |ui| {
            ui.set_width(460.0);
            ui.heading("Settings");
            ui.add_space(10.0);

            egui::Grid::new("settings_grid").num_columns(2).spacing([12.0, 8.0]).show(ui, |ui| {
                ui.label("Backend URL");
                ui.add(
                    egui::TextEdit::singleline(&mut self.draft.backend_url)
                        .hint_text("https://your-project.example.com")
                        .desired_width(280.0),
                );
                ui.end_row();

                ui.label("Anon key");
                ui.add(
                    egui::TextEdit::singleline(&mut self.draft.anon_key)
                        .password(true)
                        .desired_width(280.0),
                );
                ui.end_row();

                ui.label("Card settle delay (ms)");
                ui.add(egui::TextEdit::singleline(&mut self.delay_input).desired_width(80.0));
                ui.end_row();
            });

            if let Some(error) = &self.validation_error {
                ui.add_space(5.0);
                ui.horizontal(|ui| {
                    ui.colored_label(egui::Color32::RED, "⚠");
                    ui.label(error);
                });
            }

            ui.add_space(10.0);
            ui.separator();

            let is_dirty = self.is_dirty();

            ui.horizontal(|ui| {
                let save_clicked =
                    ui.add_enabled(is_dirty, egui::Button::new("Save Settings")).clicked();
                let close_clicked = ui.button("Close").clicked();

                let mut reset_clicked = false;
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    reset_clicked = ui.button("Restore Default").clicked();
                });

                if save_clicked {
                    match self.delay_input.trim().parse::<u64>() {
                        Ok(delay) => {
                            self.draft.settle_delay_ms = delay;
                            self.original = self.draft.clone();
                            self.validation_error = None;
                            result = Some(self.draft.clone());
                            ui.close();
                        }
                        Err(_) => {
                            self.validation_error =
                                Some("The settle delay must be a whole number of milliseconds."
                                    .to_string());
                        }
                    }
                } else if reset_clicked {
                    let last_email = self.draft.last_email.clone();
                    self.draft = SettingsData { last_email, ..SettingsData::default() };
                    self.delay_input = self.draft.settle_delay_ms.to_string();
                    self.validation_error = None;
                } else if close_clicked {
                    ui.close();
                }
            });
        });

        if modal.should_close() {
            self.open = false;
        }

        result
    }
}

impl Default for SettingsModal {
    fn default() -> Self {
        Self::new()
    }
}

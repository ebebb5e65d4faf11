use eframe::egui;

use super::actions::{
    ActionQueue,
    UiAction,
};

/// Email and password sign-in screen shown while no session exists.
pub struct AuthView {
    email: String,
    password: String,
    error: Option<String>,
    pending: bool,
}

impl AuthView {
    pub fn new(last_email: &str) -> Self {
        Self { email: last_email.to_string(), password: String::new(), error: None, pending: false }
    }

    pub fn sign_in_started(&mut self) {
        self.pending = true;
        self.error = None;
    }

    pub fn sign_in_finished(&mut self, error: Option<String>) {
        self.pending = false;
        self.password.clear();
        self.error = error;
    }

    pub fn show(&mut self, ctx: &egui::Context, backend_configured: bool, actions: &mut ActionQueue) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(80.0);
                ui.heading("Vocabook");
                ui.label("Sign in to review your vocabulary.");
                ui.add_space(20.0);

                if !backend_configured {
                    ui.horizontal(|ui| {
                        ui.colored_label(egui::Color32::YELLOW, "⚠");
                        ui.label("No backend is configured yet.");
                    });
                    if ui.button("Open Settings").clicked() {
                        actions.push(UiAction::OpenSettings);
                    }
                    ui.add_space(10.0);
                }

                ui.add(
                    egui::TextEdit::singleline(&mut self.email)
                        .hint_text("Email")
                        .desired_width(260.0),
                );
                let password = ui.add(
                    egui::TextEdit::singleline(&mut self.password)
                        .hint_text("Password")
                        .password(true)
                        .desired_width(260.0),
                );
                ui.add_space(10.0);

                let can_submit = backend_configured
                    && !self.pending
                    && !self.email.trim().is_empty()
                    && !self.password.is_empty();

                let submitted = password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let label = if self.pending { "Signing in..." } else { "Sign In" };
                let clicked = ui.add_enabled(can_submit, egui::Button::new(label)).clicked();

                if can_submit && (clicked || submitted) {
                    actions.push(UiAction::SignIn {
                        email: self.email.trim().to_string(),
                        password: self.password.clone(),
                    });
                }

                if let Some(error) = &self.error {
                    ui.add_space(10.0);
                    ui.colored_label(egui::Color32::RED, error);
                }
            });
        });
    }
}

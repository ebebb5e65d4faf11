use eframe::egui;

use super::actions::{
    ActionQueue,
    UiAction,
};
use crate::deck::DeckView;

const CARD_SIZE: egui::Vec2 = egui::vec2(460.0, 260.0);

pub fn review_panel(ui: &mut egui::Ui, view: DeckView<'_>, actions: &mut ActionQueue) {
    let Some(card) = view.card.filter(|_| view.has_cards) else {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.heading("No words to review");
            ui.label("Add some words first, then come back here.");
        });
        return;
    };

    ui.vertical_centered(|ui| {
        ui.add_space(20.0);
        ui.label(format!("Card {} of {}", view.position + 1, view.total));
        ui.add_space(10.0);

        let frame = egui::Frame::group(ui.style()).inner_margin(24.0).corner_radius(10.0);
        let response = frame
            .show(ui, |ui| {
                ui.set_min_size(CARD_SIZE);
                ui.set_max_width(CARD_SIZE.x);
                ui.vertical_centered(|ui| {
                    if view.flipped {
                        ui.label(egui::RichText::new(&card.definition).size(18.0));
                        if !card.translation.is_empty() {
                            ui.add_space(8.0);
                            ui.label(egui::RichText::new(&card.translation).size(16.0));
                        }
                        ui.add_space(8.0);
                        ui.weak(&card.part_of_speech);
                        if !card.notes.is_empty() {
                            ui.add_space(8.0);
                            ui.label(egui::RichText::new(&card.notes).italics());
                        }
                    } else {
                        ui.add_space(CARD_SIZE.y / 3.0);
                        ui.label(egui::RichText::new(&card.term).size(30.0).strong());
                        ui.add_space(8.0);
                        ui.weak("Click to reveal");
                    }
                });
            })
            .response
            .interact(egui::Sense::click())
            .on_hover_cursor(egui::CursorIcon::PointingHand);

        if response.clicked() && !view.transitioning {
            actions.push(UiAction::FlipCard);
        }

        ui.add_space(12.0);

        ui.horizontal(|ui| {
            let star = if card.favorite { "★ Starred" } else { "☆ Star" };
            if ui.button(star).clicked() {
                actions.push(UiAction::ToggleCardFavorite);
            }
            if ui.add_enabled(!view.transitioning, egui::Button::new("Next Word")).clicked() {
                actions.push(UiAction::NextCard);
            }
        });
    });
}

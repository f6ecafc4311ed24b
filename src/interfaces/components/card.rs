use crate::interfaces::design_system::DesignSystem;
use eframe::egui;

/// Framed container with an optional header and a right-aligned badge
#[derive(Default)]
pub struct Card {
    title: Option<String>,
    badge: Option<(String, egui::Color32)>,
}

impl Card {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn badge(mut self, text: impl Into<String>, color: egui::Color32) -> Self {
        self.badge = Some((text.into(), color));
        self
    }

    pub fn show<R>(
        self,
        ui: &mut egui::Ui,
        add_contents: impl FnOnce(&mut egui::Ui) -> R,
    ) -> egui::InnerResponse<R> {
        DesignSystem::card_frame().show(ui, |ui| {
            if self.title.is_some() || self.badge.is_some() {
                ui.horizontal(|ui| {
                    if let Some(title) = &self.title {
                        ui.label(
                            egui::RichText::new(title)
                                .size(14.0)
                                .color(DesignSystem::TEXT_SECONDARY)
                                .strong(),
                        );
                    }
                    if let Some((text, color)) = &self.badge {
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            render_pill(ui, text, *color);
                        });
                    }
                });
                ui.add_space(DesignSystem::SPACING_SMALL);
            }

            add_contents(ui)
        })
    }
}

/// Small colored status pill (e.g. a verdict)
pub fn render_pill(ui: &mut egui::Ui, text: &str, color: egui::Color32) {
    egui::Frame::NONE
        .fill(color.linear_multiply(0.15))
        .corner_radius(12)
        .inner_margin(egui::Margin::symmetric(8, 4))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).size(12.0).strong().color(color));
        });
}

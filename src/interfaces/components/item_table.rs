use crate::application::analysis_service::SourceReport;
use crate::domain::sentiment::SentimentLabel;
use crate::interfaces::design_system::DesignSystem;
use eframe::egui;

fn label_color(label: SentimentLabel) -> egui::Color32 {
    match label {
        SentimentLabel::Positive => DesignSystem::SUCCESS,
        SentimentLabel::Negative => DesignSystem::DANGER,
        SentimentLabel::Neutral => DesignSystem::TEXT_SECONDARY,
    }
}

/// The table is shown whenever anything was classified, neutral items included.
pub fn has_rows(report: &SourceReport) -> bool {
    !report.result.items.is_empty()
}

/// Classified items of one (ticker, source) pair, or the empty-state line.
pub fn render_item_table(ui: &mut egui::Ui, id_salt: &str, report: &SourceReport) {
    let result = &report.result;

    for warning in &report.warnings {
        ui.colored_label(DesignSystem::WARNING, format!("⚠ {}", warning));
    }

    if !has_rows(report) {
        ui.label(
            egui::RichText::new(format!(
                "No matching {} found for sentiment analysis.",
                report.source.item_noun()
            ))
            .italics()
            .color(DesignSystem::TEXT_MUTED),
        );
        return;
    }

    ui.label(
        egui::RichText::new(format!(
            "Score {:.4} · {} positive · {} negative · {} neutral",
            result.final_score, result.positive_count, result.negative_count, result.neutral_count
        ))
        .color(DesignSystem::TEXT_SECONDARY),
    );
    ui.add_space(DesignSystem::SPACING_SMALL);

    egui::ScrollArea::horizontal()
        .id_salt(format!("{}_scroll", id_salt))
        .show(ui, |ui| {
            egui::Grid::new(id_salt)
                .striped(true)
                .spacing([20.0, 8.0])
                .show(ui, |ui| {
                    ui.strong("Title");
                    ui.strong("Link");
                    ui.strong("Sentiment");
                    ui.strong("Score");
                    ui.strong("Published");
                    ui.end_row();

                    for classified in &result.items {
                        let item = &classified.item;
                        ui.add(egui::Label::new(item.title.as_str()).wrap());
                        match &item.link {
                            Some(link) => {
                                ui.hyperlink_to("open", link);
                            }
                            None => {
                                ui.label("-");
                            }
                        }
                        ui.colored_label(label_color(classified.label()), classified.label().to_string());
                        ui.label(format!("{:.4}", classified.confidence()));
                        match item.published {
                            Some(published) => ui.label(published.format("%Y-%m-%d %H:%M").to_string()),
                            None => ui.label("-"),
                        };
                        ui.end_row();
                    }
                });
        });
}

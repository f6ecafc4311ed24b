use crate::application::analysis_service::TickerReport;
use crate::domain::items::SourceKind;
use crate::interfaces::design_system::DesignSystem;
use eframe::egui;
use egui_plot::{Bar, BarChart, HLine, Legend, Plot, PlotPoint, Text};

const BAR_WIDTH: f64 = 0.35;
/// Reddit sits left of the ticker's slot, Yahoo right
const SERIES: [(SourceKind, f64); 2] = [(SourceKind::Forum, -0.2), (SourceKind::News, 0.2)];

/// One bar of the grouped chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentBar {
    pub ticker: String,
    pub source: SourceKind,
    pub x: f64,
    pub score: f64,
}

/// Bars for every ticker, one group per ticker at x = 0, 1, 2...
pub fn sentiment_bars(tickers: &[TickerReport]) -> Vec<SentimentBar> {
    let mut bars = Vec::with_capacity(tickers.len() * SERIES.len());
    for (slot, report) in tickers.iter().enumerate() {
        for (source, offset) in SERIES {
            bars.push(SentimentBar {
                ticker: report.ticker().to_string(),
                source,
                x: slot as f64 + offset,
                score: report.source(source).result.final_score,
            });
        }
    }
    bars
}

/// Value label slightly past the end of the bar.
fn label_position(bar: &SentimentBar) -> PlotPoint {
    let nudge = if bar.score < 0.0 { -0.06 } else { 0.06 };
    PlotPoint::new(bar.x, bar.score + nudge)
}

pub fn render_sentiment_chart(ui: &mut egui::Ui, tickers: &[TickerReport]) {
    let bars = sentiment_bars(tickers);
    let names: Vec<String> = tickers.iter().map(|t| t.ticker().to_string()).collect();

    Plot::new("sentiment_chart")
        .height(ui.available_height().clamp(300.0, 520.0))
        .legend(Legend::default())
        .show_grid([false, true])
        .allow_drag(false)
        .allow_scroll(false)
        .include_y(1.1)
        .include_y(-1.1)
        .x_axis_formatter(move |mark, _range| {
            let slot = mark.value.round();
            if (mark.value - slot).abs() > f64::EPSILON || slot < 0.0 {
                return String::new();
            }
            names.get(slot as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for (source, _) in SERIES {
                let series: Vec<Bar> = bars
                    .iter()
                    .filter(|b| b.source == source)
                    .map(|b| {
                        Bar::new(b.x, b.score)
                            .width(BAR_WIDTH)
                            .name(format!("{} {}", b.ticker, source))
                    })
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(source.display_name(), series)
                        .color(DesignSystem::source_color(source)),
                );
            }

            plot_ui.hline(HLine::new("Neutral", 0.0).color(DesignSystem::TEXT_MUTED));

            for bar in &bars {
                plot_ui.text(
                    Text::new(
                        format!("{} {} label", bar.ticker, bar.source),
                        label_position(bar),
                        egui::RichText::new(format!("{:.2}", bar.score))
                            .color(DesignSystem::TEXT_PRIMARY)
                            .size(12.0),
                    ),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::analysis_service::SourceReport;
    use crate::domain::watchlist::TickerProfile;

    fn ticker(symbol: &str, news: f64, forum: f64) -> TickerReport {
        let mut news_report = SourceReport::empty(SourceKind::News);
        news_report.result.final_score = news;
        let mut forum_report = SourceReport::empty(SourceKind::Forum);
        forum_report.result.final_score = forum;
        TickerReport {
            profile: TickerProfile {
                ticker: symbol.to_string(),
                keyword: symbol.to_lowercase(),
                communities: vec![symbol.to_lowercase()],
            },
            news: news_report,
            forum: forum_report,
        }
    }

    #[test]
    fn test_bars_are_grouped_per_ticker() {
        let bars = sentiment_bars(&[ticker("META", 0.5, -0.3), ticker("AAPL", 0.0, 0.2)]);
        assert_eq!(bars.len(), 4);

        assert_eq!(bars[0].ticker, "META");
        assert_eq!(bars[0].source, SourceKind::Forum);
        assert!((bars[0].x + 0.2).abs() < 1e-9);
        assert_eq!(bars[0].score, -0.3);
        assert_eq!(bars[1].source, SourceKind::News);
        assert_eq!(bars[1].score, 0.5);

        assert_eq!(bars[2].ticker, "AAPL");
        assert!((bars[2].x - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_labels_sit_outside_the_bar() {
        let bars = sentiment_bars(&[ticker("META", 0.5, -0.3)]);
        assert!(label_position(&bars[0]).y < -0.3);
        assert!(label_position(&bars[1]).y > 0.5);
    }
}

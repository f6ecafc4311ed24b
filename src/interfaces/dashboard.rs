use crate::application::analysis_service::{
    FORUM_LIMIT_MAX, FORUM_LIMIT_MIN, NEWS_LIMIT_MAX, NEWS_LIMIT_MIN, TickerReport,
};
use crate::application::client::{AnalysisClient, ClientEvent};
use crate::domain::items::SourceKind;
use crate::domain::ports::RecencyFilter;
use crate::interfaces::components::card::Card;
use crate::interfaces::components::charts::render_sentiment_chart;
use crate::interfaces::components::item_table::{has_rows, render_item_table};
use crate::interfaces::design_system::DesignSystem;
use crate::interfaces::view_models::dashboard_view_model::DashboardViewModel;
use eframe::egui;
use std::time::Duration;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardTab {
    Graph,
    Details,
}

impl DashboardTab {
    fn title(&self) -> &'static str {
        match self {
            DashboardTab::Graph => "📊 Sentiment Graph",
            DashboardTab::Details => "📰 Detailed Results",
        }
    }
}

pub struct DashboardApp {
    client: AnalysisClient,
    vm: DashboardViewModel,
    tab: DashboardTab,
}

impl DashboardApp {
    pub fn new(client: AnalysisClient, vm: DashboardViewModel) -> Self {
        Self {
            client,
            vm,
            tab: DashboardTab::Graph,
        }
    }

    fn process_events(&mut self) {
        while let Some(event) = self.client.poll_next() {
            match event {
                ClientEvent::Analysis(event) => self.vm.apply_event(event),
                ClientEvent::Log(line) => self.vm.push_log(line),
            }
        }
    }

    fn submit(&mut self) {
        match self.vm.build_request() {
            Ok(request) => {
                if let Err(e) = self.client.submit(request) {
                    error!("{}", e);
                    self.vm.error = Some(e.to_string());
                } else {
                    self.vm.running = true;
                    self.vm.error = None;
                }
            }
            Err(e) => self.vm.error = Some(e.to_string()),
        }
    }

    fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading("Settings");
        ui.add_space(DesignSystem::SPACING_SMALL);

        ui.label("Tickers (comma-separated)");
        ui.add(
            egui::TextEdit::singleline(&mut self.vm.tickers_input)
                .hint_text("META, AAPL, TSLA")
                .desired_width(f32::INFINITY),
        );
        ui.add_space(DesignSystem::SPACING_SMALL);

        let tickers = self.vm.tickers();
        if !tickers.is_empty() {
            ui.label(egui::RichText::new("Subreddits per ticker").strong());
            for ticker in &tickers {
                let hint = self.vm.default_communities(ticker);
                let input = self.vm.community_inputs.entry(ticker.clone()).or_default();
                ui.label(egui::RichText::new(ticker).color(DesignSystem::TEXT_SECONDARY));
                ui.add(
                    egui::TextEdit::singleline(input)
                        .hint_text(hint)
                        .desired_width(f32::INFINITY),
                );
            }
            ui.add_space(DesignSystem::SPACING_SMALL);
        }

        ui.add(
            egui::Slider::new(&mut self.vm.news_limit, NEWS_LIMIT_MIN..=NEWS_LIMIT_MAX)
                .text("News articles"),
        );
        ui.add(
            egui::Slider::new(&mut self.vm.forum_limit, FORUM_LIMIT_MIN..=FORUM_LIMIT_MAX)
                .text("Posts per subreddit"),
        );

        egui::ComboBox::from_label("Reddit time filter")
            .selected_text(self.vm.recency.to_string())
            .show_ui(ui, |ui| {
                for filter in RecencyFilter::ALL {
                    ui.selectable_value(&mut self.vm.recency, filter, filter.to_string());
                }
            });

        ui.add_space(DesignSystem::SPACING_MEDIUM);
        ui.horizontal(|ui| {
            let button = ui.add_enabled(!self.vm.running, egui::Button::new("🔍 Analyze"));
            if button.clicked() {
                self.submit();
            }
            if self.vm.running {
                ui.spinner();
                ui.label("Analyzing...");
            }
        });

        if let Some(error) = &self.vm.error {
            ui.add_space(DesignSystem::SPACING_SMALL);
            ui.colored_label(DesignSystem::WARNING, format!("⚠ {}", error));
        }
    }

    fn render_logs(&self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .id_salt("log_scroll")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &self.vm.logs {
                    let color = if line.contains("ERROR") {
                        DesignSystem::DANGER
                    } else if line.contains("WARN") {
                        DesignSystem::WARNING
                    } else {
                        DesignSystem::TEXT_SECONDARY
                    };
                    ui.label(egui::RichText::new(line).monospace().size(11.0).color(color));
                }
            });
    }

    fn render_details(ui: &mut egui::Ui, tickers: &[TickerReport]) {
        egui::ScrollArea::vertical()
            .id_salt("details_scroll")
            .show(ui, |ui| {
                for ticker in tickers {
                    ui.heading(format!("{} Analysis", ticker.ticker()));
                    ui.label(
                        egui::RichText::new(format!(
                            "keyword '{}' · r/{}",
                            ticker.profile.keyword,
                            ticker.profile.communities.join(", r/")
                        ))
                        .color(DesignSystem::TEXT_MUTED),
                    );
                    ui.add_space(DesignSystem::SPACING_SMALL);

                    for source in [SourceKind::Forum, SourceKind::News] {
                        let report = ticker.source(source);
                        let verdict = report.result.verdict;
                        let mut card = Card::new().title(source.display_name());
                        if has_rows(report) {
                            card = card.badge(
                                format!("{} ({:.4})", verdict, report.result.final_score),
                                DesignSystem::verdict_color(verdict),
                            );
                        }
                        card.show(ui, |ui| {
                            render_item_table(
                                ui,
                                &format!("{}_{}_items", ticker.ticker(), source.item_noun()),
                                report,
                            );
                        });
                        ui.add_space(DesignSystem::SPACING_SMALL);
                    }
                    ui.separator();
                }
            });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(DesignSystem::theme());

        self.process_events();
        if self.vm.running {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else {
            ctx.request_repaint_after(Duration::from_millis(500));
        }

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("📈 Financial Sentiment Analysis");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(report) = &self.vm.report {
                        ui.label(
                            egui::RichText::new(format!(
                                "{} · finished {}",
                                report.classifier,
                                report.finished_at.format("%H:%M:%S UTC")
                            ))
                            .small()
                            .color(DesignSystem::TEXT_MUTED),
                        );
                    }
                });
            });
        });

        egui::SidePanel::left("settings_panel")
            .default_width(300.0)
            .min_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.render_sidebar(ui));
            });

        egui::TopBottomPanel::bottom("log_panel")
            .default_height(140.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new("Logs").strong());
                self.render_logs(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let tickers = self.vm.results().to_vec();
            if tickers.is_empty() {
                ui.centered_and_justified(|ui| {
                    let message = if self.vm.running {
                        "Fetching and classifying..."
                    } else {
                        "Enter tickers and click Analyze to start."
                    };
                    ui.label(
                        egui::RichText::new(message)
                            .italics()
                            .color(DesignSystem::TEXT_MUTED),
                    );
                });
                return;
            }

            ui.horizontal(|ui| {
                for tab in [DashboardTab::Graph, DashboardTab::Details] {
                    ui.selectable_value(&mut self.tab, tab, tab.title());
                }
            });
            ui.separator();

            match self.tab {
                DashboardTab::Graph => {
                    ui.heading("Reddit vs Yahoo Finance Sentiment");
                    render_sentiment_chart(ui, &tickers);
                }
                DashboardTab::Details => Self::render_details(ui, &tickers),
            }
        });
    }
}

use finpulse::application::client::AnalysisClient;
use finpulse::application::worker::AnalysisWorker;
use finpulse::config::Config;
use finpulse::infrastructure::ServiceFactory;
use finpulse::interfaces::dashboard::DashboardApp;
use finpulse::interfaces::view_models::dashboard_view_model::DashboardViewModel;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

// A writer that sends logs to the UI via a crossbeam channel
struct ChannelWriter {
    sender: crossbeam_channel::Sender<String>,
}

impl std::io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let msg = String::from_utf8_lossy(buf).to_string();
        let _ = self.sender.try_send(msg);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// Cloneable wrapper for MakeWriter
#[derive(Clone)]
struct ChannelWriterFactory {
    sender: crossbeam_channel::Sender<String>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for ChannelWriterFactory {
    type Writer = ChannelWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ChannelWriter {
            sender: self.sender.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // 1. Logging: stdout + UI log panel
    let (log_tx, log_rx) = crossbeam_channel::unbounded();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    let ui_layer = tracing_subscriber::fmt::layer()
        .with_writer(ChannelWriterFactory { sender: log_tx })
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .with(ui_layer)
        .init();

    info!("Initializing Financial Sentiment Dashboard...");

    // 2. Config is loaded up front so a bad .env fails before any window opens
    let config = Config::from_env()?;

    // 3. Analysis worker on a background Tokio runtime
    let (request_tx, request_rx) = tokio::sync::mpsc::channel(4);
    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build Tokio runtime: {}", e))?;

    let worker_config = config.clone();
    std::thread::spawn(move || {
        runtime.block_on(async move {
            info!("Background Runtime Started.");
            let service = Arc::new(ServiceFactory::create_analysis_service(&worker_config));
            AnalysisWorker::new(service, request_rx, event_tx).run().await;
        });
    });

    // 4. Run UI (Blocks Main Thread)
    let client = AnalysisClient::new(request_tx, event_rx, log_rx);
    let app = DashboardApp::new(client, DashboardViewModel::from_config(&config));

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_title("Financial Sentiment Analysis"),
        ..Default::default()
    };

    eframe::run_native(
        "Financial Sentiment Analysis",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("Eframe error: {}", e))?;

    Ok(())
}

use crate::application::analysis_service::AnalysisRequest;
use crate::application::worker::AnalysisEvent;
use anyhow::Result;
use crossbeam_channel::Receiver;
use tokio::sync::mpsc::Sender;

/// Unified event type for the User Interface
#[derive(Clone, Debug)]
pub enum ClientEvent {
    Analysis(AnalysisEvent),
    Log(String),
}

/// Handle the dashboard uses to talk to the background analysis worker.
/// Abstracts away channel management; every call is non-blocking.
pub struct AnalysisClient {
    request_tx: Sender<AnalysisRequest>,
    event_rx: Receiver<AnalysisEvent>,
    log_rx: Receiver<String>,
}

impl AnalysisClient {
    pub fn new(
        request_tx: Sender<AnalysisRequest>,
        event_rx: Receiver<AnalysisEvent>,
        log_rx: Receiver<String>,
    ) -> Self {
        Self {
            request_tx,
            event_rx,
            log_rx,
        }
    }

    /// Poll for the next available event from any channel.
    /// Analysis events take priority over log lines.
    pub fn poll_next(&mut self) -> Option<ClientEvent> {
        if let Ok(event) = self.event_rx.try_recv() {
            return Some(ClientEvent::Analysis(event));
        }

        if let Ok(msg) = self.log_rx.try_recv() {
            return Some(ClientEvent::Log(msg));
        }

        None
    }

    pub fn submit(&self, request: AnalysisRequest) -> Result<()> {
        self.request_tx
            .try_send(request)
            .map_err(|e| anyhow::anyhow!("Failed to submit analysis request: {}", e))
    }
}

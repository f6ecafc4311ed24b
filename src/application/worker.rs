//! Background analysis worker
//!
//! Owns the analysis service on the tokio runtime and processes requests
//! coming from the dashboard one at a time, streaming progress back over a
//! crossbeam channel the UI thread polls without blocking.

use crate::application::analysis_service::{AnalysisReport, AnalysisRequest, AnalysisService, TickerReport};
use crossbeam_channel::Sender;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub enum AnalysisEvent {
    Started { tickers: Vec<String> },
    TickerCompleted(TickerReport),
    Finished(AnalysisReport),
    /// The request was refused before any fetch (no tickers, invalid limits)
    Rejected(String),
}

pub struct AnalysisWorker {
    service: Arc<AnalysisService>,
    request_rx: Receiver<AnalysisRequest>,
    event_tx: Sender<AnalysisEvent>,
}

impl AnalysisWorker {
    pub fn new(
        service: Arc<AnalysisService>,
        request_rx: Receiver<AnalysisRequest>,
        event_tx: Sender<AnalysisEvent>,
    ) -> Self {
        Self {
            service,
            request_rx,
            event_tx,
        }
    }

    /// Runs until every request sender is dropped.
    pub async fn run(mut self) {
        info!("Analysis worker started");
        while let Some(request) = self.request_rx.recv().await {
            self.handle(request).await;
        }
        info!("Analysis worker stopped (request channel closed)");
    }

    async fn handle(&self, request: AnalysisRequest) {
        self.emit(AnalysisEvent::Started {
            tickers: request.tickers.clone(),
        });

        let event_tx = self.event_tx.clone();
        let result = self
            .service
            .analyze_with_progress(&request, |report| {
                if let Err(e) = event_tx.send(AnalysisEvent::TickerCompleted(report.clone())) {
                    error!("Failed to send ticker progress: {}", e);
                }
            })
            .await;

        match result {
            Ok(report) => self.emit(AnalysisEvent::Finished(report)),
            Err(e) => {
                warn!("Analysis request rejected: {}", e);
                self.emit(AnalysisEvent::Rejected(e.to_string()));
            }
        }
    }

    fn emit(&self, event: AnalysisEvent) {
        if let Err(e) = self.event_tx.send(event) {
            error!("Failed to send analysis event (UI closed?): {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::analysis_service::AnalysisLimits;
    use crate::domain::watchlist::Watchlist;
    use crate::infrastructure::classifier::LexiconClassifier;
    use crate::infrastructure::forum::MockForumService;
    use crate::infrastructure::news::MockNewsService;

    fn mock_service() -> Arc<AnalysisService> {
        Arc::new(AnalysisService::new(
            Arc::new(LexiconClassifier::default()),
            Arc::new(MockNewsService::new()),
            Arc::new(MockForumService::new()),
            Watchlist::builtin(),
        ))
    }

    #[tokio::test]
    async fn test_worker_streams_progress_then_finishes() {
        let (request_tx, request_rx) = tokio::sync::mpsc::channel(4);
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let worker = AnalysisWorker::new(mock_service(), request_rx, event_tx);

        request_tx
            .send(AnalysisRequest::new(
                vec!["META".to_string(), "TSLA".to_string()],
                AnalysisLimits::default(),
            ))
            .await
            .unwrap();
        drop(request_tx);
        worker.run().await;

        let events: Vec<AnalysisEvent> = event_rx.try_iter().collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(&events[0], AnalysisEvent::Started { tickers } if tickers.len() == 2));
        assert!(matches!(&events[1], AnalysisEvent::TickerCompleted(r) if r.ticker() == "META"));
        assert!(matches!(&events[2], AnalysisEvent::TickerCompleted(r) if r.ticker() == "TSLA"));
        assert!(matches!(&events[3], AnalysisEvent::Finished(r) if r.tickers.len() == 2));
    }

    #[tokio::test]
    async fn test_worker_rejects_empty_request() {
        let (request_tx, request_rx) = tokio::sync::mpsc::channel(4);
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let worker = AnalysisWorker::new(mock_service(), request_rx, event_tx);

        request_tx
            .send(AnalysisRequest::new(Vec::new(), AnalysisLimits::default()))
            .await
            .unwrap();
        drop(request_tx);
        worker.run().await;

        let events: Vec<AnalysisEvent> = event_rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[1], AnalysisEvent::Rejected(msg) if msg.contains("No tickers")));
    }
}

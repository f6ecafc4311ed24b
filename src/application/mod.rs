// Fetch → filter → classify → accumulate pipeline
pub mod analysis_service;

// Console, CSV and JSON output
pub mod reporting;

// Dashboard plumbing: background worker and the UI-side handle
pub mod client;
pub mod worker;

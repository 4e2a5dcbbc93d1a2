pub mod analyzer_client;
pub mod event_log_service;
pub mod monitor;
pub mod roster_service;

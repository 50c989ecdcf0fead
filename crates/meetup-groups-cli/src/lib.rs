//! Command-line front end for the `meetup-groups` engine.
//!
//! Fetches user feature records from the backend (or a JSON file), runs the
//! grouping engine, writes the export file, and talks STOMP over WebSocket
//! to publish groups or watch the broadcast topic.

pub mod backend;
pub mod commands;
pub mod export;
pub mod output;
pub mod settings;
pub mod transport;

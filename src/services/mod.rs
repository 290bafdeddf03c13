/// Game settings reads and writes.
pub mod config_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Envelope catalogue management.
pub mod envelope_service;
/// Session transitions and the display board.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Prize ideas for prefilling envelopes.
pub mod prize_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events streaming service.
pub mod sse_service;
/// Background storage connection and health supervision.
pub mod storage_supervisor;

//! Data Transfer Objects (DTOs).
//!
//! DTOs are organized by protocol:
//! - `resource`: message / notification representations shared by both protocols
//! - `websocket`: real-time event envelopes
//! - `http`: HTTP API request and response bodies

pub mod conversion;
pub mod http;
pub mod resource;
pub mod websocket;

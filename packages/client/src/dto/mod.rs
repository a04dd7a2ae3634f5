//! Data Transfer Objects (DTOs) for the chat backend.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket message DTOs
//! - `http`: HTTP API response DTOs

pub mod http;
pub mod websocket;

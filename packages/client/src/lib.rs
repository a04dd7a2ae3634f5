//! Terminal chat client for an AI character chat backend.
//!
//! The client bootstraps its character and session lists over HTTP, then
//! exchanges JSON frames over a single WebSocket connection and renders
//! inbound events into a terminal transcript.

pub mod api;
pub mod command;
pub mod dto;
pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
pub mod state;
pub mod ui;

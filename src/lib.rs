//! Polling dashboard client for a retrieval-augmented-generation backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `net` talks to the backend, `state` holds the one shared view of it,
//! `dashboard` is the only writer of that view, and `render` turns it into
//! HTML or plain text. `serve` exposes the rendered page and its events over
//! HTTP; the binary wires everything to a CLI.

pub mod config;
pub mod dashboard;
pub mod lang;
pub mod net;
pub mod render;
pub mod serve;
pub mod state;

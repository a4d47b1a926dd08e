//! Networking modules for the RAG backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` handles REST calls, `types` defines and normalizes the wire schema,
//! and `error` classifies every failure an adapter call can produce.

pub mod api;
pub mod error;
pub mod types;

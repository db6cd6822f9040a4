//! Remote planner backend
//!
//! The language model is an external collaborator consumed strictly as
//! "text in, text out". This module holds the wire types and the HTTP
//! client used by the intent planner's remote tier and the translation
//! tool.

pub mod chat;
pub mod client;

pub use client::PlannerClient;

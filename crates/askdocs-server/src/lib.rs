//! HTTP adapter for the askdocs pipeline
//!
//! Exposes `POST /chat` and `GET /health`. Requests are translated into a
//! conversation record, run through the shared pipeline and answered with
//! the assistant's reply.

pub mod error;
pub mod protocol;
pub mod server;

pub use error::ApiError;
pub use protocol::{ChatRequest, ChatResponse, InboundMessage};
pub use server::{AppState, ServerConfig, app_router, run_server};

//! Prompt Optimizer - compress prompts for fewer tokens with a hosted model
//!
//! A small service and client pair: the service wraps a prompt in a fixed
//! compression instruction, sends it to a hosted language model and returns
//! the trimmed result; the client tracks one session's request lifecycle and
//! reports how much shorter the prompt became.
//!
//! ## Modules
//!
//! - **api**: the model capability and its HTTP provider adapters
//! - **optimization**: request validation and the single model call
//! - **server**: `POST /api/optimize` over axum
//! - **client**: session state machine, backends, clipboard
//! - **metrics**: character reduction and token estimates
//! - **tui**: full-screen terminal client

pub mod api;
pub mod client;
pub mod config;
pub mod metrics;
pub mod optimization;
pub mod server;
pub mod tui;

pub use api::{ApiAgent, ApiConfig, ApiError, CompletionProvider, ProviderType};
pub use client::{
    ClientController, ClientSession, HttpBackend, Notice, OptimizerBackend, RequestStatus,
    SubmitOutcome,
};
pub use config::{Config, ConfigBuilder, ConfigError};
pub use metrics::{reduction_percentage, ReductionReport};
pub use optimization::{
    OptimizationError, OptimizationRequest, OptimizationResult, OptimizationService,
};

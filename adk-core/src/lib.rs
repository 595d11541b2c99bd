//! # adk-core
//!
//! Core types shared by the ADK evaluation crates.
//!
//! ## Overview
//!
//! - [`Content`] / [`Part`] - Structured, multi-part conversation messages
//! - [`Llm`] - The boundary to any hosted or local language model
//! - [`LlmRequest`] / [`LlmResponse`] - What goes into and comes out of a model call
//! - [`AdkError`] / [`Result`] - Unified error handling
//!
//! ## Llm
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait Llm: Send + Sync {
//!     fn name(&self) -> &str;
//!     async fn generate_content(&self, req: LlmRequest, stream: bool) -> Result<LlmResponseStream>;
//! }
//! ```

pub mod error;
pub mod model;
pub mod types;

pub use error::{AdkError, Result};
pub use model::{
    FinishReason, GenerateContentConfig, Llm, LlmRequest, LlmResponse, LlmResponseStream,
    UsageMetadata,
};
pub use types::{Content, FunctionResponseData, Part};

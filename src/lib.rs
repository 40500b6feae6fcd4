//! supportbot-client - Streaming chat client for a hosted support bot
//!
//! This library talks to the backend behind an embeddable support-chat
//! widget: it streams bot replies fragment by fragment, paces their
//! delivery, and wraps the dashboard's configuration and ingestion API.
//!
//! ## Key Features
//!
//! - **Streaming Replies**: Line-framed `data:` events reassembled across
//!   arbitrary chunk boundaries, malformed frames skipped without aborting
//! - **Paced Delivery**: Optional per-fragment delay that never slows reading
//! - **Uniform Errors**: Every failure surfaces as `{ status, message }`
//! - **Dashboard API**: Bot configuration, document upload and listing
//! - **Chat Shell**: Interactive terminal chat with a typing indicator

pub mod api;
pub mod config;
pub mod conversation;
pub mod dashboard;
pub mod tui;

pub use api::{ApiError, ChatClient, ChatResponse, SendOptions, StreamDecoder};
pub use config::{Config, ConfigBuilder, ConfigError};
pub use conversation::{Conversation, SubmitOutcome};
pub use dashboard::DashboardClient;

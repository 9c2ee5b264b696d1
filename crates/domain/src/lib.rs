//! wechat-publisher domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `markup`: Markdown to platform markup conversion
//! - `cron`: Five-field cron expressions for the scheduler
//! - `usecases`: Application use cases / business logic
//! - `webhook`: Shared-secret signature checks for repository webhooks

pub mod cron;
pub mod markup;
pub mod model;
pub mod ports;
pub mod usecases;
pub mod webhook;

pub use model::*;
pub use ports::*;

//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! the redirect cache, validation, and business rules. Services consume
//! repository traits and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Code allocation, resolution and edits
//! - [`services::quota_service::QuotaService`] - Guest creation limits
//! - [`services::click_service::ClickService`] - Click queueing and history

pub mod services;

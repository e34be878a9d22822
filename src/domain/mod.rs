//! Domain layer containing business entities and the persistence port.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Persistence port trait definitions
//! - [`click_event`] - Click tracking event model
//! - [`click_worker`] - Asynchronous click processing worker
//!
//! # Click Processing Flow
//!
//! 1. Redirect handler resolves the code and builds a [`click_event::ClickEvent`]
//! 2. The click service bumps the cached counter and queues the event (non-blocking)
//! 3. [`click_worker::run_click_worker`] makes one write attempt per event
//! 4. The click is persisted via [`repositories::LinkRepository::update`]

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;

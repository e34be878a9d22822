//! Utility functions for code generation, URL checks, and request handling.
//!
//! - [`code_generator`] - Short code generation and custom code validation
//! - [`url_validator`] - Long URL acceptance rules
//! - [`user_agent`] - User-agent summaries for click analytics
//! - [`client_ip`] - Caller address extraction
//! - [`qr_code`] - PNG QR codes for short links
//! - [`db_error`] - `sqlx` error classification

pub mod client_ip;
pub mod code_generator;
pub mod db_error;
pub mod qr_code;
pub mod url_validator;
pub mod user_agent;

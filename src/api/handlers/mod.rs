//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod clicks;
pub mod health;
pub mod links;
pub mod qr;
pub mod redirect;
pub mod shorten;

pub use clicks::click_history_handler;
pub use health::health_handler;
pub use links::{get_link_handler, list_links_handler, update_link_handler};
pub use qr::qr_code_handler;
pub use redirect::redirect_handler;
pub use shorten::create_link_handler;

//! Vitrina Share — capability links for panel modules: token issuance,
//! expiry and access-code validation, and usage tracking.

pub mod config;
pub mod link;
pub mod service;
pub mod token;

pub use config::ShareConfig;
pub use link::{GenerateLink, LinkExpiry, LinkRejection, LinkValidation};
pub use service::ShareableLinkService;

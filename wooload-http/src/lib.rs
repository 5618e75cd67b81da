//! HTTP client functionality for wooload
//!
//! This crate provides the narrow client and cookie-store interfaces the
//! account flow is written against, plus a reqwest-backed session that gives
//! every virtual user its own cookie jar.

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

// Re-export main types for convenience
pub use client::{CookieStore, HttpClient, Session, SessionFactory, SiteSession, SiteSessionFactory};
pub use config::HttpConfig;
pub use errors::HttpError;
pub use types::{HttpMethod, HttpMethodError, HttpResponse};

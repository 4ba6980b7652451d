//! HTTP transport and credential handling for the procqa backend.
//!
//! This crate provides the concrete [`procqa_core::ChatTransport`]
//! implementation over the REST API, the credential holder, and the
//! JWT-based identity resolver.

pub mod http;
pub mod identity;

pub use http::HttpChatTransport;
pub use identity::{Claims, CredentialStore, IdentityResolver};

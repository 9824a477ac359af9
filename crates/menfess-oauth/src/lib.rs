//! # menfess-oauth
//!
//! App-only `OAuth2` access for the track-metadata provider used to enrich
//! menfess records.
//!
//! ## Features
//!
//! - **Client Credentials Flow**: Basic-auth token request, no user involved
//! - **Token cache**: One cached credential with a 60 second expiry margin
//! - **Single-flight refresh**: Concurrent callers share one token request
//! - **Provider configuration**: Pre-configured for Spotify, or any custom endpoint
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use menfess_oauth::{ClientCredentialsFlow, OAuthClient, Provider, TokenCache};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OAuthClient::new("your_client_id", Provider::spotify()?)
//!         .with_client_secret("your_secret");
//!
//!     // Construct once, share everywhere
//!     let cache = Arc::new(TokenCache::new(ClientCredentialsFlow::new(client)));
//!
//!     // First call hits the token endpoint, later calls reuse the token
//!     let token = cache.get_token().await?;
//!     println!("Bearer {token}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cache;
mod error;
pub mod flow;
pub mod provider;
pub mod token;

pub use cache::{TokenCache, TokenSource};
pub use error::{Error, Result};
pub use flow::{ClientCredentialsFlow, OAuthClient};
pub use provider::Provider;
pub use token::{EXPIRY_MARGIN, Token};

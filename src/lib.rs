//! Machine-to-machine OAuth 2.0 token cache: acquire a client-credentials access token, keep it
//! in memory, refresh it single-flight with bounded retries, and optionally keep it warm from a
//! background loop.
//!
//! ```no_run
//! use m2m_token_cache::{cache::TokenCache, config::TokenCacheConfig};
//!
//! # async fn demo() -> m2m_token_cache::error::Result<()> {
//! let config = TokenCacheConfig::builder("auth.example.com", "svc-client", "svc-secret").build()?;
//! let cache = TokenCache::new(config)?;
//! let token = cache.get_token().await?;
//!
//! // Attach `token.bearer()` to the outgoing request; on a 401 answer:
//! cache.clear_on_unauthorized(401);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod cache;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod obs;
pub mod token;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tracing_subscriber as _};

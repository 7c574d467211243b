//! Token primitives: redacted secrets, the token endpoint payload, and the cached
//! token/expiry pair with its expiry-buffer arithmetic.

pub mod cached;
pub mod secret;

pub use cached::*;
pub use secret::*;

// self
use crate::_prelude::*;

/// JSON payload returned by the token endpoint on success.
///
/// Only `access_token` and `expires_in` are required; any other field the provider adds
/// (`token_type`, `scope`, ...) is ignored.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
	/// Issued bearer token.
	pub access_token: AccessToken,
	/// Reported lifetime in seconds.
	pub expires_in: i64,
}
impl Debug for TokenResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenResponse")
			.field("access_token", &self.access_token)
			.field("expires_in", &self.expires_in)
			.finish()
	}
}

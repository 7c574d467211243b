//! Cached token/expiry pair and the expiry-buffer arithmetic applied to fresh responses.

// self
use crate::{_prelude::*, error::RefreshError, token::AccessToken};

/// Buffer substituted when the configured buffer is not shorter than the reported lifetime.
pub const FALLBACK_EXPIRY_BUFFER: Duration = Duration::seconds(60);

/// Token and the instant after which the cache stops handing it out.
///
/// Both fields always come from the same endpoint response; the cache replaces the pair as a
/// whole.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedToken {
	/// Bearer token.
	pub token: AccessToken,
	/// Buffered expiry instant.
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Builds the pair from a fresh endpoint response observed at `now`.
	pub fn from_response(
		token: AccessToken,
		expires_in: i64,
		buffer: Duration,
		now: OffsetDateTime,
	) -> Result<Self, RefreshError> {
		if token.is_empty() {
			return Err(RefreshError::EmptyAccessToken);
		}

		let expires_at = compute_expires_at(now, expires_in, buffer)?;

		Ok(Self { token, expires_at })
	}

	/// Whether the token may still be handed out at `now`.
	pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
		!self.token.is_empty() && now < self.expires_at
	}

	/// Remaining buffered lifetime at `now`, floored at zero.
	pub fn remaining_at(&self, now: OffsetDateTime) -> Duration {
		(self.expires_at - now).max(Duration::ZERO)
	}
}

/// Picks the buffer subtracted from a reported lifetime of `expires_in` seconds.
///
/// The configured buffer applies when the lifetime outlasts it; otherwise the
/// [`FALLBACK_EXPIRY_BUFFER`] is used.
pub fn effective_buffer(expires_in: i64, buffer: Duration) -> Duration {
	if expires_in > buffer.whole_seconds() { buffer } else { FALLBACK_EXPIRY_BUFFER }
}

/// Computes `now + expires_in - effective_buffer`, never earlier than `now`.
///
/// The floor keeps a short-lived token from producing a negative lifetime: such a token is
/// treated as due for refresh immediately, and it is never cached past its real lifetime.
pub fn compute_expires_at(
	now: OffsetDateTime,
	expires_in: i64,
	buffer: Duration,
) -> Result<OffsetDateTime, RefreshError> {
	let lifetime = Duration::seconds(expires_in);
	let remaining = lifetime
		.checked_sub(effective_buffer(expires_in, buffer))
		.ok_or(RefreshError::ExpiresInOutOfRange { expires_in })?
		.max(Duration::ZERO);

	now.checked_add(remaining).ok_or(RefreshError::ExpiresInOutOfRange { expires_in })
}

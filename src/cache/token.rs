//! Token Cache Module
//!
//! Caches provider bearer tokens so sessions are not renegotiated on every
//! request. One protected slot per issuer.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, CacheStore, KeyKind, SetOutcome, StorageMedium};
use crate::error::{AuthError, TokenError};

/// Default lifetime of an issued token (30 days).
pub const DEFAULT_TOKEN_VALIDITY_MS: u64 = 30 * 24 * 60 * 60 * 1000;

/// Default margin subtracted from the lifetime (2 days).
pub const DEFAULT_TOKEN_SAFETY_MARGIN_MS: u64 = 2 * 24 * 60 * 60 * 1000;

// == Token Policy ==
/// How long an issued token may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    pub validity_window_ms: u64,
    /// Subtracted from the window so a token never expires mid-request
    pub safety_margin_ms: u64,
}

impl TokenPolicy {
    /// Time after which a token issued at `issued_at_ms` is no longer used.
    pub fn expiry_for(&self, issued_at_ms: u64) -> u64 {
        issued_at_ms
            .saturating_add(self.validity_window_ms)
            .saturating_sub(self.safety_margin_ms)
    }
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            validity_window_ms: DEFAULT_TOKEN_VALIDITY_MS,
            safety_margin_ms: DEFAULT_TOKEN_SAFETY_MARGIN_MS,
        }
    }
}

// == Issued Token ==
/// A credential returned by an issuer's authentication exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    /// Issue time in Unix milliseconds
    pub issued_at_ms: u64,
}

// == Authenticator ==
/// Performs the network exchange that yields a fresh token for an issuer.
pub trait Authenticator {
    fn authenticate(
        &self,
        issuer: &str,
    ) -> impl Future<Output = Result<IssuedToken, AuthError>> + Send;
}

/// Stored form of a token slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenEntry {
    token: String,
    issued_at: u64,
    expires_at: u64,
}

// == Token Cache ==
/// Hands out cached tokens, re-authenticating once they near expiry.
///
/// Two callers that both find the slot stale will both authenticate; the
/// later write wins and either token is valid.
#[derive(Debug, Clone)]
pub struct TokenCache<A> {
    authenticator: A,
    policy: TokenPolicy,
}

impl<A: Authenticator> TokenCache<A> {
    // == Constructor ==
    pub fn new(authenticator: A, policy: TokenPolicy) -> Self {
        Self {
            authenticator,
            policy,
        }
    }

    pub fn policy(&self) -> &TokenPolicy {
        &self.policy
    }

    /// Cache key of the slot for `issuer`.
    pub fn key_for(issuer: &str) -> CacheKey {
        KeyKind::AuthToken.key(issuer)
    }

    // == Cached Token ==
    /// Returns the stored token if it is still inside its usable window.
    pub fn cached_token<M: StorageMedium>(
        &self,
        store: &mut CacheStore<M>,
        issuer: &str,
    ) -> Option<String> {
        let entry: TokenEntry = store.get(&Self::key_for(issuer))?;
        let now = store.now_ms();
        if now < entry.expires_at {
            Some(entry.token)
        } else {
            None
        }
    }

    // == Get Token ==
    /// Returns a usable token for `issuer`, authenticating only when the
    /// cached one is missing or past its safety margin.
    pub async fn get_token<M: StorageMedium>(
        &self,
        store: &mut CacheStore<M>,
        issuer: &str,
    ) -> Result<String, TokenError> {
        if let Some(token) = self.cached_token(store, issuer) {
            debug!("Using cached token for {}", issuer);
            return Ok(token);
        }

        info!("Authenticating with {}", issuer);
        let issued = self
            .authenticator
            .authenticate(issuer)
            .await
            .map_err(|source| TokenError::Authentication {
                issuer: issuer.to_string(),
                source,
            })?;

        let expires_at = self.policy.expiry_for(issued.issued_at_ms);
        let now = store.now_ms();
        if expires_at <= now {
            warn!("Token from {} is already inside its safety margin, not caching", issuer);
            return Ok(issued.token);
        }

        let entry = TokenEntry {
            token: issued.token,
            issued_at: issued.issued_at_ms,
            expires_at,
        };
        match store.set(&Self::key_for(issuer), &entry, expires_at - now) {
            SetOutcome::Stored => {}
            outcome => warn!("Token for {} not cached ({})", issuer, outcome.as_str()),
        }
        Ok(entry.token)
    }

    // == Invalidate ==
    /// Drops the cached token, e.g. after the provider refused it.
    pub fn invalidate<M: StorageMedium>(&self, store: &mut CacheStore<M>, issuer: &str) {
        store.remove_key(&Self::key_for(issuer));
    }
}

//! Key Module
//!
//! Typed cache keys and prefix-based key classification.
//!
//! Every data kind the tracker caches is listed in [`KeyKind`] together with
//! its literal prefix and its [`KeyClass`]. Keys are built through
//! [`KeyKind::key`], so a data kind cannot end up under the wrong prefix.

use std::fmt;

// == Key Class ==
/// Eviction class of a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyClass {
    /// User data and core entity records. Never removed automatically.
    Protected,
    /// Secondary metadata. Removed only by an explicit purge.
    Purgeable,
    /// Regular TTL entries. Eligible for LRU eviction.
    Ordinary,
}

// == Key Kind ==
/// Every kind of data stored in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Watchlist,
    WatchHistory,
    WatchProgress,
    CustomList,
    Rating,
    MovieDetails,
    ShowDetails,
    AuthToken,
    Credits,
    WatchProviders,
    Trending,
    Discover,
    Recommendations,
    SeasonDetails,
    Search,
    Person,
    ExternalLookup,
}

impl KeyKind {
    /// All kinds, in declaration order.
    pub const ALL: [KeyKind; 17] = [
        KeyKind::Watchlist,
        KeyKind::WatchHistory,
        KeyKind::WatchProgress,
        KeyKind::CustomList,
        KeyKind::Rating,
        KeyKind::MovieDetails,
        KeyKind::ShowDetails,
        KeyKind::AuthToken,
        KeyKind::Credits,
        KeyKind::WatchProviders,
        KeyKind::Trending,
        KeyKind::Discover,
        KeyKind::Recommendations,
        KeyKind::SeasonDetails,
        KeyKind::Search,
        KeyKind::Person,
        KeyKind::ExternalLookup,
    ];

    /// Literal key prefix for this kind.
    pub const fn prefix(self) -> &'static str {
        match self {
            KeyKind::Watchlist => "watchlist_",
            KeyKind::WatchHistory => "watch_history_",
            KeyKind::WatchProgress => "watch_progress_",
            KeyKind::CustomList => "custom_list_",
            KeyKind::Rating => "rating_",
            KeyKind::MovieDetails => "movie_details_",
            KeyKind::ShowDetails => "show_details_",
            KeyKind::AuthToken => "auth_token_",
            KeyKind::Credits => "credits_",
            KeyKind::WatchProviders => "watch_providers_",
            KeyKind::Trending => "trending_",
            KeyKind::Discover => "discover_",
            KeyKind::Recommendations => "recommendations_",
            KeyKind::SeasonDetails => "season_details_",
            KeyKind::Search => "search_",
            KeyKind::Person => "person_",
            KeyKind::ExternalLookup => "external_lookup_",
        }
    }

    /// Declared class of this kind.
    pub const fn class(self) -> KeyClass {
        match self {
            KeyKind::Watchlist
            | KeyKind::WatchHistory
            | KeyKind::WatchProgress
            | KeyKind::CustomList
            | KeyKind::Rating
            | KeyKind::MovieDetails
            | KeyKind::ShowDetails
            | KeyKind::AuthToken => KeyClass::Protected,
            KeyKind::Credits
            | KeyKind::WatchProviders
            | KeyKind::Trending
            | KeyKind::Discover
            | KeyKind::Recommendations => KeyClass::Purgeable,
            KeyKind::SeasonDetails
            | KeyKind::Search
            | KeyKind::Person
            | KeyKind::ExternalLookup => KeyClass::Ordinary,
        }
    }

    /// Builds the key for one entity of this kind.
    ///
    /// The suffix identifies the entity: an item id, a user id, or a
    /// compound filter signature such as `"movie_week"`.
    pub fn key(self, suffix: impl fmt::Display) -> CacheKey {
        CacheKey(format!("{}{}", self.prefix(), suffix))
    }
}

// == Cache Key ==
/// A fully built cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Wraps a key that did not come from a [`KeyKind`] builder.
    ///
    /// Used for keys received from outside the process; such keys are
    /// classified by prefix like any other.
    pub fn raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Key Classifier ==
/// Maps raw keys to their [`KeyClass`] by case-sensitive prefix match.
///
/// Protected prefixes win over purgeable ones. Keys matching neither set
/// are `Ordinary`: losing an unknown entry costs a re-fetch, so anything
/// that must survive storage pressure has to be enrolled explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyClassifier {
    protected_prefixes: Vec<String>,
    purgeable_prefixes: Vec<String>,
}

impl KeyClassifier {
    /// Creates a classifier over custom prefix sets.
    pub fn new<P, Q>(protected: P, purgeable: Q) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        Q: IntoIterator,
        Q::Item: Into<String>,
    {
        Self {
            protected_prefixes: protected.into_iter().map(Into::into).collect(),
            purgeable_prefixes: purgeable.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classify(&self, key: &str) -> KeyClass {
        if self.protected_prefixes.iter().any(|p| key.starts_with(p.as_str())) {
            KeyClass::Protected
        } else if self.purgeable_prefixes.iter().any(|p| key.starts_with(p.as_str())) {
            KeyClass::Purgeable
        } else {
            KeyClass::Ordinary
        }
    }

    pub fn protected_prefixes(&self) -> &[String] {
        &self.protected_prefixes
    }

    pub fn purgeable_prefixes(&self) -> &[String] {
        &self.purgeable_prefixes
    }
}

impl Default for KeyClassifier {
    /// Prefix sets derived from the [`KeyKind`] table.
    fn default() -> Self {
        let of_class = |class: KeyClass| {
            KeyKind::ALL
                .into_iter()
                .filter(move |kind| kind.class() == class)
                .map(|kind| kind.prefix())
        };
        Self::new(of_class(KeyClass::Protected), of_class(KeyClass::Purgeable))
    }
}

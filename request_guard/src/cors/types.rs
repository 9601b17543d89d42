use async_trait::async_trait;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

use super::errors::CorsError;

/// Async capability deciding whether an origin is allowed.
///
/// Implementations may perform I/O (an allow-list lookup, for example).
/// Errors are handed back to the caller untouched; nothing retries.
#[async_trait]
pub trait OriginPredicate: Send + Sync + 'static {
    async fn is_allowed(&self, origin: &str) -> Result<bool, CorsError>;
}

/// Adapts a synchronous closure into an [`OriginPredicate`].
pub struct PredicateFn<F>(F);

impl<F> PredicateFn<F>
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> OriginPredicate for PredicateFn<F>
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    async fn is_allowed(&self, origin: &str) -> Result<bool, CorsError> {
        Ok((self.0)(origin))
    }
}

/// A regular expression that must match the whole origin.
#[derive(Clone)]
pub struct OriginPattern {
    source: String,
    anchored: Regex,
}

impl OriginPattern {
    /// Compiles `pattern` anchored at both ends, so `b\.com` never matches
    /// `https://b.com.evil.com`.
    pub fn new(pattern: &str) -> Result<Self, CorsError> {
        let anchored = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            CorsError::Configuration(format!("invalid origin pattern '{pattern}': {e}"))
        })?;
        Ok(Self {
            source: pattern.to_string(),
            anchored,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, origin: &str) -> bool {
        self.anchored.is_match(origin)
    }
}

impl fmt::Debug for OriginPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OriginPattern").field(&self.source).finish()
    }
}

/// One entry of an [`OriginPolicy::List`].
#[derive(Clone, Debug)]
pub enum OriginMatcher {
    Exact(String),
    Pattern(OriginPattern),
}

impl OriginMatcher {
    pub fn exact(origin: impl Into<String>) -> Result<Self, CorsError> {
        let origin = origin.into();
        if origin.is_empty() {
            return Err(CorsError::Configuration(
                "exact origin must not be empty".to_string(),
            ));
        }
        Ok(Self::Exact(origin))
    }

    pub fn pattern(pattern: &str) -> Result<Self, CorsError> {
        Ok(Self::Pattern(OriginPattern::new(pattern)?))
    }

    pub(crate) fn matches(&self, origin: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == "*" || expected == origin,
            Self::Pattern(pattern) => pattern.is_match(origin),
        }
    }

    /// An exact `"*"` entry, which matches every origin.
    pub(crate) fn is_wildcard(&self) -> bool {
        matches!(self, Self::Exact(expected) if expected == "*")
    }
}

/// Which request origins receive CORS headers.
#[derive(Clone)]
pub enum OriginPolicy {
    AllowAll,
    Deny,
    Exact(String),
    Pattern(OriginPattern),
    /// Ordered matchers; the first one that matches allows the origin.
    List(Vec<OriginMatcher>),
    Predicate(Arc<dyn OriginPredicate>),
}

impl OriginPolicy {
    /// Exact origin policy. `"*"` is normalized to [`OriginPolicy::AllowAll`].
    pub fn exact(origin: impl Into<String>) -> Result<Self, CorsError> {
        let origin = origin.into();
        match origin.as_str() {
            "" => Err(CorsError::Configuration(
                "exact origin must not be empty".to_string(),
            )),
            "*" => Ok(Self::AllowAll),
            _ => Ok(Self::Exact(origin)),
        }
    }

    pub fn pattern(pattern: &str) -> Result<Self, CorsError> {
        Ok(Self::Pattern(OriginPattern::new(pattern)?))
    }

    pub fn list(matchers: Vec<OriginMatcher>) -> Self {
        Self::List(matchers)
    }

    pub fn predicate<P>(predicate: P) -> Self
    where
        P: OriginPredicate,
    {
        Self::Predicate(Arc::new(predicate))
    }

    /// Wraps a synchronous closure as a predicate policy.
    pub fn predicate_fn<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::predicate(PredicateFn(f))
    }
}

impl Default for OriginPolicy {
    fn default() -> Self {
        Self::AllowAll
    }
}

impl fmt::Debug for OriginPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllowAll => write!(f, "AllowAll"),
            Self::Deny => write!(f, "Deny"),
            Self::Exact(origin) => f.debug_tuple("Exact").field(origin).finish(),
            Self::Pattern(pattern) => f.debug_tuple("Pattern").field(&pattern.as_str()).finish(),
            Self::List(matchers) => f.debug_tuple("List").field(matchers).finish(),
            Self::Predicate(_) => write!(f, "Predicate(<function>)"),
        }
    }
}

/// Outcome of evaluating a request origin against an [`OriginPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsDecision {
    pub allow: bool,
    /// Value for `Access-Control-Allow-Origin` when allowed
    pub header_value: Option<String>,
}

impl CorsDecision {
    pub fn allow(header_value: impl Into<String>) -> Self {
        Self {
            allow: true,
            header_value: Some(header_value.into()),
        }
    }

    pub fn reject() -> Self {
        Self {
            allow: false,
            header_value: None,
        }
    }
}

//! Per-source normalization.
//!
//! A fetch adapter returns whatever its provider returns. The normalizers in
//! this module turn that into a [`SignalRecord`] with a fixed schema per
//! network, and they are the boundary past which no adapter failure travels:
//! missing configuration, transport errors, timeouts and malformed payloads
//! all come out as `Absent` records.

use crate::signals::{
    AbsentReason, Education, FacebookProfile, InstagramProfile, LinkedInProfile, Position,
    SignalRecord, Source, TwitterProfile, UNKNOWN_EMPLOYER,
};
use async_trait::async_trait;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use thiserror::Error;

/// Maximum number of recent microblog posts kept on a profile.
pub const MAX_RECENT_POSTS: usize = 10;

/// Typed failures a fetch adapter can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("profile not found: {0}")]
    NotFound(String),
    #[error("authentication rejected by provider")]
    Unauthorized,
    #[error("rate limited by provider")]
    RateLimited,
    #[error("provider returned status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A data-fetch adapter for one network.
///
/// Implementations own authentication, rate limiting and retries; the
/// engine only sees the raw profile or a typed failure.
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    async fn fetch(&self, identifier: &str) -> Result<Value, FetchError>;
}

/// Fixed per-source schema a raw provider payload is mapped into.
pub trait ProfileSchema: Sized + Send {
    const SOURCE: Source;

    fn from_raw(raw: Value) -> Result<Self, FetchError>;

    /// Coarse employer guess derived from the identifier alone.
    fn employer_hint(_identifier: &str) -> Option<String> {
        None
    }
}

fn decode<T: DeserializeOwned>(raw: Value) -> Result<T, FetchError> {
    if !raw.is_object() {
        return Err(FetchError::Malformed(format!(
            "expected a JSON object, got {}",
            json_kind(&raw)
        )));
    }
    serde_json::from_value(raw).map_err(|e| FetchError::Malformed(e.to_string()))
}

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Normalizer for one network, wrapping an optional adapter.
pub struct SourceNormalizer<P> {
    adapter: Option<Arc<dyn ProfileFetcher>>,
    timeout: Duration,
    _schema: PhantomData<fn() -> P>,
}

impl<P> Clone for SourceNormalizer<P> {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
            timeout: self.timeout,
            _schema: PhantomData,
        }
    }
}

impl<P: ProfileSchema> SourceNormalizer<P> {
    pub fn new(adapter: Option<Arc<dyn ProfileFetcher>>, timeout: Duration) -> Self {
        Self {
            adapter,
            timeout,
            _schema: PhantomData,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.adapter.is_some()
    }

    /// Fetch and normalize one profile. Never fails: every failure becomes
    /// an `Absent` record.
    pub async fn fetch_and_normalize(&self, identifier: &str) -> SignalRecord<P> {
        let Some(adapter) = self.adapter.as_ref() else {
            tracing::debug!(
                "{} adapter not configured, skipping fetch for {}",
                P::SOURCE,
                identifier
            );
            return SignalRecord::absent(AbsentReason::NotConfigured, P::employer_hint(identifier));
        };

        let fetched = match tokio::time::timeout(self.timeout, adapter.fetch(identifier)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        };

        match fetched.and_then(P::from_raw) {
            Ok(profile) => {
                tracing::info!("✓ {} profile fetched for {}", P::SOURCE, identifier);
                SignalRecord::Present(profile)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch {} profile {}: {}",
                    P::SOURCE,
                    identifier,
                    e
                );
                SignalRecord::absent(
                    AbsentReason::FetchFailed {
                        detail: e.to_string(),
                    },
                    P::employer_hint(identifier),
                )
            }
        }
    }
}

// ============ LinkedIn ============

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLinkedIn {
    #[serde(default, deserialize_with = "null_as_default")]
    experiences: Vec<RawExperience>,
    #[serde(default, deserialize_with = "null_as_default")]
    positions: Vec<RawPosition>,
    industry_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    education: Vec<RawEducation>,
    #[serde(default, deserialize_with = "null_as_default")]
    skills: Vec<RawSkill>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExperience {
    company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPosition {
    title: Option<String>,
    company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEducation {
    school_name: Option<String>,
    degree_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSkill {
    Name(String),
    Named { name: String },
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

static COMPANY_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://)?(?:[a-z0-9-]+\.)*linkedin\.com/company/([^/?#]+)")
        .expect("company path regex is valid")
});

/// Humanize the organization slug of a `linkedin.com/company/<slug>` URL.
pub fn employer_from_profile_url(identifier: &str) -> Option<String> {
    let captures = COMPANY_PATH.captures(identifier.trim())?;
    let slug = captures.get(1)?.as_str();

    let words: Vec<String> = slug
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

impl ProfileSchema for LinkedInProfile {
    const SOURCE: Source = Source::LinkedIn;

    fn from_raw(raw: Value) -> Result<Self, FetchError> {
        let raw: RawLinkedIn = decode(raw)?;

        let employer = raw
            .experiences
            .into_iter()
            .next()
            .and_then(|e| non_blank(e.company_name))
            .or_else(|| {
                raw.positions
                    .first()
                    .and_then(|p| non_blank(p.company_name.clone()))
            })
            .unwrap_or_else(|| UNKNOWN_EMPLOYER.to_string());

        Ok(LinkedInProfile {
            employer,
            industry: non_blank(raw.industry_name).unwrap_or_else(|| UNKNOWN_EMPLOYER.to_string()),
            positions: raw
                .positions
                .into_iter()
                .map(|p| Position {
                    title: p.title,
                    company: p.company_name,
                })
                .collect(),
            education: raw
                .education
                .into_iter()
                .map(|e| Education {
                    school: e.school_name,
                    degree: e.degree_name,
                })
                .collect(),
            skills: raw
                .skills
                .into_iter()
                .map(|s| match s {
                    RawSkill::Name(name) | RawSkill::Named { name } => name,
                })
                .collect(),
        })
    }

    fn employer_hint(identifier: &str) -> Option<String> {
        employer_from_profile_url(identifier)
    }
}

// ============ Instagram ============

#[derive(Debug, Deserialize)]
struct RawInstagram {
    followers: Option<u64>,
    followees: Option<u64>,
    mediacount: Option<u64>,
    biography: Option<String>,
}

impl ProfileSchema for InstagramProfile {
    const SOURCE: Source = Source::Instagram;

    fn from_raw(raw: Value) -> Result<Self, FetchError> {
        let raw: RawInstagram = decode(raw)?;
        Ok(InstagramProfile {
            followers: raw.followers,
            following: raw.followees,
            posts_count: raw.mediacount,
            bio: raw.biography,
        })
    }
}

// ============ Facebook ============

#[derive(Debug, Deserialize)]
struct RawFacebook {
    #[serde(rename = "Friends")]
    friends: Option<Value>,
    #[serde(rename = "About")]
    about: Option<String>,
    #[serde(rename = "Posts", default, deserialize_with = "null_as_default")]
    posts: Vec<Value>,
}

impl ProfileSchema for FacebookProfile {
    const SOURCE: Source = Source::Facebook;

    fn from_raw(raw: Value) -> Result<Self, FetchError> {
        let raw: RawFacebook = decode(raw)?;

        let friends = match raw.friends {
            None | Some(Value::Null) => "Unknown".to_string(),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        };

        Ok(FacebookProfile {
            friends,
            about: non_blank(raw.about).unwrap_or_else(|| "No information available".to_string()),
            posts_count: raw.posts.len() as u64,
        })
    }
}

// ============ Twitter ============

#[derive(Debug, Deserialize)]
struct RawTwitter {
    #[serde(default, deserialize_with = "null_as_default")]
    followers_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    friends_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    statuses_count: u64,
    description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    recent_tweets: Vec<RawTweet>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTweet {
    Text(String),
    Content {
        #[serde(alias = "text")]
        content: String,
    },
}

impl ProfileSchema for TwitterProfile {
    const SOURCE: Source = Source::Twitter;

    fn from_raw(raw: Value) -> Result<Self, FetchError> {
        let raw: RawTwitter = decode(raw)?;
        Ok(TwitterProfile {
            followers: raw.followers_count,
            following: raw.friends_count,
            posts_count: raw.statuses_count,
            description: raw.description,
            recent_posts: raw
                .recent_tweets
                .into_iter()
                .take(MAX_RECENT_POSTS)
                .map(|t| match t {
                    RawTweet::Text(text) | RawTweet::Content { content: text } => text,
                })
                .collect(),
        })
    }
}

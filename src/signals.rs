use serde::{Deserialize, Serialize};
use std::fmt;

/// External networks a lead can be enriched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Professional network.
    LinkedIn,
    /// Photo-sharing network.
    Instagram,
    /// General social network.
    Facebook,
    /// Microblogging network.
    Twitter,
}

impl Source {
    /// Human-readable network name used in reasons, summaries and logs.
    pub fn display_name(self) -> &'static str {
        match self {
            Source::LinkedIn => "LinkedIn",
            Source::Instagram => "Instagram",
            Source::Facebook => "Facebook",
            Source::Twitter => "Twitter",
        }
    }

    /// Prefix of the environment variables configuring this network's provider.
    pub fn env_prefix(self) -> &'static str {
        match self {
            Source::LinkedIn => "LINKEDIN",
            Source::Instagram => "INSTAGRAM",
            Source::Facebook => "FACEBOOK",
            Source::Twitter => "TWITTER",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Why a profile is missing from a lead's signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum AbsentReason {
    /// The lead supplied no identifier for this network.
    NotRequested,
    /// No fetch adapter is configured for this network.
    NotConfigured,
    /// The adapter ran and failed.
    FetchFailed { detail: String },
}

/// Result of attempting to fetch one external profile.
///
/// Every consumer has to handle both shapes; there is no partially
/// populated state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignalRecord<P> {
    Present(P),
    Absent {
        reason: AbsentReason,
        /// Employer guessed from the identifier itself (professional network only).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        employer_hint: Option<String>,
    },
}

impl<P> SignalRecord<P> {
    pub fn not_requested() -> Self {
        SignalRecord::Absent {
            reason: AbsentReason::NotRequested,
            employer_hint: None,
        }
    }

    pub fn absent(reason: AbsentReason, employer_hint: Option<String>) -> Self {
        SignalRecord::Absent {
            reason,
            employer_hint,
        }
    }

    pub fn present(&self) -> Option<&P> {
        match self {
            SignalRecord::Present(profile) => Some(profile),
            SignalRecord::Absent { .. } => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, SignalRecord::Present(_))
    }

    /// The degraded employer guess, only ever set on absent records.
    pub fn employer_hint(&self) -> Option<&str> {
        match self {
            SignalRecord::Absent { employer_hint, .. } => employer_hint.as_deref(),
            SignalRecord::Present(_) => None,
        }
    }

    /// Failure detail when the adapter ran and failed.
    pub fn failure_detail(&self) -> Option<&str> {
        match self {
            SignalRecord::Absent {
                reason: AbsentReason::FetchFailed { detail },
                ..
            } => Some(detail),
            _ => None,
        }
    }
}

/// Literal used when no employer can be determined.
pub const UNKNOWN_EMPLOYER: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub title: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub school: Option<String>,
    pub degree: Option<String>,
}

/// Professional-network profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedInProfile {
    /// Current employer, `"Unknown"` when the profile names none.
    pub employer: String,
    pub industry: String,
    pub positions: Vec<Position>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
}

impl LinkedInProfile {
    /// Whether the employer came from the profile rather than the default.
    pub fn has_employer(&self) -> bool {
        self.employer != UNKNOWN_EMPLOYER
    }
}

/// Photo-sharing profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstagramProfile {
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub posts_count: Option<u64>,
    pub bio: Option<String>,
}

/// General social-network profile.
///
/// The friend count is kept as the provider reported it ("1,204",
/// "Unknown", ...) and parsed at scoring time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacebookProfile {
    pub friends: String,
    pub about: String,
    pub posts_count: u64,
}

/// Microblogging profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwitterProfile {
    pub followers: u64,
    pub following: u64,
    pub posts_count: u64,
    pub description: Option<String>,
    /// Most recent posts, newest first, capped by the normalizer.
    pub recent_posts: Vec<String>,
}

/// The four signal records gathered for one lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadSignals {
    pub linkedin: SignalRecord<LinkedInProfile>,
    pub instagram: SignalRecord<InstagramProfile>,
    pub facebook: SignalRecord<FacebookProfile>,
    pub twitter: SignalRecord<TwitterProfile>,
}

impl LeadSignals {
    /// Signals for a lead that supplied no identifiers at all.
    pub fn none_requested() -> Self {
        Self {
            linkedin: SignalRecord::not_requested(),
            instagram: SignalRecord::not_requested(),
            facebook: SignalRecord::not_requested(),
            twitter: SignalRecord::not_requested(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_record_serializes_reason_code() {
        let record: SignalRecord<InstagramProfile> = SignalRecord::absent(
            AbsentReason::FetchFailed {
                detail: "profile not found".to_string(),
            },
            None,
        );

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "absent",
                "reason": {"code": "fetch_failed", "detail": "profile not found"}
            })
        );
    }

    #[test]
    fn employer_hint_only_on_absent_records() {
        let record: SignalRecord<LinkedInProfile> =
            SignalRecord::absent(AbsentReason::NotConfigured, Some("Acme".to_string()));
        assert_eq!(record.employer_hint(), Some("Acme"));
        assert!(!record.is_present());
        assert_eq!(record.failure_detail(), None);

        let present = SignalRecord::Present(LinkedInProfile {
            employer: "Acme".to_string(),
            industry: UNKNOWN_EMPLOYER.to_string(),
            positions: vec![],
            education: vec![],
            skills: vec![],
        });
        assert_eq!(present.employer_hint(), None);
        assert!(present.present().unwrap().has_employer());
    }
}

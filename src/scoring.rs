use crate::models::Lead;
use crate::signals::LeadSignals;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Upper bound of the qualification score.
pub const MAX_SCORE: f64 = 100.0;

/// Tunable scoring constants.
///
/// Every divisor and cap is policy, not law: the defaults reproduce the
/// production weights and each one can be overridden from the environment
/// (see `Config::from_env`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub income_divisor: f64,
    pub income_cap: f64,
    pub work_email_bonus: f64,
    pub skill_weight: f64,
    pub position_weight: f64,
    pub professional_cap: f64,
    /// Flat bonus when only a URL-derived employer guess is available.
    pub professional_fallback_bonus: f64,
    pub photo_follower_scale: f64,
    pub photo_cap: f64,
    pub social_friend_scale: f64,
    pub social_cap: f64,
    pub micro_follower_scale: f64,
    pub micro_cap: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            income_divisor: 10_000.0,
            income_cap: 50.0,
            work_email_bonus: 10.0,
            skill_weight: 0.5,
            position_weight: 2.0,
            professional_cap: 20.0,
            professional_fallback_bonus: 5.0,
            photo_follower_scale: 1_000.0,
            photo_cap: 10.0,
            social_friend_scale: 100.0,
            social_cap: 5.0,
            micro_follower_scale: 1_000.0,
            micro_cap: 5.0,
        }
    }
}

/// One scoring rule's contribution to the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReason {
    pub label: String,
    pub points: f64,
}

impl fmt::Display for ScoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: +{:.1} points", self.label, self.points)
    }
}

/// Total score plus the audit trail of rules that produced it, in
/// evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub total: f64,
    pub reasons: Vec<ScoreReason>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("malformed income '{0}'")]
    MalformedIncome(String),
}

static INCOME_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$?\s*(\d{1,3}(?:,\d{3})+|\d+)(\.\d+)?\s*([KkMm])?$")
        .expect("income regex is valid")
});

fn parse_amount(raw: &str, original: &str) -> Result<f64, ScoringError> {
    let malformed = || ScoringError::MalformedIncome(original.to_string());

    let captures = INCOME_AMOUNT.captures(raw.trim()).ok_or_else(malformed)?;
    let whole = captures.get(1).map(|m| m.as_str().replace(',', "")).ok_or_else(malformed)?;
    let fraction = captures.get(2).map_or("", |m| m.as_str());

    let value: f64 = format!("{}{}", whole, fraction)
        .parse()
        .map_err(|_| malformed())?;

    let multiplier = match captures.get(3).map(|m| m.as_str()) {
        Some("K") | Some("k") => 1_000.0,
        Some("M") | Some("m") => 1_000_000.0,
        _ => 1.0,
    };

    Ok(value * multiplier)
}

/// Parse an income string such as `"$85K"`, `"$40K - $60K"` or `"72000"`.
///
/// Ranges resolve to their lower bound; the upper bound still has to parse.
pub fn parse_income(income: &str) -> Result<f64, ScoringError> {
    match income.split_once('-') {
        Some((lower, upper)) => {
            let lower_value = parse_amount(lower, income)?;
            parse_amount(upper, income)?;
            Ok(lower_value)
        }
        None => parse_amount(income, income),
    }
}

/// Parse a friend count such as `"1,204"` or `"350"`.
///
/// Returns `None` for `"Unknown"` and anything else non-numeric.
pub fn parse_friend_count(raw: &str) -> Option<u64> {
    let digits: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn capped(value: f64, cap: f64) -> f64 {
    value.min(cap).max(0.0)
}

/// Score a lead from its attributes and gathered signals.
///
/// Rules run in a fixed order (income, work email, professional network,
/// photo sharing, general social, microblogging) and each appends at most
/// one reason.
pub fn score_lead(
    lead: &Lead,
    signals: &LeadSignals,
    work_domain: Option<&str>,
    policy: &ScoringPolicy,
) -> Result<Scorecard, ScoringError> {
    let mut reasons = Vec::new();

    let income = parse_income(&lead.income)?;
    reasons.push(ScoreReason {
        label: "Income".to_string(),
        points: capped(income / policy.income_divisor, policy.income_cap),
    });

    if let Some(domain) = work_domain {
        reasons.push(ScoreReason {
            label: format!("Work email domain ({})", domain),
            points: policy.work_email_bonus.max(0.0),
        });
    }

    if let Some(profile) = signals.linkedin.present() {
        let raw = profile.skills.len() as f64 * policy.skill_weight
            + profile.positions.len() as f64 * policy.position_weight;
        reasons.push(ScoreReason {
            label: "LinkedIn profile".to_string(),
            points: capped(raw, policy.professional_cap),
        });
    } else if let Some(hint) = signals.linkedin.employer_hint() {
        reasons.push(ScoreReason {
            label: format!("LinkedIn employer hint ({})", hint),
            points: policy.professional_fallback_bonus.max(0.0),
        });
    }

    if let Some(followers) = signals.instagram.present().and_then(|p| p.followers) {
        reasons.push(ScoreReason {
            label: "Instagram followers".to_string(),
            points: capped(followers as f64 / policy.photo_follower_scale, policy.photo_cap),
        });
    }

    if let Some(profile) = signals.facebook.present() {
        match parse_friend_count(&profile.friends) {
            Some(friends) => reasons.push(ScoreReason {
                label: "Facebook friends".to_string(),
                points: capped(friends as f64 / policy.social_friend_scale, policy.social_cap),
            }),
            None => {
                tracing::warn!("Invalid Facebook friends value: {}", profile.friends);
            }
        }
    }

    if let Some(profile) = signals.twitter.present() {
        reasons.push(ScoreReason {
            label: "Twitter followers".to_string(),
            points: capped(
                profile.followers as f64 / policy.micro_follower_scale,
                policy.micro_cap,
            ),
        });
    }

    let total = reasons
        .iter()
        .map(|r| r.points)
        .sum::<f64>()
        .clamp(0.0, MAX_SCORE);

    Ok(Scorecard { total, reasons })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{
        AbsentReason, FacebookProfile, InstagramProfile, LinkedInProfile, Position,
        SignalRecord, TwitterProfile,
    };

    fn lead(income: &str) -> Lead {
        Lead {
            id: 7,
            name: "Jane Doe".to_string(),
            age: 34,
            email: "jane@gmail.com".to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            income: income.to_string(),
            linkedin_url: None,
            instagram_username: None,
            facebook_url: None,
            twitter_username: None,
        }
    }

    fn linkedin(skills: usize, positions: usize) -> LinkedInProfile {
        LinkedInProfile {
            employer: "Acme".to_string(),
            industry: "Software".to_string(),
            positions: (0..positions)
                .map(|_| Position {
                    title: None,
                    company: None,
                })
                .collect(),
            education: vec![],
            skills: (0..skills).map(|i| format!("skill {}", i)).collect(),
        }
    }

    #[test]
    fn parses_income_formats() {
        assert_eq!(parse_income("$85K").unwrap(), 85_000.0);
        assert_eq!(parse_income("85k").unwrap(), 85_000.0);
        assert_eq!(parse_income("$1.5M").unwrap(), 1_500_000.0);
        assert_eq!(parse_income("72000").unwrap(), 72_000.0);
        assert_eq!(parse_income("$120,000").unwrap(), 120_000.0);
        assert_eq!(parse_income("$40K - $60K").unwrap(), 40_000.0);
        assert_eq!(parse_income("$40K-$60K").unwrap(), 40_000.0);
    }

    #[test]
    fn range_uses_lower_bound() {
        assert_eq!(
            parse_income("$50K - $70K").unwrap(),
            parse_income("$50K").unwrap()
        );
    }

    #[test]
    fn malformed_income_is_an_error() {
        for bad in ["", "lots", "$", "$50K - ", "- $50K", "50KK", "$5O,000", "1,00"] {
            assert_eq!(
                parse_income(bad),
                Err(ScoringError::MalformedIncome(bad.to_string())),
                "{:?}",
                bad
            );
        }
    }

    #[test]
    fn friend_counts_parse_defensively() {
        assert_eq!(parse_friend_count("1,204"), Some(1204));
        assert_eq!(parse_friend_count("350"), Some(350));
        assert_eq!(parse_friend_count("Unknown"), None);
        assert_eq!(parse_friend_count("about 300"), None);
        assert_eq!(parse_friend_count(""), None);
    }

    #[test]
    fn income_only_when_no_signals() {
        let card = score_lead(
            &lead("$85K"),
            &LeadSignals::none_requested(),
            None,
            &ScoringPolicy::default(),
        )
        .unwrap();

        assert_eq!(card.reasons.len(), 1);
        assert_eq!(card.reasons[0].to_string(), "Income: +8.5 points");
        assert_eq!(card.total, 8.5);
    }

    #[test]
    fn income_contribution_is_capped() {
        let card = score_lead(
            &lead("$2M"),
            &LeadSignals::none_requested(),
            None,
            &ScoringPolicy::default(),
        )
        .unwrap();
        assert_eq!(card.total, 50.0);
    }

    #[test]
    fn rules_appear_in_evaluation_order() {
        let signals = LeadSignals {
            linkedin: SignalRecord::Present(linkedin(4, 3)),
            instagram: SignalRecord::Present(InstagramProfile {
                followers: Some(2_500),
                following: None,
                posts_count: None,
                bio: None,
            }),
            facebook: SignalRecord::Present(FacebookProfile {
                friends: "250".to_string(),
                about: String::new(),
                posts_count: 0,
            }),
            twitter: SignalRecord::Present(TwitterProfile {
                followers: 1_200,
                following: 0,
                posts_count: 0,
                description: None,
                recent_posts: vec![],
            }),
        };

        let card = score_lead(
            &lead("$60K"),
            &signals,
            Some("acme.com"),
            &ScoringPolicy::default(),
        )
        .unwrap();

        let rendered: Vec<String> = card.reasons.iter().map(|r| r.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "Income: +6.0 points",
                "Work email domain (acme.com): +10.0 points",
                "LinkedIn profile: +8.0 points",
                "Instagram followers: +2.5 points",
                "Facebook friends: +2.5 points",
                "Twitter followers: +1.2 points",
            ]
        );
        assert!((card.total - 30.2).abs() < 1e-9);
    }

    #[test]
    fn professional_bonus_is_capped() {
        let signals = LeadSignals {
            linkedin: SignalRecord::Present(linkedin(40, 10)),
            ..LeadSignals::none_requested()
        };
        let card = score_lead(&lead("0"), &signals, None, &ScoringPolicy::default()).unwrap();
        assert_eq!(card.reasons[1].points, 20.0);
    }

    #[test]
    fn employer_hint_earns_fallback_bonus() {
        let signals = LeadSignals {
            linkedin: SignalRecord::absent(
                AbsentReason::FetchFailed {
                    detail: "timed out".to_string(),
                },
                Some("Acme Corp".to_string()),
            ),
            ..LeadSignals::none_requested()
        };
        let card = score_lead(&lead("0"), &signals, None, &ScoringPolicy::default()).unwrap();

        assert_eq!(
            card.reasons[1].to_string(),
            "LinkedIn employer hint (Acme Corp): +5.0 points"
        );
    }

    #[test]
    fn absent_linkedin_without_hint_earns_nothing() {
        let signals = LeadSignals {
            linkedin: SignalRecord::absent(AbsentReason::NotConfigured, None),
            ..LeadSignals::none_requested()
        };
        let card = score_lead(&lead("0"), &signals, None, &ScoringPolicy::default()).unwrap();
        assert_eq!(card.reasons.len(), 1);
    }

    #[test]
    fn unknown_friend_count_adds_no_reason() {
        let signals = LeadSignals {
            facebook: SignalRecord::Present(FacebookProfile {
                friends: "Unknown".to_string(),
                about: String::new(),
                posts_count: 3,
            }),
            ..LeadSignals::none_requested()
        };
        let card = score_lead(&lead("$10K"), &signals, None, &ScoringPolicy::default()).unwrap();

        assert_eq!(card.reasons.len(), 1);
        assert_eq!(card.total, 1.0);
    }

    #[test]
    fn instagram_without_follower_count_is_skipped() {
        let signals = LeadSignals {
            instagram: SignalRecord::Present(InstagramProfile {
                followers: None,
                following: Some(10),
                posts_count: Some(4),
                bio: None,
            }),
            ..LeadSignals::none_requested()
        };
        let card = score_lead(&lead("$10K"), &signals, None, &ScoringPolicy::default()).unwrap();
        assert_eq!(card.reasons.len(), 1);
    }

    #[test]
    fn total_is_clamped_to_one_hundred() {
        let policy = ScoringPolicy {
            income_cap: 90.0,
            work_email_bonus: 30.0,
            ..ScoringPolicy::default()
        };
        let card = score_lead(&lead("$5M"), &LeadSignals::none_requested(), Some("acme.com"), &policy)
            .unwrap();
        assert_eq!(card.total, MAX_SCORE);
    }

    #[test]
    fn malformed_income_fails_the_lead() {
        let err = score_lead(
            &lead("a lot"),
            &LeadSignals::none_requested(),
            None,
            &ScoringPolicy::default(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "malformed income 'a lot'");
    }
}

use crate::qualification::{DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_CONCURRENT_LEADS};
use crate::scoring::ScoringPolicy;
use crate::signals::Source;
use serde::Deserialize;
use std::time::Duration;

/// Where one network's profile provider lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub fetch_timeout: Duration,
    pub max_concurrent_leads: usize,
    pub linkedin: Option<ProviderEndpoint>,
    pub instagram: Option<ProviderEndpoint>,
    pub facebook: Option<ProviderEndpoint>,
    pub twitter: Option<ProviderEndpoint>,
    pub scoring: ScoringPolicy,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn positive_integer<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(raw) = non_empty_var(name) else {
        return Ok(default);
    };
    let value: T = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{} must be a number, got '{}'", name, raw))?;
    if value <= T::default() {
        anyhow::bail!("{} must be greater than zero", name);
    }
    Ok(value)
}

fn positive_f64(name: &str, default: f64) -> anyhow::Result<f64> {
    let value = non_negative_f64(name, default)?;
    if value == 0.0 {
        anyhow::bail!("{} must be greater than zero", name);
    }
    Ok(value)
}

fn non_negative_f64(name: &str, default: f64) -> anyhow::Result<f64> {
    let Some(raw) = non_empty_var(name) else {
        return Ok(default);
    };
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{} must be a number, got '{}'", name, raw))?;
    if !value.is_finite() || value < 0.0 {
        anyhow::bail!("{} must be a finite, non-negative number", name);
    }
    Ok(value)
}

fn provider_endpoint(source: Source) -> anyhow::Result<Option<ProviderEndpoint>> {
    let url_var = format!("{}_API_URL", source.env_prefix());
    let token_var = format!("{}_API_TOKEN", source.env_prefix());

    let Some(base_url) = non_empty_var(&url_var) else {
        return Ok(None);
    };
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", url_var);
    }

    Ok(Some(ProviderEndpoint {
        base_url,
        token: non_empty_var(&token_var),
    }))
}

impl ScoringPolicy {
    /// Default policy with any `SCORE_*` environment overrides applied.
    pub fn from_env() -> anyhow::Result<Self> {
        let d = ScoringPolicy::default();
        Ok(Self {
            income_divisor: positive_f64("SCORE_INCOME_DIVISOR", d.income_divisor)?,
            income_cap: non_negative_f64("SCORE_INCOME_CAP", d.income_cap)?,
            work_email_bonus: non_negative_f64("SCORE_WORK_EMAIL_BONUS", d.work_email_bonus)?,
            skill_weight: non_negative_f64("SCORE_SKILL_WEIGHT", d.skill_weight)?,
            position_weight: non_negative_f64("SCORE_POSITION_WEIGHT", d.position_weight)?,
            professional_cap: non_negative_f64("SCORE_PROFESSIONAL_CAP", d.professional_cap)?,
            professional_fallback_bonus: non_negative_f64(
                "SCORE_PROFESSIONAL_FALLBACK_BONUS",
                d.professional_fallback_bonus,
            )?,
            photo_follower_scale: positive_f64(
                "SCORE_PHOTO_FOLLOWER_SCALE",
                d.photo_follower_scale,
            )?,
            photo_cap: non_negative_f64("SCORE_PHOTO_CAP", d.photo_cap)?,
            social_friend_scale: positive_f64(
                "SCORE_SOCIAL_FRIEND_SCALE",
                d.social_friend_scale,
            )?,
            social_cap: non_negative_f64("SCORE_SOCIAL_CAP", d.social_cap)?,
            micro_follower_scale: positive_f64(
                "SCORE_MICRO_FOLLOWER_SCALE",
                d.micro_follower_scale,
            )?,
            micro_cap: non_negative_f64("SCORE_MICRO_CAP", d.micro_cap)?,
        })
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "9990".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            fetch_timeout: Duration::from_secs(positive_integer(
                "FETCH_TIMEOUT_SECS",
                DEFAULT_FETCH_TIMEOUT.as_secs(),
            )?),
            max_concurrent_leads: positive_integer(
                "MAX_CONCURRENT_LEADS",
                DEFAULT_MAX_CONCURRENT_LEADS,
            )?,
            linkedin: provider_endpoint(Source::LinkedIn)?,
            instagram: provider_endpoint(Source::Instagram)?,
            facebook: provider_endpoint(Source::Facebook)?,
            twitter: provider_endpoint(Source::Twitter)?,
            scoring: ScoringPolicy::from_env()?,
        };

        // Log successful configuration load (without tokens)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!("Fetch timeout: {:?}", config.fetch_timeout);
        for (source, endpoint) in config.endpoints() {
            match endpoint {
                Some(e) => tracing::info!("{} provider configured: {}", source, e.base_url),
                None => tracing::warn!("{} provider not configured, profiles will be skipped", source),
            }
        }

        Ok(config)
    }

    /// Provider endpoints paired with their network.
    pub fn endpoints(&self) -> [(Source, Option<&ProviderEndpoint>); 4] {
        [
            (Source::LinkedIn, self.linkedin.as_ref()),
            (Source::Instagram, self.instagram.as_ref()),
            (Source::Facebook, self.facebook.as_ref()),
            (Source::Twitter, self.twitter.as_ref()),
        ]
    }
}

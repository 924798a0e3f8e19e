//! Lead qualification workflow shared by the HTTP handler and tests.
//!
//! For each lead:
//! 1. Fetch the four external profiles concurrently (skipping any the lead did not ask for)
//! 2. Classify the email domain
//! 3. Infer the current employer
//! 4. Score the lead
//! 5. Render the summary
//!
//! Leads in a batch are independent and run with bounded concurrency.
use crate::domain_classifier::classify_work_domain;
use crate::employment::infer_employment;
use crate::models::{Lead, LeadOutcome, QualifiedLead};
use crate::normalizers::{ProfileFetcher, ProfileSchema, SourceNormalizer};
use crate::scoring::{score_lead, ScoringError, ScoringPolicy};
use crate::signals::{
    FacebookProfile, InstagramProfile, LeadSignals, LinkedInProfile, SignalRecord, Source,
    TwitterProfile,
};
use crate::summary::render_summary;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Default per-source fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
/// Default number of leads processed at once within a batch.
pub const DEFAULT_MAX_CONCURRENT_LEADS: usize = 8;

/// Optional fetch adapters, one per network. `None` means not configured.
#[derive(Clone, Default)]
pub struct SourceAdapters {
    pub linkedin: Option<Arc<dyn ProfileFetcher>>,
    pub instagram: Option<Arc<dyn ProfileFetcher>>,
    pub facebook: Option<Arc<dyn ProfileFetcher>>,
    pub twitter: Option<Arc<dyn ProfileFetcher>>,
}

impl SourceAdapters {
    pub fn with_linkedin(mut self, adapter: Arc<dyn ProfileFetcher>) -> Self {
        self.linkedin = Some(adapter);
        self
    }

    pub fn with_instagram(mut self, adapter: Arc<dyn ProfileFetcher>) -> Self {
        self.instagram = Some(adapter);
        self
    }

    pub fn with_facebook(mut self, adapter: Arc<dyn ProfileFetcher>) -> Self {
        self.facebook = Some(adapter);
        self
    }

    pub fn with_twitter(mut self, adapter: Arc<dyn ProfileFetcher>) -> Self {
        self.twitter = Some(adapter);
        self
    }
}

/// Runtime knobs of the qualifier.
#[derive(Debug, Clone)]
pub struct QualifierSettings {
    pub policy: ScoringPolicy,
    pub fetch_timeout: Duration,
    pub max_concurrent_leads: usize,
}

impl Default for QualifierSettings {
    fn default() -> Self {
        Self {
            policy: ScoringPolicy::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_concurrent_leads: DEFAULT_MAX_CONCURRENT_LEADS,
        }
    }
}

/// Stateless orchestrator; safe to share across requests.
#[derive(Clone)]
pub struct LeadQualifier {
    linkedin: SourceNormalizer<LinkedInProfile>,
    instagram: SourceNormalizer<InstagramProfile>,
    facebook: SourceNormalizer<FacebookProfile>,
    twitter: SourceNormalizer<TwitterProfile>,
    policy: ScoringPolicy,
    max_concurrent_leads: usize,
}

async fn fetch_if_requested<P: ProfileSchema>(
    normalizer: &SourceNormalizer<P>,
    identifier: Option<&str>,
) -> SignalRecord<P> {
    match identifier.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => normalizer.fetch_and_normalize(id).await,
        None => SignalRecord::not_requested(),
    }
}

impl LeadQualifier {
    pub fn new(adapters: SourceAdapters, settings: QualifierSettings) -> Self {
        let timeout = settings.fetch_timeout;
        Self {
            linkedin: SourceNormalizer::new(adapters.linkedin, timeout),
            instagram: SourceNormalizer::new(adapters.instagram, timeout),
            facebook: SourceNormalizer::new(adapters.facebook, timeout),
            twitter: SourceNormalizer::new(adapters.twitter, timeout),
            policy: settings.policy,
            max_concurrent_leads: settings.max_concurrent_leads.max(1),
        }
    }

    /// Names of the networks that have an adapter configured.
    pub fn configured_sources(&self) -> Vec<&'static str> {
        [
            (Source::LinkedIn.display_name(), self.linkedin.is_configured()),
            (Source::Instagram.display_name(), self.instagram.is_configured()),
            (Source::Facebook.display_name(), self.facebook.is_configured()),
            (Source::Twitter.display_name(), self.twitter.is_configured()),
        ]
        .into_iter()
        .filter_map(|(name, configured)| configured.then_some(name))
        .collect()
    }

    /// Fetch all four signal records for a lead concurrently.
    pub async fn gather_signals(&self, lead: &Lead) -> LeadSignals {
        let (linkedin, instagram, facebook, twitter) = tokio::join!(
            fetch_if_requested(&self.linkedin, lead.linkedin_url.as_deref()),
            fetch_if_requested(&self.instagram, lead.instagram_username.as_deref()),
            fetch_if_requested(&self.facebook, lead.facebook_url.as_deref()),
            fetch_if_requested(&self.twitter, lead.twitter_username.as_deref()),
        );

        LeadSignals {
            linkedin,
            instagram,
            facebook,
            twitter,
        }
    }

    /// Qualify a single lead.
    pub async fn qualify_lead(&self, lead: &Lead) -> Result<QualifiedLead, ScoringError> {
        let signals = self.gather_signals(lead).await;
        self.assemble(lead, signals)
    }

    /// Everything after the fetches: classification, inference, scoring
    /// and rendering. Pure given its inputs.
    pub fn assemble(&self, lead: &Lead, signals: LeadSignals) -> Result<QualifiedLead, ScoringError> {
        let work_domain = classify_work_domain(&lead.email);
        let employment = infer_employment(&signals.linkedin, work_domain.as_deref());
        let scorecard = score_lead(lead, &signals, work_domain.as_deref(), &self.policy)?;
        let summary = render_summary(lead, &scorecard, &employment, &signals);

        tracing::info!(
            "Lead {} scored {:.1} ({} reasons, employment: {})",
            lead.id,
            scorecard.total,
            scorecard.reasons.len(),
            employment
        );

        Ok(QualifiedLead {
            lead: lead.clone(),
            linkedin: signals.linkedin,
            instagram: signals.instagram,
            facebook: signals.facebook,
            twitter: signals.twitter,
            employment,
            score: scorecard.total,
            reasons: scorecard.reasons,
            qualification_summary: summary,
        })
    }

    /// Qualify a batch; results come back in input order.
    ///
    /// A lead that cannot be scored becomes a `Failed` outcome and the rest
    /// of the batch carries on. Dropping the returned future abandons any
    /// in-flight fetches.
    pub async fn qualify_batch(&self, leads: Vec<Lead>) -> Vec<LeadOutcome> {
        tracing::info!("Qualifying batch of {} lead(s)", leads.len());

        let outcomes: Vec<LeadOutcome> = stream::iter(leads)
            .map(|lead| {
                let span = tracing::info_span!("qualify_lead", lead_id = lead.id);
                async move {
                    match self.qualify_lead(&lead).await {
                        Ok(qualified) => LeadOutcome::Qualified(Box::new(qualified)),
                        Err(e) => {
                            tracing::error!("Failed to qualify lead {}: {}", lead.id, e);
                            LeadOutcome::Failed {
                                id: lead.id,
                                error: e.to_string(),
                            }
                        }
                    }
                }
                .instrument(span)
            })
            .buffered(self.max_concurrent_leads)
            .collect()
            .await;

        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, LeadOutcome::Failed { .. }))
            .count();
        tracing::info!(
            "Batch complete: {} qualified, {} failed",
            outcomes.len() - failed,
            failed
        );

        outcomes
    }
}

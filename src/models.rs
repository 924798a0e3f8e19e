use crate::scoring::ScoreReason;
use crate::signals::{
    FacebookProfile, InstagramProfile, LinkedInProfile, SignalRecord, TwitterProfile,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============ Input Models ============

/// A sales lead as received. Immutable once validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub name: String,
    pub age: u32,
    pub email: String,
    pub city: String,
    pub state: String,
    /// Income as written by the lead source: `"$85K"`, `"$40K - $60K"`, `"72000"`.
    pub income: String,
    pub linkedin_url: Option<String>,
    pub instagram_username: Option<String>,
    pub facebook_url: Option<String>,
    pub twitter_username: Option<String>,
}

/// Raw lead payload before validation.
///
/// Every field is optional here so that a missing field can be reported
/// by name instead of surfacing as a generic deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadInput {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub age: Option<u32>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub income: Option<String>,
    pub linkedin_url: Option<String>,
    pub instagram_username: Option<String>,
    pub facebook_url: Option<String>,
    pub twitter_username: Option<String>,
}

fn required_text(value: Option<String>, field: &str, missing: &mut Vec<String>) -> String {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) => v,
        None => {
            missing.push(field.to_string());
            String::new()
        }
    }
}

fn optional_identifier(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl LeadInput {
    /// Validate into a [`Lead`], or list the missing required fields.
    ///
    /// Blank optional identifiers are treated as not supplied.
    pub fn validate(self) -> Result<Lead, Vec<String>> {
        let mut missing = Vec::new();

        if self.id.is_none() {
            missing.push("id".to_string());
        }
        let name = required_text(self.name, "name", &mut missing);
        if self.age.is_none() {
            missing.push("age".to_string());
        }
        let email = required_text(self.email, "email", &mut missing);
        let city = required_text(self.city, "city", &mut missing);
        let state = required_text(self.state, "state", &mut missing);
        let income = required_text(self.income, "income", &mut missing);

        match (self.id, self.age) {
            (Some(id), Some(age)) if missing.is_empty() => Ok(Lead {
                id,
                name,
                age,
                email,
                city,
                state,
                income,
                linkedin_url: optional_identifier(self.linkedin_url),
                instagram_username: optional_identifier(self.instagram_username),
                facebook_url: optional_identifier(self.facebook_url),
                twitter_username: optional_identifier(self.twitter_username),
            }),
            _ => Err(missing),
        }
    }
}

/// Parse a raw request body into validated leads.
///
/// The whole batch is rejected if the body is not an array of objects or
/// if any lead misses a required field.
pub fn parse_lead_batch(body: Value) -> Result<Vec<Lead>, String> {
    let Value::Array(items) = body else {
        return Err("request body must be a JSON array of leads".to_string());
    };

    let mut leads = Vec::with_capacity(items.len());
    let mut problems = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        let input: LeadInput = match serde_json::from_value(item) {
            Ok(input) => input,
            Err(e) => {
                problems.push(format!("lead[{}]: {}", index, e));
                continue;
            }
        };

        match input.validate() {
            Ok(lead) => leads.push(lead),
            Err(missing) => problems.push(format!(
                "lead[{}]: missing required field(s): {}",
                index,
                missing.join(", ")
            )),
        }
    }

    if problems.is_empty() {
        Ok(leads)
    } else {
        Err(problems.join("; "))
    }
}

// ============ Output Models ============

/// A lead with its signals, score and rendered report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualifiedLead {
    #[serde(flatten)]
    pub lead: Lead,
    pub linkedin: SignalRecord<LinkedInProfile>,
    pub instagram: SignalRecord<InstagramProfile>,
    pub facebook: SignalRecord<FacebookProfile>,
    pub twitter: SignalRecord<TwitterProfile>,
    pub employment: String,
    pub score: f64,
    pub reasons: Vec<ScoreReason>,
    pub qualification_summary: String,
}

/// Per-lead result of a batch, in the same position as the input lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LeadOutcome {
    Qualified(Box<QualifiedLead>),
    Failed { id: i64, error: String },
}

impl LeadOutcome {
    pub fn id(&self) -> i64 {
        match self {
            LeadOutcome::Qualified(q) => q.lead.id,
            LeadOutcome::Failed { id, .. } => *id,
        }
    }

    pub fn qualified(&self) -> Option<&QualifiedLead> {
        match self {
            LeadOutcome::Qualified(q) => Some(q),
            LeadOutcome::Failed { .. } => None,
        }
    }
}

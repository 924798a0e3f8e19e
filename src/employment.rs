use crate::signals::{LinkedInProfile, SignalRecord, UNKNOWN_EMPLOYER};

/// Resolve a lead's most likely employer.
///
/// Precedence: employer from a fetched professional profile, then the
/// employer guessed from the profile URL, then the work-email domain, then
/// `"Unknown"`. A fetched profile that names no employer does not shadow
/// the weaker sources.
pub fn infer_employment(
    linkedin: &SignalRecord<LinkedInProfile>,
    work_domain: Option<&str>,
) -> String {
    let from_profile = linkedin
        .present()
        .filter(|p| p.has_employer())
        .map(|p| p.employer.as_str());

    from_profile
        .or_else(|| linkedin.employer_hint())
        .or(work_domain)
        .unwrap_or(UNKNOWN_EMPLOYER)
        .to_string()
}

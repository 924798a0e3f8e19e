use std::net::IpAddr;

/// Email providers whose addresses say nothing about an employer.
pub const PERSONAL_EMAIL_DOMAINS: [&str; 5] = [
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "aol.com",
];

/// Classify an email address as a work address.
///
/// Returns the registrable domain (label + public suffix, e.g. `acme.co.uk`
/// for `jane@mail.acme.co.uk`) when it is not a known personal provider.
/// Malformed addresses yield `None`; callers decide whether that matters.
pub fn classify_work_domain(email: &str) -> Option<String> {
    let domain = registrable_domain(email)?;

    if PERSONAL_EMAIL_DOMAINS.contains(&domain.as_str()) {
        tracing::debug!("Personal email domain: {}", domain);
        return None;
    }

    Some(domain)
}

/// Extract the registrable domain of an email address using public-suffix rules.
pub fn registrable_domain(email: &str) -> Option<String> {
    let (local, host) = email.trim().rsplit_once('@')?;
    if local.is_empty() {
        return None;
    }

    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let well_formed = !host.is_empty()
        && host.split('.').all(|label| {
            !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
    if !well_formed {
        tracing::debug!("Unparseable email domain in: {}", email);
        return None;
    }

    // IP literals and numeric top-level labels have no registrable domain
    let numeric_tld = host
        .rsplit('.')
        .next()
        .is_some_and(|tld| tld.chars().all(|c| c.is_ascii_digit()));
    if numeric_tld || host.parse::<IpAddr>().is_ok() {
        tracing::debug!("Email host is an address, not a domain: {}", email);
        return None;
    }

    psl::domain_str(&host).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personal_domains_are_not_work_domains() {
        for email in [
            "jane@gmail.com",
            "jane@yahoo.com",
            "jane@hotmail.com",
            "jane@outlook.com",
            "jane@aol.com",
        ] {
            assert_eq!(classify_work_domain(email), None, "{}", email);
        }
    }

    #[test]
    fn personal_match_ignores_case() {
        assert_eq!(classify_work_domain("Jane@GMail.COM"), None);
    }

    #[test]
    fn work_domain_is_label_plus_suffix() {
        assert_eq!(
            classify_work_domain("jane@acme.com"),
            Some("acme.com".to_string())
        );
        assert_eq!(
            classify_work_domain("jane@mail.eu.acme.com"),
            Some("acme.com".to_string())
        );
        assert_eq!(
            classify_work_domain("jane@mail.acme.co.uk"),
            Some("acme.co.uk".to_string())
        );
    }

    #[test]
    fn malformed_emails_fail_closed() {
        assert_eq!(classify_work_domain("not-an-email"), None);
        assert_eq!(classify_work_domain("jane@"), None);
        assert_eq!(classify_work_domain("@acme.com"), None);
        assert_eq!(classify_work_domain("jane@acme..com"), None);
        assert_eq!(classify_work_domain("jane@ac me.com"), None);
        assert_eq!(classify_work_domain(""), None);
    }

    #[test]
    fn ip_literal_hosts_are_not_work_domains() {
        assert_eq!(classify_work_domain("jane@192.168.1.1"), None);
        assert_eq!(classify_work_domain("jane@10.0.0.1."), None);
        assert_eq!(classify_work_domain("jane@[::1]"), None);
        assert_eq!(registrable_domain("jane@acme.123"), None);
    }

    #[test]
    fn bare_suffix_has_no_registrable_domain() {
        assert_eq!(registrable_domain("jane@com"), None);
        assert_eq!(registrable_domain("jane@co.uk"), None);
    }
}

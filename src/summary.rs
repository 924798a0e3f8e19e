use crate::models::Lead;
use crate::scoring::Scorecard;
use crate::signals::{LeadSignals, SignalRecord, Source};
use std::fmt::Write;

fn count_or_unknown(value: Option<u64>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

/// Returns the highlight line for a source, the failure note for a source
/// that failed to fetch, or nothing.
fn highlight<P>(
    source: Source,
    record: &SignalRecord<P>,
    describe: impl FnOnce(&P) -> String,
) -> Option<String> {
    match record {
        SignalRecord::Present(profile) => Some(format!("- {}: {}", source, describe(profile))),
        SignalRecord::Absent { .. } => record
            .failure_detail()
            .map(|detail| format!("- {}: unavailable ({})", source, detail)),
    }
}

/// Render the plain-text qualification report for a lead.
pub fn render_summary(
    lead: &Lead,
    scorecard: &Scorecard,
    employment: &str,
    signals: &LeadSignals,
) -> String {
    let mut summary = String::new();

    let _ = writeln!(summary, "Lead Qualification Summary for {}:\n", lead.name);
    let _ = writeln!(summary, "Overall Score: {:.1}/100", scorecard.total);
    let _ = writeln!(summary, "Likely Employment: {}\n", employment);

    summary.push_str("Scoring Breakdown:\n");
    for reason in &scorecard.reasons {
        let _ = writeln!(summary, "- {}", reason);
    }

    summary.push_str("\nProfile Highlights:\n");
    let mut lines = Vec::new();

    lines.extend(highlight(Source::LinkedIn, &signals.linkedin, |p| {
        format!("{} positions, {} skills", p.positions.len(), p.skills.len())
    }));
    lines.extend(highlight(Source::Instagram, &signals.instagram, |p| {
        format!(
            "{} followers, {} posts",
            count_or_unknown(p.followers),
            count_or_unknown(p.posts_count)
        )
    }));
    lines.extend(highlight(Source::Facebook, &signals.facebook, |p| {
        format!("{} friends, {} posts", p.friends, p.posts_count)
    }));
    lines.extend(highlight(Source::Twitter, &signals.twitter, |p| {
        let mut line = format!("{} followers, {} tweets", p.followers, p.posts_count);
        if let Some(sample) = p.recent_posts.first() {
            let _ = write!(line, "\n  Recent tweet sample: '{}'", sample);
        }
        line
    }));

    if lines.is_empty() {
        summary.push_str("- No external profiles available\n");
    }
    for line in lines {
        let _ = writeln!(summary, "{}", line);
    }

    summary
}

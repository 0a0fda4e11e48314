//! Human-readable rendering of gate results, submissions and the review queue.
//!
//! Everything prints to stdout; logs go to stderr.

use console::{Term, style};

use crate::gate::{QualityGateResult, QuickCheck};
use crate::learning::TopicRecommendations;
use crate::pipeline::Submission;
use crate::review::{QueueStats, ReviewItem, ReviewStatus};
use crate::ui::icons::{CHART, CHECK, CROSS, LEARN, PENDING, REVIEW, WARNING};
use crate::util::{short_id, truncate_str};

const DEFAULT_WIDTH: usize = 80;

fn terminal_width() -> usize {
    let (_, cols) = Term::stdout().size();
    if cols == 0 {
        DEFAULT_WIDTH
    } else {
        cols as usize
    }
}

fn print_wrapped(indent: &str, text: &str) {
    let width = terminal_width().max(40);
    let options = textwrap::Options::new(width)
        .initial_indent(indent)
        .subsequent_indent(indent);
    for line in textwrap::wrap(text, options) {
        println!("{}", line);
    }
}

fn status_style(status: ReviewStatus) -> console::StyledObject<&'static str> {
    let s = style(status.as_str());
    match status {
        ReviewStatus::Approved | ReviewStatus::AutoApproved => s.green(),
        ReviewStatus::Rejected => s.red(),
        ReviewStatus::ChangesRequested => s.yellow(),
        ReviewStatus::PendingReview | ReviewStatus::InReview => s.cyan(),
    }
}

pub fn display_gate_result(result: &QualityGateResult) {
    println!();
    let verdict = if result.auto_approved {
        format!("{}{}", CHECK, style("Auto-approved").green().bold())
    } else if result.passed {
        format!("{}{}", REVIEW, style("Passed, needs review").cyan().bold())
    } else {
        format!("{}{}", CROSS, style("Failed quality gate").red().bold())
    };
    println!("{}", verdict);
    println!(
        "  Overall {}  E-E-A-T {}  AI overview {}  Risk {}",
        style(result.overall_score).bold(),
        result.eeat_score.overall,
        result
            .ai_overview_score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string()),
        result.risk_level
    );
    println!(
        "  Experience {}  Expertise {}  Authoritativeness {}  Trust {}",
        result.eeat_score.experience.score,
        result.eeat_score.expertise.score,
        result.eeat_score.authoritativeness.score,
        result.eeat_score.trustworthiness.score
    );
    println!(
        "  Citations {} ({} verified, {} failed)",
        result.citation_analysis.total,
        result.citation_analysis.verified,
        result.citation_analysis.failed
    );

    if !result.issues.is_empty() {
        println!();
        println!("Issues:");
        for issue in &result.issues {
            print_wrapped("  - ", issue);
        }
    }
    if !result.warnings.is_empty() {
        println!();
        println!("{}Warnings:", WARNING);
        for warning in &result.warnings {
            print_wrapped("  - ", warning);
        }
    }
    if let Some(reason) = &result.auto_approval_blocked {
        println!();
        println!("Not auto-approved: {}", style(reason).dim());
    }
    if !result.eeat_score.recommendations.is_empty() {
        println!();
        println!("Recommendations:");
        for rec in &result.eeat_score.recommendations {
            print_wrapped("  - ", rec);
        }
    }
    if let Some(item) = &result.review_item {
        println!();
        println!("Review item: {}", item.summary());
    }
    println!();
}

pub fn display_quick_check(check: &QuickCheck) {
    let icon = if check.passed { CHECK } else { CROSS };
    println!(
        "{}score {}  {}{}",
        icon,
        style(check.score).bold(),
        if check.passed { "passed" } else { "failed" },
        if check.is_ymyl { "  (YMYL)" } else { "" }
    );
}

pub fn display_submission(submission: &Submission) {
    display_gate_result(&submission.gate);
    let decision = &submission.decision;
    println!(
        "Decision: {}  {}",
        style(decision.action).bold(),
        style(format!("=> {}", submission.disposition)).yellow()
    );
    println!(
        "  confidence {}%, threshold {}",
        decision.confidence, decision.threshold_used
    );
    if submission.disposition.allows_publication() {
        println!("  {}", style("cleared for publication").green());
    }
    if !decision.adjustments.is_empty() {
        println!("  learned adjustments: {}", decision.adjustments.join(", "));
    }
    for reason in &decision.reasons {
        print_wrapped("  - ", reason);
    }
    println!();
}

/// One row per item: short id, status, priority, score, topic, title.
pub fn display_item_table(items: &[&ReviewItem]) {
    if items.is_empty() {
        println!("No review items match.");
        return;
    }
    let title_width = terminal_width().saturating_sub(62).max(20);
    println!(
        "{:<10} {:<18} {:<8} {:>5}  {:<16} Title",
        "ID", "Status", "Priority", "Score", "Topic"
    );
    println!("{}", "-".repeat(62 + title_width.min(40)));
    for item in items {
        let marker = if item.flagged { "!" } else { " " };
        println!(
            "{:<9}{} {:<18} {:<8} {:>5}  {:<16} {}",
            short_id(&item.id),
            marker,
            status_style(item.status),
            item.priority,
            item.overall_quality_score,
            truncate_str(&item.topic, 16),
            truncate_str(&item.title, title_width)
        );
    }
    println!();
    println!("{} item(s)", items.len());
}

pub fn display_item_detail(item: &ReviewItem, show_content: bool) {
    println!();
    println!("{}", style(&item.title).bold());
    println!("  ID:        {}", item.id);
    println!("  Status:    {}", status_style(item.status));
    println!("  Priority:  {}", item.priority);
    println!("  Topic:     {} ({})", item.topic, item.risk_level);
    println!("  Campaign:  {} / site {}", item.campaign_id, item.site_id);
    if let Some(run_item) = &item.run_item_id {
        println!("  Run item:  {}", run_item);
    }
    println!(
        "  Scores:    overall {}, E-E-A-T {}, AI overview {}",
        item.overall_quality_score,
        item.eeat_score.overall,
        item.ai_overview_score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "  Citations: {} ({})",
        item.citation_validation.total_citations, item.citation_validation.overall_status
    );
    for issue in &item.citation_validation.issues {
        println!("    - {}", issue);
    }
    println!("  Words:     {}", item.word_count);
    match (&item.assigned_to, &item.assigned_to_name) {
        (Some(id), Some(name)) => println!("  Assigned:  {} ({})", name, id),
        (Some(id), None) => println!("  Assigned:  {}", id),
        _ => println!("  Assigned:  -"),
    }
    if item.auto_approval_eligible {
        println!("  Auto-approval: eligible");
    } else if let Some(reason) = &item.auto_approval_blocked {
        println!("  Auto-approval: blocked ({})", reason);
    }
    if item.flagged {
        println!("  {}", style("Flagged: publishable, needs attention").yellow());
        for reason in &item.flag_reasons {
            print_wrapped("    - ", reason);
        }
    }

    println!();
    println!("Checklist:");
    for entry in &item.checklist {
        let mark = if entry.checked { CHECK } else { PENDING };
        let required = if entry.required { "" } else { " (optional)" };
        println!("  {}{} {}{}", mark, entry.id, entry.label, style(required).dim());
    }

    if !item.change_requests.is_empty() {
        println!();
        println!("Change requests:");
        for change in &item.change_requests {
            let state = match (change.audit, change.resolved) {
                (true, _) => "audit",
                (false, true) => "resolved",
                (false, false) => "open",
            };
            println!(
                "  {} [{}] by {}: {}",
                short_id(&change.id),
                state,
                change.requested_by,
                change.message
            );
        }
    }
    if let Some(notes) = &item.review_notes {
        println!();
        print_wrapped("Notes: ", notes);
    }
    if let Some(reason) = &item.rejection_reason {
        print_wrapped("Rejected: ", reason);
    }
    if show_content {
        println!();
        print_wrapped("  ", &crate::util::strip_html_tags(&item.content));
    }
    println!();
}

pub fn display_queue_stats(stats: &QueueStats) {
    println!();
    println!("{}Review queue ({} items)", CHART, stats.total);
    println!("  Open:               {}", stats.open_count());
    println!("  Flagged:            {}", stats.flagged);
    println!("  Avg E-E-A-T score:  {:.1}", stats.avg_eeat_score);
    println!(
        "  Avg time in queue:  {}",
        format_duration_ms(stats.avg_time_in_queue_ms)
    );
    for (label, counts) in [
        ("By status", &stats.by_status),
        ("By priority", &stats.by_priority),
        ("By risk", &stats.by_risk),
    ] {
        if counts.is_empty() {
            continue;
        }
        println!();
        println!("{}:", label);
        for (key, count) in counts {
            println!("  {:<20} {}", key, count);
        }
    }
    println!();
}

pub fn display_topic_recommendations(recs: &TopicRecommendations) {
    println!();
    println!("{}Guidance for '{}'", LEARN, style(&recs.topic).bold());
    if !recs.has_history {
        println!("  {}", style("No review history yet; using policy defaults.").dim());
    }
    println!("  Target score: {}", recs.min_target_score);
    println!();
    println!("Focus areas:");
    for area in &recs.focus_areas {
        print_wrapped("  - ", area);
    }
    if !recs.improvement_signals.is_empty() {
        println!();
        println!("Recurring signals:");
        for signal in &recs.improvement_signals {
            print_wrapped("  - ", signal);
        }
    }
    println!();
}

/// `90061000` → `1d 1h`, `150000` → `2m 30s`.
pub fn format_duration_ms(ms: i64) -> String {
    let secs = ms.max(0) / 1000;
    let (days, hours, mins) = (secs / 86_400, (secs % 86_400) / 3600, (secs % 3600) / 60);
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration_ms(0), "0s");
        assert_eq!(format_duration_ms(-5), "0s");
        assert_eq!(format_duration_ms(45_000), "45s");
        assert_eq!(format_duration_ms(150_000), "2m 30s");
        assert_eq!(format_duration_ms(2 * 3_600_000 + 5 * 60_000), "2h 5m");
        assert_eq!(format_duration_ms(90_061_000), "1d 1h");
    }
}

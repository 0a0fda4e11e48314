//! Interactive reviewer prompt used by `editorial queue decide`.

use anyhow::Result;
use console::style;
use dialoguer::{Input, Select, theme::ColorfulTheme};

use crate::review::{DecisionStatus, ReviewDecision, ReviewItem};
use crate::ui::icons;

/// What the reviewer chose at the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptOutcome {
    Decided(ReviewDecision),
    Skipped,
}

/// Collects a human decision for one review item.
pub struct DecisionPrompt {
    reviewer_id: String,
    reviewer_name: Option<String>,
}

impl DecisionPrompt {
    pub fn new(reviewer_id: &str, reviewer_name: Option<&str>) -> Self {
        Self {
            reviewer_id: reviewer_id.to_string(),
            reviewer_name: reviewer_name.map(str::to_string),
        }
    }

    /// Show the item header, then ask for a decision.
    pub fn ask(&self, item: &ReviewItem) -> Result<PromptOutcome> {
        print_item_header(item);

        let options = &[
            "Approve",
            "Request changes",
            "Reject",
            "Skip for now",
        ];
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Decision")
            .items(options)
            .default(0)
            .interact()?;

        let status = match selection {
            0 => DecisionStatus::Approved,
            1 => DecisionStatus::ChangesRequested,
            2 => DecisionStatus::Rejected,
            _ => return Ok(PromptOutcome::Skipped),
        };
        Ok(PromptOutcome::Decided(self.complete(status)?))
    }

    /// Ask for the free text the chosen status needs.
    fn complete(&self, status: DecisionStatus) -> Result<ReviewDecision> {
        let theme = ColorfulTheme::default();
        let mut decision = match status {
            DecisionStatus::Approved => ReviewDecision::approve(&self.reviewer_id),
            DecisionStatus::Rejected => {
                let reason: String = Input::with_theme(&theme)
                    .with_prompt("Rejection reason")
                    .interact_text()?;
                ReviewDecision::reject(&self.reviewer_id, reason.trim())
            }
            DecisionStatus::ChangesRequested => {
                let message: String = Input::with_theme(&theme)
                    .with_prompt("Requested changes")
                    .interact_text()?;
                ReviewDecision::request_changes(&self.reviewer_id, message.trim())
            }
        };

        let notes: String = Input::with_theme(&theme)
            .with_prompt("Notes (optional)")
            .allow_empty(true)
            .interact_text()?;
        if !notes.trim().is_empty() {
            decision = decision.with_notes(notes.trim());
        }
        if let Some(name) = &self.reviewer_name {
            decision = decision.with_reviewer_name(name);
        }
        Ok(decision)
    }
}

fn print_item_header(item: &ReviewItem) {
    println!();
    println!(
        "{} {}",
        style(&item.title).bold(),
        style(format!("[{}]", item.status)).dim()
    );
    println!(
        "  topic: {}  risk: {}  priority: {}",
        item.topic, item.risk_level, item.priority
    );
    println!(
        "  score: {}  E-E-A-T: {}  citations: {}",
        item.overall_quality_score, item.eeat_score.overall, item.citation_validation.total_citations
    );
    if item.is_ymyl() {
        println!("  {}YMYL content", icons::WARNING);
    }
    let unchecked: Vec<&str> = item
        .checklist
        .iter()
        .filter(|c| c.required && !c.checked)
        .map(|c| c.label.as_str())
        .collect();
    if !unchecked.is_empty() {
        println!("  {}unchecked: {}", icons::PENDING, unchecked.join(", "));
    }
    for change in item.unresolved_change_requests() {
        println!("  {}open change request: {}", icons::CHANGES, change.message);
    }
    println!();
}

//! Review queue commands: `editorial queue ...`.

use anyhow::Result;
use console::style;

use editorial::editorial_config::EditorialConfig;
use editorial::gate::prompt::{DecisionPrompt, PromptOutcome};
use editorial::review::{DecisionStatus, ReviewDecision, ReviewFilters};
use editorial::ui::icons::{CHANGES, CHECK, CROSS, PENDING, PUBLISH, REVIEW, SPARKLE};
use editorial::ui::report::{display_item_detail, display_item_table, display_queue_stats};

use super::super::QueueCommands;
use super::{open_pipeline, open_reviews, print_json, resolve_item_id};

fn decision_from_args(
    status: DecisionStatus,
    reviewer: &str,
    name: Option<&str>,
    notes: Option<&str>,
    reason: Option<&str>,
    message: Option<&str>,
) -> ReviewDecision {
    let mut decision = ReviewDecision::new(status, reviewer);
    decision.reviewer_name = name.map(str::to_string);
    decision.notes = notes.map(str::to_string);
    match status {
        DecisionStatus::Rejected => decision.rejection_reason = reason.map(str::to_string),
        DecisionStatus::ChangesRequested => decision.change_message = message.map(str::to_string),
        DecisionStatus::Approved => {}
    }
    decision
}

pub fn cmd_queue(config: &EditorialConfig, command: QueueCommands) -> Result<()> {
    match command {
        QueueCommands::List {
            status,
            priority,
            risk,
            campaign,
            site,
            assignee,
            unassigned,
            flagged,
            sort,
            json,
        } => {
            let mut reviews = open_reviews(config);
            let filters = ReviewFilters {
                status,
                priority,
                risk_level: risk,
                campaign_id: campaign,
                site_id: site,
                assigned_to: assignee,
                unassigned_only: unassigned,
                flagged_only: flagged,
            };
            reviews.set_filters(filters);
            reviews.set_sort(sort);
            let items = reviews.filtered_items();
            if json {
                print_json(&items)?;
            } else {
                display_item_table(&items);
            }
        }
        QueueCommands::Show { id, content, json } => {
            let mut reviews = open_reviews(config);
            let id = resolve_item_id(&reviews, &id)?;
            reviews.select_item(Some(&id));
            if let Some(item) = reviews.selected_item() {
                if json {
                    print_json(item)?;
                } else {
                    display_item_detail(item, content);
                }
            }
        }
        QueueCommands::Stats { json } => {
            let stats = open_reviews(config).queue_stats();
            if json {
                print_json(&stats)?;
            } else {
                display_queue_stats(&stats);
            }
        }
        QueueCommands::Assign { id, reviewer, name } => {
            let mut reviews = open_reviews(config);
            let id = resolve_item_id(&reviews, &id)?;
            reviews.assign_reviewer(&id, &reviewer, name.as_deref())?;
            println!("{}Assigned {} to {}", REVIEW, short(&id), reviewer);
        }
        QueueCommands::Unassign { id } => {
            let mut reviews = open_reviews(config);
            let id = resolve_item_id(&reviews, &id)?;
            reviews.unassign_reviewer(&id)?;
            println!("Unassigned {}", short(&id));
        }
        QueueCommands::Start { id, reviewer } => {
            let mut reviews = open_reviews(config);
            let id = resolve_item_id(&reviews, &id)?;
            reviews.start_review(&id, &reviewer)?;
            println!("{}{} is now in review by {}", REVIEW, short(&id), reviewer);
        }
        QueueCommands::Decide {
            id,
            status,
            reviewer,
            name,
            notes,
            reason,
            message,
        } => {
            let mut pipeline = open_pipeline(config);
            let id = resolve_item_id(pipeline.reviews(), &id)?;
            let decision = match status {
                Some(status) => decision_from_args(
                    status,
                    &reviewer,
                    name.as_deref(),
                    notes.as_deref(),
                    reason.as_deref(),
                    message.as_deref(),
                ),
                None => {
                    let Some(item) = pipeline.reviews().get_review_item(&id) else {
                        anyhow::bail!("Review item {} disappeared", id);
                    };
                    match DecisionPrompt::new(&reviewer, name.as_deref()).ask(item)? {
                        PromptOutcome::Decided(decision) => decision,
                        PromptOutcome::Skipped => {
                            println!("Skipped {}", short(&id));
                            return Ok(());
                        }
                    }
                }
            };
            let item = pipeline.decide(&id, &decision)?;
            let icon = match decision.status {
                DecisionStatus::Approved => CHECK,
                DecisionStatus::Rejected => CROSS,
                DecisionStatus::ChangesRequested => CHANGES,
            };
            println!("{}{}", icon, item.summary());
        }
        QueueCommands::Checklist { id, item, by } => {
            let mut reviews = open_reviews(config);
            let id = resolve_item_id(&reviews, &id)?;
            let complete = reviews.toggle_checklist_item(&id, &item, &by)?;
            let checked = reviews
                .get_review_item(&id)
                .and_then(|i| i.checklist.iter().find(|c| c.id == item))
                .is_some_and(|c| c.checked);
            println!(
                "{}{} {}",
                if checked { CHECK } else { PENDING },
                item,
                if checked { "checked" } else { "unchecked" }
            );
            if complete {
                println!("  {}", style("Checklist complete").green());
            }
        }
        QueueCommands::RequestChanges {
            id,
            reviewer,
            message,
        } => {
            let mut pipeline = open_pipeline(config);
            let id = resolve_item_id(pipeline.reviews(), &id)?;
            let request = pipeline.request_changes(&id, &reviewer, &message)?;
            println!(
                "{}Change request {} recorded on {}",
                CHANGES,
                short(&request.id),
                short(&id)
            );
        }
        QueueCommands::Resolve { id, change_id } => {
            let mut reviews = open_reviews(config);
            let id = resolve_item_id(&reviews, &id)?;
            let matching: Vec<String> = reviews
                .get_review_item(&id)
                .map(|item| {
                    item.change_requests
                        .iter()
                        .filter(|c| c.id.starts_with(&change_id))
                        .map(|c| c.id.clone())
                        .collect()
                })
                .unwrap_or_default();
            let change_id = match matching.as_slice() {
                [only] => only.clone(),
                _ => change_id,
            };
            reviews.resolve_change_request(&id, &change_id)?;
            println!("{}Resolved change request {}", CHECK, short(&change_id));
        }
        QueueCommands::Resubmit { id } => {
            let mut reviews = open_reviews(config);
            let id = resolve_item_id(&reviews, &id)?;
            reviews.resubmit(&id)?;
            println!("{}{} is back in the queue", PENDING, short(&id));
        }
        QueueCommands::Auto { id } => {
            let mut pipeline = open_pipeline(config);
            let id = resolve_item_id(pipeline.reviews(), &id)?;
            if pipeline.process_auto_approval(&id) {
                println!("{}{} auto-approved", SPARKLE, short(&id));
            } else {
                let check = pipeline.reviews().check_auto_approval(&id);
                let reason = check
                    .reason
                    .unwrap_or_else(|| "item is no longer open".to_string());
                println!("{}{} not auto-approved: {}", CROSS, short(&id), reason);
            }
        }
        QueueCommands::Publish { id } => {
            let mut reviews = open_reviews(config);
            let id = resolve_item_id(&reviews, &id)?;
            reviews.mark_published(&id)?;
            println!("{}{} marked published", PUBLISH, short(&id));
        }
        QueueCommands::Delete { id } => {
            let mut reviews = open_reviews(config);
            let id = resolve_item_id(&reviews, &id)?;
            if reviews.delete_review_item(&id) {
                println!("Deleted {}", short(&id));
            }
        }
    }

    Ok(())
}

fn short(id: &str) -> String {
    editorial::util::short_id(id)
}

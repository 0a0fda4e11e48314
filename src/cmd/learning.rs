//! Learning state commands: `editorial learning ...`.

use anyhow::Result;
use console::style;

use editorial::editorial_config::EditorialConfig;
use editorial::learning::insights::display_learning_stats;
use editorial::ui::icons::LEARN;
use editorial::ui::report::display_topic_recommendations;
use editorial::util::truncate_str;

use super::super::LearningCommands;
use super::{effective_policy, open_learning, print_json};

pub fn cmd_learning(config: &EditorialConfig, command: LearningCommands) -> Result<()> {
    match command {
        LearningCommands::Stats { json } => {
            let stats = open_learning(config).state().learning_stats();
            if json {
                print_json(&stats)?;
            } else {
                display_learning_stats(&stats);
            }
        }
        LearningCommands::Topic { topic, json } => {
            let policy = effective_policy(config);
            let recs = open_learning(config)
                .state()
                .topic_recommendations(&topic, &policy);
            if json {
                print_json(&recs)?;
            } else {
                display_topic_recommendations(&recs);
            }
        }
        LearningCommands::Signals { limit } => {
            let learning = open_learning(config);
            let signals = learning.state().top_improvement_signals(limit);
            if signals.is_empty() {
                println!("No improvement signals recorded yet.");
                return Ok(());
            }
            println!();
            println!("{:<18} {:>5}  {:<12} Signal", "Category", "Seen", "Last seen");
            println!("{}", "-".repeat(60));
            for signal in signals {
                println!(
                    "{:<18} {:>5}  {:<12} {}",
                    signal.category.as_str(),
                    signal.frequency,
                    signal.last_seen.format("%Y-%m-%d"),
                    truncate_str(&signal.signal, 60)
                );
            }
            println!();
        }
        LearningCommands::Prompt => match open_learning(config).state().prompt_addendum() {
            Some(addendum) => print!("{}", addendum),
            None => println!("No recurring signals yet."),
        },
        LearningCommands::RecordSignal {
            category,
            signal,
            suggest,
        } => {
            let mut learning = open_learning(config);
            learning.record_content_improvement(category, &signal, suggest.as_deref());
            let frequency = learning
                .state()
                .content_improvements
                .iter()
                .find(|c| c.category == category && c.signal == signal.trim())
                .map(|c| c.frequency)
                .unwrap_or(1);
            println!(
                "{}Recorded {} signal {} {}",
                LEARN,
                category,
                style(&signal).bold(),
                style(format!("(seen {}x)", frequency)).dim()
            );
        }
    }

    Ok(())
}

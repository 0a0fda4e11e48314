//! Read-only reports over a [`LearningState`].
//!
//! [`display_learning_stats`] renders the aggregate table used by
//! `editorial learning stats`.

use serde::{Deserialize, Serialize};

use super::{ContentImprovement, LearningState, ThresholdAdjustments, topic_key};
use crate::review::{ReviewPolicy, detect_risk_level};

/// Override rate above which a topic is reported as problematic.
pub const PROBLEMATIC_OVERRIDE_RATE: f64 = 15.0;
/// Maximum number of problematic topics reported.
const MAX_PROBLEMATIC_TOPICS: usize = 5;
/// Signals surfaced in prompt improvements.
const MAX_PROMPT_IMPROVEMENTS: usize = 5;
/// Signals surfaced per topic recommendation.
const MAX_TOPIC_SIGNALS: usize = 3;
/// A signal must recur this often before it shapes topic recommendations.
const MIN_SIGNAL_FREQUENCY: u32 = 2;
/// Margin added on top of the effective threshold for the target score.
const TARGET_SCORE_MARGIN: f64 = 5.0;

/// Aggregate learning report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningStats {
    pub topics_tracked: usize,
    pub total_reviewed: u32,
    pub total_auto_approved: u32,
    /// Auto-approved share of all reviewed items, in percent.
    pub auto_approval_rate: f64,
    /// Unweighted mean of per-topic override rates: every topic counts the
    /// same regardless of review volume.
    pub avg_human_override_rate: f64,
    /// Topics with an override rate above 15 %, worst first, at most five.
    pub problematic_topics: Vec<ProblematicTopic>,
    pub threshold_adjustments: ThresholdAdjustments,
    pub improvement_signals: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblematicTopic {
    pub topic: String,
    pub override_rate: f64,
    pub total_reviewed: u32,
}

/// Generation guidance for one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRecommendations {
    pub topic: String,
    /// Whether any review history exists for the topic.
    pub has_history: bool,
    pub min_target_score: u32,
    pub focus_areas: Vec<String>,
    pub improvement_signals: Vec<String>,
}

impl LearningState {
    /// Content improvements ranked by frequency, most recent first on ties.
    pub fn top_improvement_signals(&self, limit: usize) -> Vec<&ContentImprovement> {
        let mut ranked: Vec<&ContentImprovement> = self.content_improvements.iter().collect();
        ranked.sort_by(|a, b| {
            b.frequency
                .cmp(&a.frequency)
                .then_with(|| b.last_seen.cmp(&a.last_seen))
        });
        ranked.truncate(limit);
        ranked
    }

    /// Prompt additions for the most frequent signals.
    pub fn prompt_improvements(&self) -> Vec<String> {
        self.top_improvement_signals(MAX_PROMPT_IMPROVEMENTS)
            .into_iter()
            .map(|c| match &c.suggested_prompt_addition {
                Some(suggestion) => suggestion.clone(),
                None => format!("Avoid a recurring {} issue: {}", c.category, c.signal),
            })
            .collect()
    }

    /// Block of text to append to a generation prompt, or `None` when
    /// nothing has been learned yet.
    pub fn prompt_addendum(&self) -> Option<String> {
        let improvements = self.prompt_improvements();
        if improvements.is_empty() {
            return None;
        }
        let mut addendum = String::from("Editorial quality requirements learned from review:\n");
        for line in improvements {
            addendum.push_str("- ");
            addendum.push_str(&line);
            addendum.push('\n');
        }
        Some(addendum)
    }

    /// Guidance for generating content on `topic`.
    pub fn topic_recommendations(&self, topic: &str, policy: &ReviewPolicy) -> TopicRecommendations {
        let is_ymyl = detect_risk_level(topic, policy).is_ymyl();
        let Some(perf) = self.topic_performance(topic) else {
            let mut focus_areas = vec![
                "Include first-hand experience and original observations".to_string(),
                format!(
                    "Cite at least {} authoritative sources",
                    policy.min_citation_count
                ),
                "Use a clear structure with descriptive headings".to_string(),
            ];
            if is_ymyl {
                focus_areas.push(
                    "YMYL topic: support every health, financial or legal claim with a primary source"
                        .to_string(),
                );
            }
            return TopicRecommendations {
                topic: topic_key(topic),
                has_history: false,
                min_target_score: policy.auto_approve_above_score,
                focus_areas,
                improvement_signals: Vec::new(),
            };
        };

        let effective = self.effective_threshold(topic, is_ymyl, policy);
        let min_target_score = (effective + TARGET_SCORE_MARGIN).min(100.0).round() as u32;

        let mut focus_areas = Vec::new();
        if perf.human_override_rate > 30.0 {
            focus_areas.push(format!(
                "Editors override {:.0}% of auto-approvals on this topic; verify every factual claim",
                perf.human_override_rate
            ));
        } else if perf.human_override_rate > PROBLEMATIC_OVERRIDE_RATE {
            focus_areas.push(format!(
                "Override rate is {:.0}%; tighten sourcing and accuracy",
                perf.human_override_rate
            ));
        }
        if perf.avg_eeat_score < policy.min_eeat_score as f64 {
            focus_areas.push(format!(
                "Average E-E-A-T score {:.0} is below the minimum {}; add depth and first-hand detail",
                perf.avg_eeat_score, policy.min_eeat_score
            ));
        } else if perf.avg_eeat_score < effective {
            focus_areas.push(format!(
                "Average E-E-A-T score {:.0} is below the auto-approve threshold {:.0}",
                perf.avg_eeat_score, effective
            ));
        }
        if is_ymyl {
            focus_areas.push(
                "YMYL topic: support every health, financial or legal claim with a primary source"
                    .to_string(),
            );
        }

        let improvement_signals = self
            .top_improvement_signals(self.content_improvements.len())
            .into_iter()
            .filter(|c| c.frequency >= MIN_SIGNAL_FREQUENCY)
            .take(MAX_TOPIC_SIGNALS)
            .map(|c| c.signal.clone())
            .collect();

        TopicRecommendations {
            topic: topic_key(topic),
            has_history: true,
            min_target_score,
            focus_areas,
            improvement_signals,
        }
    }

    pub fn learning_stats(&self) -> LearningStats {
        let topics = &self.topic_performance;
        let total_reviewed: u32 = topics.values().map(|p| p.total_reviewed).sum();
        let total_auto_approved: u32 = topics.values().map(|p| p.auto_approved).sum();

        let auto_approval_rate = if total_reviewed > 0 {
            total_auto_approved as f64 / total_reviewed as f64 * 100.0
        } else {
            0.0
        };
        let avg_human_override_rate = if topics.is_empty() {
            0.0
        } else {
            topics.values().map(|p| p.human_override_rate).sum::<f64>() / topics.len() as f64
        };

        let mut problematic_topics: Vec<ProblematicTopic> = topics
            .iter()
            .filter(|(_, p)| p.human_override_rate > PROBLEMATIC_OVERRIDE_RATE)
            .map(|(topic, p)| ProblematicTopic {
                topic: topic.clone(),
                override_rate: p.human_override_rate,
                total_reviewed: p.total_reviewed,
            })
            .collect();
        problematic_topics.sort_by(|a, b| b.override_rate.total_cmp(&a.override_rate));
        problematic_topics.truncate(MAX_PROBLEMATIC_TOPICS);

        LearningStats {
            topics_tracked: topics.len(),
            total_reviewed,
            total_auto_approved,
            auto_approval_rate,
            avg_human_override_rate,
            problematic_topics,
            threshold_adjustments: self.threshold_adjustments.clone(),
            improvement_signals: self.content_improvements.len(),
        }
    }
}

/// Print the aggregate learning report.
pub fn display_learning_stats(stats: &LearningStats) {
    if stats.topics_tracked == 0 {
        println!("No review feedback recorded yet.");
        return;
    }

    println!();
    println!("Learning Statistics ({} topics):", stats.topics_tracked);
    println!("  Reviewed:            {}", stats.total_reviewed);
    println!(
        "  Auto-approved:       {} ({:.1}%)",
        stats.total_auto_approved, stats.auto_approval_rate
    );
    println!("  Avg override rate:   {:.1}%", stats.avg_human_override_rate);
    println!("  Improvement signals: {}", stats.improvement_signals);

    let adjustments = &stats.threshold_adjustments;
    println!();
    println!(
        "Threshold adjustments: global {:+}, YMYL {:+}",
        adjustments.global, adjustments.ymyl
    );
    for (topic, points) in &adjustments.by_topic {
        println!("  {:<30} {:+}", topic, points);
    }

    if !stats.problematic_topics.is_empty() {
        println!();
        println!("{:<30} {:<10} {:<10}", "Problematic topic", "Override", "Reviewed");
        println!("{:<30} {:<10} {:<10}", "-".repeat(30), "----------", "----------");
        for topic in &stats.problematic_topics {
            println!(
                "{:<30} {:<9.1}% {:<10}",
                crate::util::truncate_str(&topic.topic, 30),
                topic.override_rate,
                topic.total_reviewed
            );
        }
    }
    println!();
}

//! CLI command implementations.
//!
//! | Module     | Commands handled                    |
//! |------------|-------------------------------------|
//! | `project`  | `Init`                              |
//! | `gate`     | `Gate`, `Check`, `Submit`, `Batch`  |
//! | `queue`    | `Queue`                             |
//! | `learning` | `Learning`                          |
//! | `config`   | `Config`                            |

pub mod config;
pub mod gate;
pub mod learning;
pub mod project;
pub mod queue;

pub use config::cmd_config;
pub use gate::{cmd_batch, cmd_check, cmd_gate, cmd_submit};
pub use learning::cmd_learning;
pub use project::cmd_init;
pub use queue::cmd_queue;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use editorial::editorial_config::EditorialConfig;
use editorial::learning::LearningLoop;
use editorial::pipeline::EditorialPipeline;
use editorial::review::{ReviewPolicy, ReviewRepository};
use editorial::scoring::HeuristicScorer;
use editorial::storage::JsonFileStore;

/// Open the review queue and sync the stored policy with `[policy]` from
/// editorial.toml. The store is only written when the two differ.
pub(crate) fn open_reviews(config: &EditorialConfig) -> ReviewRepository<JsonFileStore> {
    let mut reviews = ReviewRepository::open(JsonFileStore::new(config.data_dir()));
    let overrides = config.policy_override();
    if !overrides.is_empty() {
        let merged = reviews.policy().merged(overrides);
        if &merged != reviews.policy() {
            reviews.set_policy(merged);
        }
    }
    reviews
}

/// Stored policy with `[policy]` applied, without writing anything.
pub(crate) fn effective_policy(config: &EditorialConfig) -> ReviewPolicy {
    ReviewRepository::open(JsonFileStore::new(config.data_dir()))
        .policy()
        .merged(config.policy_override())
}

pub(crate) fn open_learning(config: &EditorialConfig) -> LearningLoop<JsonFileStore> {
    LearningLoop::open(JsonFileStore::new(config.data_dir()))
}

pub(crate) fn open_pipeline(config: &EditorialConfig) -> EditorialPipeline<JsonFileStore> {
    EditorialPipeline::new(
        open_reviews(config),
        open_learning(config),
        Box::new(HeuristicScorer::new()),
    )
}

pub(crate) fn read_content(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read content file: {}", path.display()))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Full id for an id or unique prefix.
pub(crate) fn resolve_item_id(
    reviews: &ReviewRepository<JsonFileStore>,
    id_or_prefix: &str,
) -> Result<String> {
    reviews.resolve_id(id_or_prefix).ok_or_else(|| {
        anyhow::anyhow!(
            "No review item matches '{}' (use a full id or a unique prefix from 'editorial queue list')",
            id_or_prefix
        )
    })
}

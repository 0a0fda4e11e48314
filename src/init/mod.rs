//! `editorial init`: create the `.editorial/` project directory.
//!
//! ```text
//! .editorial/
//! ├── editorial.toml   # policy overrides, storage and logging settings
//! └── data/            # review items, policy and learning state (JSON)
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::editorial_config::{CONFIG_FILE, EDITORIAL_DIR, EditorialToml};

/// Commented starter configuration written by `init`. Every value shown is
/// the built-in default.
pub const DEFAULT_CONFIG: &str = r#"# Editorial quality gate configuration.
# Fields left out of [policy] keep the stored (or built-in) policy.

[policy]
# min_eeat_score = 60
# min_experience_score = 50
# min_expertise_score = 50
# min_citation_count = 3
# auto_approve_above_score = 85
# ymyl_min_score = 80
# max_change_request_rounds = 3
# enable_auto_approval = true
# auto_approve_requires_citations = true
# ymyl_requires_manual_review = true
# require_checklist = true
# require_all_checklist_items = false

[storage]
data_dir = "data"

[logging]
level = "info"
format = "text"
"#;

#[derive(Debug)]
pub struct InitResult {
    pub editorial_dir: PathBuf,
    /// False when `.editorial/` already existed.
    pub created: bool,
    /// Whether `editorial.toml` was written by this call.
    pub config_written: bool,
}

/// Create `.editorial/` under `project_dir`, completing a partial layout.
/// An existing `editorial.toml` is never overwritten.
pub fn init_project(project_dir: &Path) -> Result<InitResult> {
    let editorial_dir = project_dir.join(EDITORIAL_DIR);
    let created = !editorial_dir.exists();

    std::fs::create_dir_all(&editorial_dir)
        .with_context(|| format!("Failed to create directory: {}", editorial_dir.display()))?;

    let data_dir = editorial_dir.join("data");
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    let config_written = write_default_config(&editorial_dir)?;

    Ok(InitResult {
        editorial_dir,
        created,
        config_written,
    })
}

/// Write [`DEFAULT_CONFIG`] unless a config file exists. Returns whether it wrote.
pub fn write_default_config(editorial_dir: &Path) -> Result<bool> {
    let config_file = editorial_dir.join(CONFIG_FILE);
    if config_file.exists() {
        return Ok(false);
    }
    std::fs::write(&config_file, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to create {}", config_file.display()))?;
    Ok(true)
}

pub fn is_initialized(project_dir: &Path) -> bool {
    project_dir.join(EDITORIAL_DIR).is_dir()
}

/// Whether the project has a config file that parses.
pub fn has_valid_config(project_dir: &Path) -> bool {
    let path = project_dir.join(EDITORIAL_DIR).join(CONFIG_FILE);
    path.exists() && EditorialToml::load(&path).is_ok()
}

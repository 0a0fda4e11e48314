//! Content evaluation commands: `gate`, `check`, `submit` and `batch`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use editorial::EditorialError;
use editorial::editorial_config::EditorialConfig;
use editorial::gate::{QualityGateOptions, quick_quality_check};
use editorial::pipeline::Disposition;
use editorial::scoring::HeuristicScorer;
use editorial::ui::BatchProgress;
use editorial::ui::report::{display_gate_result, display_quick_check, display_submission};

use super::super::ContentArgs;
use super::{effective_policy, open_pipeline, print_json, read_content};

fn title_for(path: &Path, title: Option<&str>) -> String {
    match title {
        Some(t) => t.to_string(),
        None => path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .replace(['-', '_'], " "),
    }
}

fn gate_options(args: &ContentArgs) -> QualityGateOptions {
    let mut options = QualityGateOptions::new(&args.campaign, &args.site, &args.topic);
    if let Some(run_item) = &args.run_item {
        options = options.with_run_item(run_item);
    }
    if args.force_manual {
        options = options.force_manual_review();
    }
    options
}

pub fn cmd_gate(
    config: &EditorialConfig,
    args: &ContentArgs,
    skip_review: bool,
    enforce: bool,
) -> Result<()> {
    let html = read_content(&args.file)?;
    let title = title_for(&args.file, args.title.as_deref());
    let mut options = gate_options(args);
    if skip_review {
        options = options.skip_review_creation();
    }

    let mut pipeline = open_pipeline(config);
    let result = if enforce {
        match pipeline.enforce_gate(&title, &html, &options) {
            Ok(result) => result,
            Err(EditorialError::ReviewRequired { item, issues }) => {
                if let Some(item) = item {
                    eprintln!("Queued for review: {}", item.summary());
                }
                anyhow::bail!("Content requires review: {}", issues);
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        pipeline.gate(&title, &html, &options)
    };

    if args.json {
        print_json(&result)
    } else {
        display_gate_result(&result);
        Ok(())
    }
}

pub fn cmd_check(config: &EditorialConfig, file: &Path, topic: &str, json: bool) -> Result<()> {
    let html = read_content(file)?;
    let policy = effective_policy(config);
    let check = quick_quality_check(&html, topic, &policy, &HeuristicScorer::new());

    if json {
        print_json(&check)
    } else {
        display_quick_check(&check);
        Ok(())
    }
}

pub fn cmd_submit(config: &EditorialConfig, args: &ContentArgs) -> Result<()> {
    let html = read_content(&args.file)?;
    let title = title_for(&args.file, args.title.as_deref());
    let mut pipeline = open_pipeline(config);
    let submission = pipeline.submit(&title, &html, &gate_options(args));

    if args.json {
        print_json(&submission)
    } else {
        display_submission(&submission);
        Ok(())
    }
}

#[derive(Serialize)]
struct BatchEntry {
    file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    disposition: Option<Disposition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn cmd_batch(
    config: &EditorialConfig,
    pattern: &str,
    topic: &str,
    campaign: &str,
    site: &str,
    json: bool,
) -> Result<()> {
    let mut files: Vec<PathBuf> = glob::glob(pattern)
        .with_context(|| format!("Invalid glob pattern: {}", pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    if files.is_empty() {
        anyhow::bail!("No files match '{}'", pattern);
    }

    let mut pipeline = open_pipeline(config);
    let options = QualityGateOptions::new(campaign, site, topic);
    let mut progress = BatchProgress::new(files.len() as u64, json);
    let mut entries = Vec::with_capacity(files.len());

    for file in files {
        let name = file.display().to_string();
        progress.start_item(&name);
        match read_content(&file) {
            Ok(html) => {
                let title = title_for(&file, None);
                let submission = pipeline.submit(&title, &html, &options);
                progress.finish_item(&name, submission.disposition, submission.gate.overall_score);
                entries.push(BatchEntry {
                    file,
                    disposition: Some(submission.disposition),
                    score: Some(submission.gate.overall_score),
                    item_id: submission.review_item().map(|item| item.id.clone()),
                    error: None,
                });
            }
            Err(e) => {
                progress.fail_item(&name, &format!("{:#}", e));
                entries.push(BatchEntry {
                    file,
                    disposition: None,
                    score: None,
                    item_id: None,
                    error: Some(format!("{:#}", e)),
                });
            }
        }
    }

    let tally = progress.finish();
    if json {
        return print_json(&entries);
    }
    println!();
    println!("Submitted {} file(s):", entries.len());
    for (disposition, count) in &tally {
        println!("  {:<16} {}", disposition, count);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_defaults_to_file_stem() {
        assert_eq!(
            title_for(Path::new("drafts/best-garden_tools.html"), None),
            "best garden tools"
        );
        assert_eq!(title_for(Path::new("x.html"), Some("Given")), "Given");
    }
}

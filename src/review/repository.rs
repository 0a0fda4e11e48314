//! Persisted review queue.
//!
//! `ReviewRepository` owns the ordered list of review items, the active review
//! policy and the session's view state (filters, sort key, selected item).
//! Every mutation is read-modify-write-persist: the item list is written back
//! to the store after each change. Persistence is best-effort; a failed save
//! is logged and the in-memory state stays authoritative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::filter::{QueueStats, ReviewFilters, SortKey};
use super::policy::{PolicyOverride, ReviewPolicy, derive_priority, detect_risk_level, evaluate_auto_approval};
use super::{
    ChangeRequest, CitationValidation, CreateReviewInput, DecisionStatus, ReviewDecision,
    ReviewItem, ReviewItemPatch, ReviewStatus, default_checklist,
};
use crate::errors::EditorialError;
use crate::scoring::{ContentScores, ScoreProvider};
use crate::storage::{
    KeyValueStore, REVIEW_ITEMS_KEY, REVIEW_POLICY_KEY, load_or_default, save_best_effort,
};
use crate::util::word_count;

/// Review note set when an item is finalized by the auto-approval path.
pub const AUTO_APPROVAL_NOTE: &str = "Automatically approved: met all quality thresholds";

/// Answer to "may this item be auto-approved?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoApprovalCheck {
    pub eligible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// The review queue, backed by a key-value store.
pub struct ReviewRepository<S: KeyValueStore> {
    store: S,
    items: Vec<ReviewItem>,
    policy: ReviewPolicy,
    filters: ReviewFilters,
    sort: SortKey,
    selected_item_id: Option<String>,
}

impl<S: KeyValueStore> ReviewRepository<S> {
    /// Open a repository, loading items and policy from `store`. Missing or
    /// unreadable data starts fresh.
    pub fn open(store: S) -> Self {
        let items: Vec<ReviewItem> = load_or_default(&store, REVIEW_ITEMS_KEY);
        let policy: ReviewPolicy = load_or_default(&store, REVIEW_POLICY_KEY);
        debug!(items = items.len(), "opened review repository");
        Self {
            store,
            items,
            policy,
            filters: ReviewFilters::default(),
            sort: SortKey::default(),
            selected_item_id: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn items(&self) -> &[ReviewItem] {
        &self.items
    }

    pub fn policy(&self) -> &ReviewPolicy {
        &self.policy
    }

    /// Merge `overrides` into the current policy and persist it.
    pub fn update_policy(&mut self, overrides: &PolicyOverride) -> &ReviewPolicy {
        overrides.apply_to(&mut self.policy);
        save_best_effort(&self.store, REVIEW_POLICY_KEY, &self.policy);
        info!("review policy updated");
        &self.policy
    }

    /// Replace the current policy and persist it.
    pub fn set_policy(&mut self, policy: ReviewPolicy) {
        self.policy = policy;
        save_best_effort(&self.store, REVIEW_POLICY_KEY, &self.policy);
    }

    fn persist(&self) {
        save_best_effort(&self.store, REVIEW_ITEMS_KEY, &self.items);
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut ReviewItem, EditorialError> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| EditorialError::ItemNotFound { id: id.to_string() })
    }

    /// Apply `f` to item `id`, refresh `updated_at` and persist.
    fn mutate<T>(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut ReviewItem, &ReviewPolicy) -> Result<T, EditorialError>,
    ) -> Result<T, EditorialError> {
        let policy = self.policy.clone();
        let item = self.find_mut(id)?;
        let result = f(item, &policy)?;
        item.updated_at = Utc::now();
        self.persist();
        Ok(result)
    }

    // ------------------------------------------------------------------
    // CRUD
    // ------------------------------------------------------------------

    /// Score `input.content` with `scorer` and create a review item.
    pub fn create_review_item(
        &mut self,
        input: CreateReviewInput,
        scorer: &dyn ScoreProvider,
    ) -> ReviewItem {
        let scores = ContentScores::compute(scorer, &input.content);
        self.create_scored_review_item(input, &scores)
    }

    /// Create a review item from scores computed elsewhere.
    pub fn create_scored_review_item(
        &mut self,
        input: CreateReviewInput,
        scores: &ContentScores,
    ) -> ReviewItem {
        let policy = self.policy.merged(&input.policy_override);
        self.insert_scored_item(input, scores, &policy, None)
    }

    /// Create an item under an explicit policy. `forced_block` marks the item
    /// ineligible for auto-approval regardless of its scores.
    pub(crate) fn insert_scored_item(
        &mut self,
        input: CreateReviewInput,
        scores: &ContentScores,
        policy: &ReviewPolicy,
        forced_block: Option<&str>,
    ) -> ReviewItem {
        let risk_level = detect_risk_level(&input.topic, policy);
        let overall = scores.overall_quality_score();
        let priority = derive_priority(risk_level, overall, policy);
        let citation_validation =
            CitationValidation::from_analysis(&scores.citations, policy.min_citation_count);
        let mut eligibility =
            evaluate_auto_approval(overall, risk_level, scores.citations.total, policy);
        if let Some(reason) = forced_block {
            eligibility.eligible = false;
            eligibility.blocked_reason = Some(reason.to_string());
        }

        let now = Utc::now();
        let mut item = ReviewItem {
            id: uuid::Uuid::new_v4().to_string(),
            campaign_id: input.campaign_id,
            site_id: input.site_id,
            run_item_id: input.run_item_id,
            word_count: word_count(&input.content),
            title: input.title,
            content: input.content,
            topic: input.topic,
            risk_level,
            eeat_score: scores.eeat.clone(),
            ai_overview_score: scores.ai_overview_score,
            overall_quality_score: overall,
            citation_validation,
            status: ReviewStatus::PendingReview,
            priority,
            assigned_to: None,
            assigned_to_name: None,
            assigned_at: None,
            checklist: default_checklist(risk_level),
            checklist_complete: false,
            change_requests: Vec::new(),
            review_notes: None,
            rejection_reason: None,
            auto_approval_eligible: eligibility.eligible,
            auto_approval_blocked: eligibility.blocked_reason,
            flagged: false,
            flag_reasons: Vec::new(),
            policy_override: input.policy_override,
            created_at: now,
            updated_at: now,
            reviewed_at: None,
            approved_at: None,
            approved_by: None,
            published_at: None,
        };
        item.refresh_checklist_complete();

        info!(
            id = %item.id,
            topic = %item.topic,
            risk = %item.risk_level,
            priority = %item.priority,
            score = item.overall_quality_score,
            eligible = item.auto_approval_eligible,
            "created review item"
        );
        self.items.push(item.clone());
        self.persist();
        item
    }

    pub fn get_review_item(&self, id: &str) -> Option<&ReviewItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Resolve a full id or a unique id prefix (as printed by `queue list`).
    pub fn resolve_id(&self, id_or_prefix: &str) -> Option<String> {
        if let Some(item) = self.get_review_item(id_or_prefix) {
            return Some(item.id.clone());
        }
        let mut matches = self
            .items
            .iter()
            .filter(|item| item.id.starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(item), None) if !id_or_prefix.is_empty() => Some(item.id.clone()),
            _ => None,
        }
    }

    pub fn update_review_item(
        &mut self,
        id: &str,
        patch: ReviewItemPatch,
    ) -> Result<ReviewItem, EditorialError> {
        self.mutate(id, |item, _| {
            if let Some(title) = patch.title {
                item.title = title;
            }
            if let Some(notes) = patch.review_notes {
                item.review_notes = Some(notes);
            }
            if let Some(run_item_id) = patch.run_item_id {
                item.run_item_id = Some(run_item_id);
            }
            Ok(item.clone())
        })
    }

    /// Remove an item. Returns whether it existed.
    pub fn delete_review_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;
        if removed {
            if self.selected_item_id.as_deref() == Some(id) {
                self.selected_item_id = None;
            }
            self.persist();
            info!(id, "deleted review item");
        }
        removed
    }

    /// Select an item for detail views. Selecting an unknown id clears the
    /// selection and returns false.
    pub fn select_item(&mut self, id: Option<&str>) -> bool {
        match id {
            Some(id) if self.get_review_item(id).is_some() => {
                self.selected_item_id = Some(id.to_string());
                true
            }
            _ => {
                self.selected_item_id = None;
                false
            }
        }
    }

    pub fn selected_item(&self) -> Option<&ReviewItem> {
        self.selected_item_id
            .as_deref()
            .and_then(|id| self.get_review_item(id))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn filters(&self) -> &ReviewFilters {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: ReviewFilters) {
        self.filters = filters;
    }

    pub fn clear_filters(&mut self) {
        self.filters = ReviewFilters::default();
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
    }

    /// Items matching the active filters, in the active sort order.
    pub fn filtered_items(&self) -> Vec<&ReviewItem> {
        let mut items: Vec<&ReviewItem> = self
            .items
            .iter()
            .filter(|item| self.filters.matches(item))
            .collect();
        self.sort.sort(&mut items);
        items
    }

    pub fn queue_stats(&self) -> QueueStats {
        self.queue_stats_at(Utc::now())
    }

    pub fn queue_stats_at(&self, now: DateTime<Utc>) -> QueueStats {
        QueueStats::compute(&self.items, now)
    }

    // ------------------------------------------------------------------
    // Assignment
    // ------------------------------------------------------------------

    pub fn assign_reviewer(
        &mut self,
        id: &str,
        reviewer_id: &str,
        reviewer_name: Option<&str>,
    ) -> Result<(), EditorialError> {
        self.mutate(id, |item, _| {
            item.assigned_to = Some(reviewer_id.to_string());
            item.assigned_to_name = reviewer_name.map(str::to_string);
            item.assigned_at = Some(Utc::now());
            Ok(())
        })?;
        info!(id, reviewer = reviewer_id, "assigned reviewer");
        Ok(())
    }

    pub fn unassign_reviewer(&mut self, id: &str) -> Result<(), EditorialError> {
        self.mutate(id, |item, _| {
            item.assigned_to = None;
            item.assigned_to_name = None;
            item.assigned_at = None;
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Workflow
    // ------------------------------------------------------------------

    /// Move an item into `in_review`. An unassigned item is assigned to the
    /// reviewer who starts it.
    pub fn start_review(&mut self, id: &str, reviewer_id: &str) -> Result<(), EditorialError> {
        self.mutate(id, |item, _| {
            transition(item, ReviewStatus::InReview)?;
            if item.assigned_to.is_none() {
                item.assigned_to = Some(reviewer_id.to_string());
                item.assigned_at = Some(Utc::now());
            }
            Ok(())
        })?;
        info!(id, reviewer = reviewer_id, "review started");
        Ok(())
    }

    /// Apply a human decision.
    ///
    /// Approval is refused while required checklist entries are unchecked
    /// (every entry when `require_all_checklist_items` is set). A
    /// changes-requested decision counts against `max_change_request_rounds`.
    pub fn submit_decision(
        &mut self,
        id: &str,
        decision: &ReviewDecision,
    ) -> Result<ReviewItem, EditorialError> {
        let updated = self.mutate(id, |item, policy| {
            let target = decision.status.target_status();
            if !item.status.can_transition_to(target) {
                return Err(EditorialError::InvalidTransition {
                    id: item.id.clone(),
                    from: item.status,
                    to: target,
                });
            }

            let now = Utc::now();
            match decision.status {
                DecisionStatus::Approved => {
                    if policy.require_checklist {
                        let missing = item.unchecked_count(policy.require_all_checklist_items);
                        if missing > 0 {
                            return Err(EditorialError::ChecklistIncomplete {
                                id: item.id.clone(),
                                missing,
                            });
                        }
                    }
                    item.approved_at = Some(now);
                    item.approved_by = Some(decision.reviewer_id.clone());
                }
                DecisionStatus::Rejected => {
                    item.rejection_reason = decision.rejection_reason.clone();
                }
                DecisionStatus::ChangesRequested => {
                    check_change_request_cap(item, policy)?;
                    let message = decision
                        .change_message
                        .as_deref()
                        .or(decision.notes.as_deref())
                        .unwrap_or("Changes requested");
                    item.change_requests
                        .push(ChangeRequest::new(&decision.reviewer_id, message));
                }
            }

            item.status = target;
            item.reviewed_at = Some(now);
            if let Some(notes) = &decision.notes {
                item.review_notes = Some(notes.clone());
            }
            Ok(item.clone())
        })?;
        info!(
            id,
            decision = %decision.status,
            reviewer = %decision.reviewer_id,
            "review decision recorded"
        );
        Ok(updated)
    }

    /// Append an unresolved change request.
    ///
    /// Open items move to `changes_requested` and use up one of
    /// `max_change_request_rounds`. Terminal items keep their status; the
    /// request is kept for audit only and is not capped.
    pub fn request_changes(
        &mut self,
        id: &str,
        requested_by: &str,
        message: &str,
    ) -> Result<ChangeRequest, EditorialError> {
        let request = self.mutate(id, |item, policy| {
            if item.status.is_terminal() {
                let request = ChangeRequest::for_audit(requested_by, message);
                item.change_requests.push(request.clone());
                debug!(id = %item.id, status = %item.status, "change request recorded on terminal item");
                return Ok(request);
            }
            check_change_request_cap(item, policy)?;
            let request = ChangeRequest::new(requested_by, message);
            item.change_requests.push(request.clone());
            item.status = ReviewStatus::ChangesRequested;
            Ok(request)
        })?;
        info!(id, change_request = %request.id, "changes requested");
        Ok(request)
    }

    pub fn resolve_change_request(
        &mut self,
        id: &str,
        change_request_id: &str,
    ) -> Result<(), EditorialError> {
        self.mutate(id, |item, _| {
            let request = item
                .change_requests
                .iter_mut()
                .find(|c| c.id == change_request_id)
                .ok_or_else(|| EditorialError::ChangeRequestNotFound {
                    item_id: item.id.clone(),
                    change_id: change_request_id.to_string(),
                })?;
            if !request.resolved {
                request.resolved = true;
                request.resolved_at = Some(Utc::now());
            }
            Ok(())
        })
    }

    /// Move a `changes_requested` item back to `pending_review` once the
    /// author has revised it.
    pub fn resubmit(&mut self, id: &str) -> Result<(), EditorialError> {
        self.mutate(id, |item, _| {
            if item.status != ReviewStatus::ChangesRequested {
                return Err(EditorialError::InvalidTransition {
                    id: item.id.clone(),
                    from: item.status,
                    to: ReviewStatus::PendingReview,
                });
            }
            transition(item, ReviewStatus::PendingReview)
        })
    }

    /// Flip one checklist entry. Returns the recomputed `checklist_complete`.
    pub fn toggle_checklist_item(
        &mut self,
        id: &str,
        checklist_item_id: &str,
        checked_by: &str,
    ) -> Result<bool, EditorialError> {
        self.mutate(id, |item, _| {
            let entry = item
                .checklist
                .iter_mut()
                .find(|c| c.id == checklist_item_id)
                .ok_or_else(|| EditorialError::ChecklistItemNotFound {
                    item_id: item.id.clone(),
                    checklist_id: checklist_item_id.to_string(),
                })?;
            entry.checked = !entry.checked;
            if entry.checked {
                entry.checked_at = Some(Utc::now());
                entry.checked_by = Some(checked_by.to_string());
            } else {
                entry.checked_at = None;
                entry.checked_by = None;
            }
            item.refresh_checklist_complete();
            Ok(item.checklist_complete)
        })
    }

    // ------------------------------------------------------------------
    // Auto-approval
    // ------------------------------------------------------------------

    /// Eligibility recorded when the item was created. This is a snapshot:
    /// later policy changes do not affect it.
    pub fn check_auto_approval(&self, id: &str) -> AutoApprovalCheck {
        match self.get_review_item(id) {
            Some(item) => AutoApprovalCheck {
                eligible: item.auto_approval_eligible,
                reason: item.auto_approval_blocked.clone(),
            },
            None => AutoApprovalCheck {
                eligible: false,
                reason: Some("Item not found".to_string()),
            },
        }
    }

    /// Finalize an eligible, non-terminal item as `auto_approved`. Returns
    /// whether the item actually transitioned.
    pub fn process_auto_approval(&mut self, id: &str) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            warn!(id, "auto-approval requested for unknown item");
            return false;
        };
        if !item.auto_approval_eligible
            || !item.status.can_transition_to(ReviewStatus::AutoApproved)
        {
            debug!(
                id,
                status = %item.status,
                eligible = item.auto_approval_eligible,
                "item not auto-approved"
            );
            return false;
        }

        let now = Utc::now();
        item.status = ReviewStatus::AutoApproved;
        item.approved_at = Some(now);
        item.updated_at = now;
        item.review_notes = Some(AUTO_APPROVAL_NOTE.to_string());
        self.persist();
        info!(id, "item auto-approved");
        true
    }

    /// Mark an item as flagged by the decision engine. Flagging does not
    /// change the status; it makes an open item publishable.
    pub fn flag_item(&mut self, id: &str, reasons: &[String]) -> Result<ReviewItem, EditorialError> {
        let item = self.mutate(id, |item, _| {
            item.flagged = true;
            item.flag_reasons = reasons.to_vec();
            Ok(item.clone())
        })?;
        info!(id, reasons = reasons.len(), "item flagged");
        Ok(item)
    }

    /// Stamp `published_at` on an approved, auto-approved or flagged item.
    pub fn mark_published(&mut self, id: &str) -> Result<(), EditorialError> {
        self.mutate(id, |item, _| {
            if !item.is_publishable() {
                return Err(EditorialError::NotPublishable {
                    id: item.id.clone(),
                    status: item.status,
                });
            }
            item.published_at = Some(Utc::now());
            Ok(())
        })?;
        info!(id, "item marked published");
        Ok(())
    }
}

fn transition(item: &mut ReviewItem, to: ReviewStatus) -> Result<(), EditorialError> {
    if !item.status.can_transition_to(to) {
        return Err(EditorialError::InvalidTransition {
            id: item.id.clone(),
            from: item.status,
            to,
        });
    }
    item.status = to;
    Ok(())
}

fn check_change_request_cap(item: &ReviewItem, policy: &ReviewPolicy) -> Result<(), EditorialError> {
    if item.review_rounds() as u32 >= policy.max_change_request_rounds {
        return Err(EditorialError::ChangeRequestLimit {
            id: item.id.clone(),
            max_rounds: policy.max_change_request_rounds,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::{Priority, RiskLevel};
    use crate::scoring::{CitationAnalysis, EeatScore};
    use crate::storage::{JsonFileStore, MemoryStore};
    use chrono::Duration;

    fn scores(overall: u32, citations: usize) -> ContentScores {
        ContentScores {
            eeat: EeatScore::from_subscores(overall, overall, overall, overall),
            ai_overview_score: None,
            citations: CitationAnalysis {
                total: citations,
                verified: citations,
                ..Default::default()
            },
            word_count: 3,
        }
    }

    fn input(topic: &str) -> CreateReviewInput {
        CreateReviewInput {
            campaign_id: "camp-1".to_string(),
            site_id: "site-1".to_string(),
            run_item_id: None,
            title: "Test article".to_string(),
            content: "<p>Three word body</p>".to_string(),
            topic: topic.to_string(),
            ..Default::default()
        }
    }

    fn repo() -> ReviewRepository<MemoryStore> {
        ReviewRepository::open(MemoryStore::new())
    }

    fn check_all_required(repo: &mut ReviewRepository<MemoryStore>, id: &str) {
        let required: Vec<String> = repo
            .get_review_item(id)
            .unwrap()
            .checklist
            .iter()
            .filter(|c| c.required)
            .map(|c| c.id.clone())
            .collect();
        for checklist_id in required {
            repo.toggle_checklist_item(id, &checklist_id, "ed").unwrap();
        }
    }

    // =========================================
    // Creation
    // =========================================

    #[test]
    fn test_create_derives_risk_priority_and_eligibility() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("general tips"), &scores(90, 5));
        assert_eq!(item.status, ReviewStatus::PendingReview);
        assert_eq!(item.risk_level, RiskLevel::Standard);
        assert_eq!(item.priority, Priority::Low);
        assert_eq!(item.overall_quality_score, 90);
        assert_eq!(item.word_count, 3);
        assert!(item.auto_approval_eligible);
        assert!(item.auto_approval_blocked.is_none());
        assert!(!item.checklist_complete);
        assert_eq!(item.created_at, item.updated_at);
    }

    #[test]
    fn test_create_ymyl_is_blocked_and_urgent_when_low() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("medical advice"), &scores(70, 5));
        assert_eq!(item.risk_level, RiskLevel::Ymyl);
        assert_eq!(item.priority, Priority::Urgent);
        assert!(!item.auto_approval_eligible);
        assert!(item.checklist.iter().any(|c| c.id == "ymyl-claims"));
    }

    #[test]
    fn test_create_with_scorer() {
        let mut repo = repo();
        let scorer = crate::scoring::HeuristicScorer::new();
        let item = repo.create_review_item(input("kettles"), &scorer);
        assert!(item.overall_quality_score <= 100);
        assert_eq!(repo.items().len(), 1);
    }

    // =========================================
    // CRUD and selection
    // =========================================

    #[test]
    fn test_update_refreshes_updated_at() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(70, 3));
        let updated = repo
            .update_review_item(
                &item.id,
                ReviewItemPatch {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert!(updated.updated_at >= item.updated_at);
        assert_eq!(updated.priority, item.priority);
    }

    #[test]
    fn test_update_missing_item_errors() {
        let mut repo = repo();
        let err = repo
            .update_review_item("nope", ReviewItemPatch::default())
            .unwrap_err();
        assert!(matches!(err, EditorialError::ItemNotFound { .. }));
    }

    #[test]
    fn test_delete_clears_selection() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(70, 3));
        assert!(repo.select_item(Some(&item.id)));
        assert_eq!(repo.selected_item().map(|i| i.id.as_str()), Some(item.id.as_str()));

        assert!(repo.delete_review_item(&item.id));
        assert!(repo.selected_item().is_none());
        assert!(!repo.delete_review_item(&item.id));
    }

    #[test]
    fn test_select_unknown_clears_selection() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(70, 3));
        repo.select_item(Some(&item.id));
        assert!(!repo.select_item(Some("missing")));
        assert!(repo.selected_item().is_none());
    }

    #[test]
    fn test_resolve_id_by_prefix() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(70, 3));
        assert_eq!(repo.resolve_id(&item.id[..8]), Some(item.id.clone()));
        assert_eq!(repo.resolve_id(&item.id), Some(item.id.clone()));
        assert_eq!(repo.resolve_id(""), None);
        assert_eq!(repo.resolve_id("zzzz"), None);
    }

    // =========================================
    // Filtering, sorting, stats
    // =========================================

    #[test]
    fn test_filtered_items_and_sort() {
        let mut repo = repo();
        let low = repo.create_scored_review_item(input("tips"), &scores(90, 5));
        let urgent = repo.create_scored_review_item(input("health"), &scores(50, 5));
        let normal = repo.create_scored_review_item(input("gadgets"), &scores(70, 5));

        let ids: Vec<&str> = repo.filtered_items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec![urgent.id.as_str(), normal.id.as_str(), low.id.as_str()]);

        repo.set_sort(SortKey::ScoreDesc);
        let ids: Vec<&str> = repo.filtered_items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec![low.id.as_str(), normal.id.as_str(), urgent.id.as_str()]);

        repo.set_filters(ReviewFilters::default().with_risk_level(RiskLevel::Ymyl));
        assert_eq!(repo.filtered_items().len(), 1);
        repo.clear_filters();
        assert_eq!(repo.filtered_items().len(), 3);
    }

    #[test]
    fn test_filters_are_anded() {
        let mut repo = repo();
        let a = repo.create_scored_review_item(input("tips"), &scores(70, 5));
        let mut other_site = input("tips");
        other_site.site_id = "site-2".to_string();
        repo.create_scored_review_item(other_site, &scores(70, 5));
        repo.assign_reviewer(&a.id, "ed-1", Some("Editor One")).unwrap();

        repo.set_filters(ReviewFilters::default().with_site("site-1").with_assignee("ed-1"));
        assert_eq!(repo.filtered_items().len(), 1);

        repo.set_filters(ReviewFilters::default().with_site("site-1").unassigned());
        assert!(repo.filtered_items().is_empty());

        repo.set_filters(ReviewFilters::default().with_status(ReviewStatus::Approved));
        assert!(repo.filtered_items().is_empty());
    }

    #[test]
    fn test_filtered_items_is_pure() {
        let mut repo = repo();
        repo.create_scored_review_item(input("tips"), &scores(90, 5));
        repo.create_scored_review_item(input("health"), &scores(50, 5));
        repo.set_sort(SortKey::ScoreAsc);

        let before: Vec<String> = repo.items().iter().map(|i| i.id.clone()).collect();
        let first: Vec<String> = repo.filtered_items().iter().map(|i| i.id.clone()).collect();
        let second: Vec<String> = repo.filtered_items().iter().map(|i| i.id.clone()).collect();
        let after: Vec<String> = repo.items().iter().map(|i| i.id.clone()).collect();
        assert_eq!(first, second);
        assert_eq!(before, after);
    }

    #[test]
    fn test_queue_stats() {
        let mut repo = repo();
        let a = repo.create_scored_review_item(input("tips"), &scores(90, 5));
        repo.create_scored_review_item(input("health"), &scores(50, 5));
        repo.process_auto_approval(&a.id);

        let now = Utc::now() + Duration::seconds(10);
        let stats = repo.queue_stats_at(now);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.count_status(ReviewStatus::AutoApproved), 1);
        assert_eq!(stats.count_status(ReviewStatus::PendingReview), 1);
        assert_eq!(stats.open_count(), 1);
        assert_eq!(stats.by_risk.get("ymyl"), Some(&1));
        assert_eq!(stats.by_priority.get("urgent"), Some(&1));
        assert_eq!(stats.avg_eeat_score, 70.0);
        assert!(stats.avg_time_in_queue_ms >= 10_000);

        assert_eq!(stats, repo.queue_stats_at(now));
    }

    #[test]
    fn test_queue_stats_empty() {
        let stats = repo().queue_stats();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.avg_eeat_score, 0.0);
        assert_eq!(stats.avg_time_in_queue_ms, 0);
    }

    // =========================================
    // Assignment and workflow
    // =========================================

    #[test]
    fn test_assign_and_unassign() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(70, 3));
        repo.assign_reviewer(&item.id, "ed-1", Some("Editor One")).unwrap();
        let assigned = repo.get_review_item(&item.id).unwrap();
        assert_eq!(assigned.assigned_to.as_deref(), Some("ed-1"));
        assert_eq!(assigned.assigned_to_name.as_deref(), Some("Editor One"));
        assert!(assigned.assigned_at.is_some());
        assert_eq!(assigned.status, ReviewStatus::PendingReview);

        repo.unassign_reviewer(&item.id).unwrap();
        let unassigned = repo.get_review_item(&item.id).unwrap();
        assert!(unassigned.assigned_to.is_none());
        assert!(unassigned.assigned_at.is_none());
    }

    #[test]
    fn test_start_review_assigns_reviewer() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(70, 3));
        repo.start_review(&item.id, "ed-2").unwrap();
        let started = repo.get_review_item(&item.id).unwrap();
        assert_eq!(started.status, ReviewStatus::InReview);
        assert_eq!(started.assigned_to.as_deref(), Some("ed-2"));

        let err = repo.start_review(&item.id, "ed-2").unwrap_err();
        assert!(matches!(err, EditorialError::InvalidTransition { .. }));
    }

    #[test]
    fn test_approval_requires_checklist() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(70, 3));
        repo.start_review(&item.id, "ed").unwrap();

        let err = repo
            .submit_decision(&item.id, &ReviewDecision::approve("ed"))
            .unwrap_err();
        assert!(matches!(err, EditorialError::ChecklistIncomplete { missing: 3, .. }));

        check_all_required(&mut repo, &item.id);
        let approved = repo
            .submit_decision(&item.id, &ReviewDecision::approve("ed").with_notes("good"))
            .unwrap();
        assert_eq!(approved.status, ReviewStatus::Approved);
        assert_eq!(approved.approved_by.as_deref(), Some("ed"));
        assert!(approved.approved_at.is_some());
        assert!(approved.reviewed_at.is_some());
        assert_eq!(approved.review_notes.as_deref(), Some("good"));
    }

    #[test]
    fn test_require_all_checklist_items() {
        let mut repo = repo();
        repo.update_policy(&PolicyOverride {
            require_all_checklist_items: Some(true),
            ..Default::default()
        });
        let item = repo.create_scored_review_item(input("tips"), &scores(70, 3));
        check_all_required(&mut repo, &item.id);
        let err = repo
            .submit_decision(&item.id, &ReviewDecision::approve("ed"))
            .unwrap_err();
        assert!(matches!(err, EditorialError::ChecklistIncomplete { missing: 2, .. }));
    }

    #[test]
    fn test_checklist_not_required_when_disabled() {
        let mut repo = repo();
        repo.update_policy(&PolicyOverride {
            require_checklist: Some(false),
            ..Default::default()
        });
        let item = repo.create_scored_review_item(input("tips"), &scores(70, 3));
        let approved = repo
            .submit_decision(&item.id, &ReviewDecision::approve("ed"))
            .unwrap();
        assert_eq!(approved.status, ReviewStatus::Approved);
    }

    #[test]
    fn test_reject_records_reason_and_is_terminal() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(70, 3));
        let rejected = repo
            .submit_decision(&item.id, &ReviewDecision::reject("ed", "Thin content"))
            .unwrap();
        assert_eq!(rejected.status, ReviewStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Thin content"));

        let err = repo
            .submit_decision(&item.id, &ReviewDecision::approve("ed"))
            .unwrap_err();
        assert!(matches!(
            err,
            EditorialError::InvalidTransition {
                from: ReviewStatus::Rejected,
                to: ReviewStatus::Approved,
                ..
            }
        ));
    }

    #[test]
    fn test_changes_requested_decision_appends_request() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(70, 3));
        let updated = repo
            .submit_decision(&item.id, &ReviewDecision::request_changes("ed", "Add sources"))
            .unwrap();
        assert_eq!(updated.status, ReviewStatus::ChangesRequested);
        assert_eq!(updated.change_requests.len(), 1);
        assert_eq!(updated.change_requests[0].message, "Add sources");
        assert!(!updated.change_requests[0].resolved);
    }

    #[test]
    fn test_request_changes_cap_and_resolve() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(70, 3));
        let first = repo.request_changes(&item.id, "ed", "one").unwrap();
        repo.request_changes(&item.id, "ed", "two").unwrap();
        repo.request_changes(&item.id, "ed", "three").unwrap();
        let err = repo.request_changes(&item.id, "ed", "four").unwrap_err();
        assert!(matches!(err, EditorialError::ChangeRequestLimit { max_rounds: 3, .. }));

        repo.resolve_change_request(&item.id, &first.id).unwrap();
        let stored = repo.get_review_item(&item.id).unwrap();
        assert_eq!(stored.status, ReviewStatus::ChangesRequested);
        assert_eq!(stored.unresolved_change_requests().count(), 2);
        assert!(stored.change_requests[0].resolved_at.is_some());

        let err = repo.resolve_change_request(&item.id, "missing").unwrap_err();
        assert!(matches!(err, EditorialError::ChangeRequestNotFound { .. }));
    }

    #[test]
    fn test_request_changes_on_terminal_item_is_audit_only() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(90, 5));
        assert!(repo.process_auto_approval(&item.id));
        repo.request_changes(&item.id, "ed", "typo in intro").unwrap();
        let stored = repo.get_review_item(&item.id).unwrap();
        assert_eq!(stored.status, ReviewStatus::AutoApproved);
        assert_eq!(stored.change_requests.len(), 1);
        assert!(stored.change_requests[0].audit);
        assert_eq!(stored.review_rounds(), 0);
    }

    #[test]
    fn test_audit_change_request_after_all_rounds_used() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(70, 3));
        for message in ["one", "two", "three"] {
            repo.request_changes(&item.id, "ed", message).unwrap();
        }
        repo.resubmit(&item.id).unwrap();
        for cid in ["facts-verified", "citations-support-claims", "title-accurate"] {
            repo.toggle_checklist_item(&item.id, cid, "ed").unwrap();
        }
        repo.submit_decision(&item.id, &ReviewDecision::approve("ed"))
            .unwrap();

        let request = repo
            .request_changes(&item.id, "ed", "post-publication note")
            .unwrap();
        assert!(request.audit);
        let stored = repo.get_review_item(&item.id).unwrap();
        assert_eq!(stored.status, ReviewStatus::Approved);
        assert_eq!(stored.change_requests.len(), 4);
        assert_eq!(stored.review_rounds(), 3);
    }

    #[test]
    fn test_audit_entries_do_not_use_up_rounds() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(70, 3));
        repo.find_mut(&item.id)
            .unwrap()
            .change_requests
            .push(ChangeRequest::for_audit("ed", "old note"));
        for message in ["one", "two", "three"] {
            repo.request_changes(&item.id, "ed", message).unwrap();
        }
        let err = repo.request_changes(&item.id, "ed", "four").unwrap_err();
        assert!(matches!(err, EditorialError::ChangeRequestLimit { max_rounds: 3, .. }));
    }

    #[test]
    fn test_resubmit_after_changes() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(70, 3));
        assert!(repo.resubmit(&item.id).is_err());
        repo.request_changes(&item.id, "ed", "fix").unwrap();
        repo.resubmit(&item.id).unwrap();
        assert_eq!(
            repo.get_review_item(&item.id).unwrap().status,
            ReviewStatus::PendingReview
        );
    }

    #[test]
    fn test_toggle_checklist_derivation() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(70, 3));

        // optional items never affect completeness
        assert!(!repo.toggle_checklist_item(&item.id, "internal-links", "ed").unwrap());
        assert!(!repo.toggle_checklist_item(&item.id, "facts-verified", "ed").unwrap());
        assert!(!repo.toggle_checklist_item(&item.id, "citations-support-claims", "ed").unwrap());
        assert!(repo.toggle_checklist_item(&item.id, "title-accurate", "ed").unwrap());

        // unchecking a required item breaks completeness again
        assert!(!repo.toggle_checklist_item(&item.id, "facts-verified", "ed").unwrap());
        let stored = repo.get_review_item(&item.id).unwrap();
        let entry = stored.checklist.iter().find(|c| c.id == "facts-verified").unwrap();
        assert!(!entry.checked);
        assert!(entry.checked_by.is_none());

        let err = repo.toggle_checklist_item(&item.id, "nope", "ed").unwrap_err();
        assert!(matches!(err, EditorialError::ChecklistItemNotFound { .. }));
    }

    // =========================================
    // Auto-approval
    // =========================================

    #[test]
    fn test_check_auto_approval_missing_item() {
        let check = repo().check_auto_approval("ghost");
        assert!(!check.eligible);
        assert_eq!(check.reason.as_deref(), Some("Item not found"));
    }

    #[test]
    fn test_check_auto_approval_is_a_snapshot() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(90, 5));
        repo.update_policy(&PolicyOverride {
            auto_approve_above_score: Some(95),
            ..Default::default()
        });
        assert!(repo.check_auto_approval(&item.id).eligible);
    }

    #[test]
    fn test_process_auto_approval() {
        let mut repo = repo();
        let eligible = repo.create_scored_review_item(input("tips"), &scores(90, 5));
        let blocked = repo.create_scored_review_item(input("tips"), &scores(70, 5));

        assert!(repo.process_auto_approval(&eligible.id));
        let approved = repo.get_review_item(&eligible.id).unwrap();
        assert_eq!(approved.status, ReviewStatus::AutoApproved);
        assert!(approved.approved_at.is_some());
        assert_eq!(approved.review_notes.as_deref(), Some(AUTO_APPROVAL_NOTE));

        assert!(!repo.process_auto_approval(&eligible.id));
        assert!(!repo.process_auto_approval(&blocked.id));
        assert!(!repo.process_auto_approval("ghost"));
    }

    #[test]
    fn test_mark_published() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(90, 5));
        let err = repo.mark_published(&item.id).unwrap_err();
        assert!(matches!(err, EditorialError::NotPublishable { .. }));

        repo.process_auto_approval(&item.id);
        repo.mark_published(&item.id).unwrap();
        assert!(repo.get_review_item(&item.id).unwrap().published_at.is_some());
    }

    #[test]
    fn test_flagged_item_is_publishable_until_a_human_intervenes() {
        let mut repo = repo();
        let item = repo.create_scored_review_item(input("tips"), &scores(75, 3));
        let reasons = vec!["Weak experience".to_string()];
        let flagged = repo.flag_item(&item.id, &reasons).unwrap();
        assert!(flagged.flagged);
        assert_eq!(flagged.flag_reasons, reasons);
        assert_eq!(flagged.status, ReviewStatus::PendingReview);

        repo.mark_published(&item.id).unwrap();
        assert!(repo.get_review_item(&item.id).unwrap().published_at.is_some());

        let other = repo.create_scored_review_item(input("tips"), &scores(75, 3));
        repo.flag_item(&other.id, &reasons).unwrap();
        repo.request_changes(&other.id, "ed", "rework").unwrap();
        let err = repo.mark_published(&other.id).unwrap_err();
        assert!(matches!(
            err,
            EditorialError::NotPublishable {
                status: ReviewStatus::ChangesRequested,
                ..
            }
        ));

        let err = repo.flag_item("ghost", &reasons).unwrap_err();
        assert!(matches!(err, EditorialError::ItemNotFound { .. }));
    }

    // =========================================
    // Persistence
    // =========================================

    #[test]
    fn test_items_and_policy_round_trip_through_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let mut repo = ReviewRepository::open(JsonFileStore::new(dir.path()));
            repo.update_policy(&PolicyOverride {
                min_citation_count: Some(5),
                ..Default::default()
            });
            let item = repo.create_scored_review_item(input("health"), &scores(70, 5));
            repo.request_changes(&item.id, "ed", "more sources").unwrap();
            item.id
        };

        let reopened = ReviewRepository::open(JsonFileStore::new(dir.path()));
        assert_eq!(reopened.policy().min_citation_count, 5);
        let item = reopened.get_review_item(&id).unwrap();
        assert_eq!(item.status, ReviewStatus::ChangesRequested);
        assert_eq!(item.risk_level, RiskLevel::Ymyl);

        let json = serde_json::to_value(item).unwrap();
        let back: ReviewItem = serde_json::from_value(json).unwrap();
        assert_eq!(&back, item);
    }

    #[test]
    fn test_failed_saves_keep_in_memory_state() {
        let mut repo = ReviewRepository::open(MemoryStore::failing());
        let item = repo.create_scored_review_item(input("tips"), &scores(70, 3));
        assert!(repo.get_review_item(&item.id).is_some());
        assert!(repo.store().get(REVIEW_ITEMS_KEY).is_none());
    }

    #[test]
    fn test_malformed_stored_items_start_fresh() {
        let store = MemoryStore::new();
        store.insert(REVIEW_ITEMS_KEY, serde_json::json!({"not": "a list"}));
        let repo = ReviewRepository::open(store);
        assert!(repo.items().is_empty());
    }
}

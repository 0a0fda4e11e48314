//! Write-through persistence for [`LearningState`].

use super::{ImprovementCategory, LearningState, ReviewFeedback};
use crate::storage::{KeyValueStore, LEARNING_STATE_KEY, load_or_default, save_best_effort};

/// Owns a learning state and persists it after every mutation.
///
/// Reads go through [`LearningLoop::state`]; the state itself stays a plain
/// value so it can be handed to pure functions such as the decision engine.
pub struct LearningLoop<S: KeyValueStore> {
    store: S,
    state: LearningState,
}

impl<S: KeyValueStore> LearningLoop<S> {
    /// Load the learning state from `store`, starting fresh when it is
    /// missing or unreadable.
    pub fn open(store: S) -> Self {
        let state = load_or_default(&store, LEARNING_STATE_KEY);
        Self { store, state }
    }

    /// Wrap an existing state. Nothing is written until the first mutation.
    pub fn with_state(store: S, state: LearningState) -> Self {
        Self { store, state }
    }

    pub fn state(&self) -> &LearningState {
        &self.state
    }

    pub fn into_state(self) -> LearningState {
        self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&self) -> bool {
        save_best_effort(&self.store, LEARNING_STATE_KEY, &self.state)
    }

    /// Record a review outcome and persist. Returns whether the topic
    /// threshold was tightened.
    pub fn record_review_feedback(&mut self, feedback: &ReviewFeedback) -> bool {
        let adjusted = self.state.record_review_feedback(feedback);
        self.persist();
        adjusted
    }

    pub fn adjust_threshold_up(&mut self, topic: &str, is_ymyl: bool, factor: f64) {
        self.state.adjust_threshold_up(topic, is_ymyl, factor);
        self.persist();
    }

    pub fn record_content_improvement(
        &mut self,
        category: ImprovementCategory,
        signal: &str,
        suggested_prompt_addition: Option<&str>,
    ) {
        self.state
            .record_content_improvement(category, signal, suggested_prompt_addition);
        self.persist();
    }
}

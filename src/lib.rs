//! Editorial quality gate and adaptive auto-approval engine.
//!
//! Generated content flows through three stages:
//!
//! 1. [`gate`] scores it (via a [`scoring::ScoreProvider`]) against the
//!    [`review::ReviewPolicy`] and creates a [`review::ReviewItem`]
//! 2. [`review::arbiter`] decides approve / flag / retry against a threshold
//!    tightened by [`learning`]
//! 3. human reviewers work the queue in [`review::ReviewRepository`]; their
//!    decisions flow back into [`learning`]
//!
//! [`pipeline::EditorialPipeline`] wires the stages together.

pub mod editorial_config;
pub mod errors;
pub mod gate;
pub mod init;
pub mod learning;
pub mod pipeline;
pub mod review;
pub mod scoring;
pub mod storage;
pub mod ui;
pub mod util;

pub use errors::EditorialError;

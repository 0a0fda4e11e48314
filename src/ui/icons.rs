//! Shared UI icons.
//!
//! Each icon carries a plain-text fallback for terminals without emoji support.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[X] ");
pub static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "* ");

// Review workflow
pub static PENDING: Emoji<'_, '_> = Emoji("⏳ ", "[..] ");
pub static REVIEW: Emoji<'_, '_> = Emoji("🔍 ", "[R] ");
pub static CHANGES: Emoji<'_, '_> = Emoji("📝 ", "[~] ");
pub static PUBLISH: Emoji<'_, '_> = Emoji("🚀 ", "[P] ");
pub static RETRY: Emoji<'_, '_> = Emoji("🔄 ", "[RETRY] ");

// Reports
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static LEARN: Emoji<'_, '_> = Emoji("🧠 ", "");

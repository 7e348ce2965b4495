//! Shared terminal icons, with plain-text fallbacks.

use console::Emoji;

// Status
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!]");

// Station page
pub static SCANNER: Emoji<'_, '_> = Emoji("📟 ", "");
pub static EMPLOYEE: Emoji<'_, '_> = Emoji("👤 ", "");
pub static CAMERA: Emoji<'_, '_> = Emoji("📷 ", "[photo]");
pub static CAPTURE: Emoji<'_, '_> = Emoji("⏺️  ", "[..]");

// Orders
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");

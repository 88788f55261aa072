//! Centralized balance and tuning constants for Year Beast.
//!
//! These values define the deterministic math for the clicker. Every config
//! struct falls back to them when a field is missing from JSON.

// Persistence --------------------------------------------------------------
pub const DEFAULT_SAVE_SLOT: &str = "year-beast-game";
pub const PLAY_DATE_FORMAT: &str = "%a %b %d %Y";

// Starting resources -------------------------------------------------------
pub const STARTING_CURRENCY: u64 = 5_000;

// Level curve --------------------------------------------------------------
pub const BASE_HP: u64 = 1_000;
pub const HP_INCREMENT_PER_LEVEL: u64 = 500;
pub const REWARD_BASE: u64 = 50;
pub const REWARD_PER_LEVEL: u64 = 25;

// Combat -------------------------------------------------------------------
pub const DAMAGE_PER_FIRECRACKER: u64 = 10;
pub const CRIT_CHANCE: f64 = 0.15;
pub const CRIT_MULTIPLIER: f64 = 2.0;
pub const FIRECRACKERS_PER_HIT: u64 = 1;

// Input rate guard ---------------------------------------------------------
pub const MAX_CLICKS_PER_WINDOW: usize = 10;
pub const CLICK_WINDOW_MS: u64 = 1_000;

// Integrity ----------------------------------------------------------------
pub const MAX_PLAUSIBLE_CURRENCY: u64 = 999_999;
pub const MAX_PLAUSIBLE_LEVEL: u32 = 100;

// Tasks --------------------------------------------------------------------
pub const TASK_DAILY_LOGIN: &str = "daily_login";
pub const TASK_STAY: &str = "stay_15s";
pub const TASK_CLICKS: &str = "click_100";
pub const STAY_TICK_MS: u64 = 1_000;

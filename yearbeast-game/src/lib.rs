//! Year Beast Game Engine
//!
//! Platform-agnostic rules for the Year Beast clicker: spend firecrackers to
//! damage the beast, clear levels, and claim daily task rewards. This crate
//! owns game state, its persistence contract, and all balance math; rendering,
//! audio, and input plumbing live with the host.

pub mod clock;
pub mod combat;
pub mod config;
pub mod constants;
pub mod guard;
pub mod integrity;
pub mod levels;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;
pub mod tasks;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock, play_date_string};
pub use combat::{HitOutcome, critical_damage, resolve_hit};
pub use config::{
    CombatConfig, ConfigError, GameConfig, IntegrityLimits, LevelCurveConfig, RateLimitConfig,
};
pub use guard::ClickRateGuard;
pub use integrity::{IntegrityError, check_integrity, snapshot_checksum, verify_checksum};
pub use levels::{LevelCurve, LevelInfo};
pub use session::{HitResult, Session, StayTimer};
pub use state::{Encounter, GameState};
pub use storage::{FileStorage, GameStorage, MemoryStorage, StorageError};
pub use store::{Listener, ListenerId, StateStore};
pub use tasks::{ClaimRefusal, Task, TaskLedger, TaskView, default_tasks};

//! Board and engine constants

/// Number of columns on every battle map
pub const COLS: i32 = 17;

/// Minimum number of rows on a battle map
pub const MIN_ROWS: i32 = 5;

/// Maximum number of rows on a battle map
pub const MAX_ROWS: i32 = 15;

/// Player One deploys in columns `0..P1_ZONE_END`, frontline at the
/// highest column of the zone
pub const P1_ZONE_END: i32 = 6;

/// Player Two deploys in columns `P2_ZONE_START..COLS`, frontline at
/// the lowest column of the zone
pub const P2_ZONE_START: i32 = 11;

/// Maximum effect events applied in a single queue drain. Chains past
/// this point are truncated and logged instead of looping forever.
pub const EVENT_CHAIN_LIMIT: usize = 64;

/// Consecutive identical round snapshots that end the battle in a draw
pub const STALEMATE_ROUNDS: u8 = 3;

/// Stats of the unit created by the summon effect
pub const SUMMON_NAME: &str = "Blade";
pub const SUMMON_HP: i32 = 1;
pub const SUMMON_DAMAGE: i32 = 2;
pub const SUMMON_RANGE: u32 = 1;

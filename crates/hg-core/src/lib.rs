//! Core type aliases, traits, and constants for homegame.
//!
//! This crate provides the foundational types and configuration defaults
//! used throughout the homegame workspace.

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Buy-ins, rebuys, stacks and payouts in whole currency units.
pub type Chips = i64;
/// Wall-clock instant as seconds since the unix epoch.
pub type Timestamp = u64;
/// Elapsed game time in seconds.
pub type Seconds = u64;

// ============================================================================
// TRAITS
// ============================================================================
/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> std::str::FromStr for ID<T> {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self::from)
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

/// Serialized as the bare UUID string so IDs can key JSON maps.
impl<T> serde::Serialize for ID<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.inner.serialize(serializer)
    }
}
impl<'de, T> serde::Deserialize<'de> for ID<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        uuid::Uuid::deserialize(deserializer).map(Self::from)
    }
}

// ============================================================================
// ROSTER LIMITS
// ============================================================================
/// Longest display name a seat can hold, in characters.
pub const MAX_NAME_CHARS: usize = 64;
/// Most players one game can seat; seat numbers are stored as SMALLINT.
pub const MAX_SEATS: usize = i16::MAX as usize;

// ============================================================================
// CASH GAME DEFAULTS
// Values preselected on the game configuration screen.
// ============================================================================
/// Default display currency.
pub const CURRENCY: &str = "₪";
/// Default cash game buy-in.
pub const CASH_BUY_IN: Chips = 20;
/// Default cash game small blind.
pub const CASH_S_BLIND: Chips = 1;
/// Default cash game big blind.
pub const CASH_B_BLIND: Chips = 2;
/// Default lower bound for fixed-range rebuys.
pub const REBUY_MIN: Chips = 10;
/// Default upper bound for fixed-range rebuys.
pub const REBUY_MAX: Chips = 25;
/// Default rebuy size for percentage rebuys (percent of the average stack).
pub const REBUY_PERCENT: u32 = 100;
/// Default cap on rebuys per player (0 = unlimited).
pub const REBUY_LIMIT: u32 = 5;

// ============================================================================
// TOURNAMENT DEFAULTS
// ============================================================================
/// Default tournament buy-in.
pub const TOURNAMENT_BUY_IN: Chips = 50;
/// Default starting stack in tournament chips.
pub const STARTING_CHIPS: Chips = 20000;
/// Default blind level duration in minutes.
pub const LEVEL_MINUTES: u32 = 15;
/// Default first-level small blind.
pub const STARTING_S_BLIND: Chips = 100;
/// Default first-level big blind.
pub const STARTING_B_BLIND: Chips = 200;
/// Default late registration window in minutes.
pub const LATE_REG_MINUTES: u32 = 20;
/// Default late registration window in blind levels.
pub const LATE_REG_LEVEL: u32 = 2;

// ============================================================================
// HOSTING
// ============================================================================
/// Seconds a live table may sit untouched before it is dropped from memory.
pub const TABLE_IDLE_SECS: Seconds = 60 * 60;
/// Seconds between sweeps for idle tables.
pub const SWEEP_SECS: Seconds = 5 * 60;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate termination.
/// Only an unconfirmed settlement is lost; everything else is already stored.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            log::warn!("interrupt received, exiting immediately");
            std::process::exit(0);
        }
    });
}

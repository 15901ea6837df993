//! Application configuration constants.
//! Tuning and thresholds in one place.

// ---- Size thresholds ----

/// Size thresholds for admission and stage skip rules.
pub struct SizeConsts;

impl SizeConsts {
    /// Lower bound of the short-file band skipped by the signature stage (bytes).
    pub const LOW_SIZE: u64 = if cfg!(windows) { 900 } else { 60 };
    /// Upper bound of the short-file band (bytes). Files in `(LOW_SIZE, LITTLE_SIZE)`
    /// skip the signature stage; hashing them whole costs the same read.
    pub const LITTLE_SIZE: u64 = 100 << 10;
    /// Default minimum file size admitted to a scan (bytes). 100 KiB.
    pub const DEFAULT_MIN_SIZE: u64 = 100 << 10;
    /// Default maximum file size admitted to a scan (bytes). 100 GiB.
    pub const DEFAULT_MAX_SIZE: u64 = 100 << 30;
    /// Files at or above this size go through the side-sum rule stage (bytes). 100 MiB.
    pub const BIG_SIZE: u64 = 100 << 20;
    /// Percentage of a large file sampled by the side-sum rule.
    pub const SIZE_RATE: u64 = 10;
}

// ---- I/O ----

/// I/O buffer sizes and windows.
pub struct IoConsts;

impl IoConsts {
    /// Block size assumed when the device cannot be probed (bytes). 4 KiB.
    pub const FALLBACK_BLK: u64 = 4 << 10;
    /// Head/tail window hashed by the signature stage (bytes).
    pub const SIGNATURE_WINDOW: usize = 261;
    /// Base buffer for streaming whole-file hashing (bytes). 32 KiB.
    pub const HASH_BLK: usize = 32 << 10;
    /// Buffer for byte-for-byte comparison (bytes). 8 KiB.
    pub const COMPARE_BLK: usize = 8 << 10;
}

// ---- Device cache ----

/// Devices tracked by the block-size cache before opportunistic eviction.
pub const DEVICE_CACHE_CAPACITY: usize = 128;

// ---- Streaming channel cap ----

/// Cap for the scan channel (walk thread → partitioner).
pub const SCAN_CHANNEL_CAP: usize = 50_000;

//! Production configuration constants.
//!
//! These values define the shipping configuration for waystone and are
//! referenced from both the library and its consumers to keep behavior
//! consistent.

// =============================================================================
// Query Engine Configuration
// =============================================================================

/// Maximum number of entries a single result set may carry.
///
/// Matching beyond this cap is wasted work for the rendering layer, which
/// cannot usefully display hundreds of rows for a one-letter prefix. Entries
/// past the cap are dropped and the result set is flagged as truncated.
pub const DEFAULT_RESULT_CAP: usize = 50;

/// Default debounce interval in milliseconds.
///
/// Bursts of keystrokes arriving faster than this are coalesced into a
/// single match pass. Tuning value only: correctness never depends on it,
/// and zero is a valid setting (every keystroke matched individually).
pub const DEFAULT_DEBOUNCE_MS: u64 = 25;

// =============================================================================
// Index Format
// =============================================================================

/// File name of the partition manifest inside an index directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Index format version this build understands.
///
/// The generator stamps its output with a `formatVersion`; a mismatch makes
/// the whole index unavailable (a stale page build cannot be patched up at
/// query time).
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Manifest key of the catch-all partition.
///
/// Queries whose leading character is neither an ASCII letter nor an ASCII
/// digit (punctuation, non-ASCII) all resolve here.
pub const SYMBOL_PARTITION: &str = "symbols";

//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Compression thresholds and limits
pub mod compression {
    /// Diff size above which reduction kicks in (bytes)
    pub const DEFAULT_SIZE_THRESHOLD_BYTES: u64 = 50_000;

    /// Changed-file count above which reduction kicks in
    pub const DEFAULT_FILES_THRESHOLD: u64 = 100;

    /// Default number of files shown in full by the smart strategy
    pub const DEFAULT_MAX_PRIORITY_FILES: usize = 15;

    /// Valid range for `max_priority_files`
    pub const MIN_PRIORITY_FILES: usize = 1;
    pub const MAX_PRIORITY_FILES: usize = 50;

    /// Default character budget for the smart strategy
    pub const DEFAULT_TOKEN_LIMIT: usize = 100_000;

    /// Smallest accepted character budget; smaller values reset to the default
    pub const MIN_TOKEN_LIMIT: usize = 10_000;

    /// Placeholder returned when there is nothing to compress
    pub const NO_CHANGES_PLACEHOLDER: &str = "(no staged changes)";

    /// Context lines used by the compact strategy
    pub const COMPACT_CONTEXT_LINES: u32 = 1;
}

/// File priority scoring
pub mod scoring {
    /// Source code and other files worth reading in full
    pub const HIGH_PRIORITY: u8 = 100;

    /// Configuration, documentation, build files
    pub const MEDIUM_PRIORITY: u8 = 50;

    /// Lock files and similar derived manifests
    pub const LOW_PRIORITY: u8 = 10;

    /// Score for files no tier recognizes
    pub const DEFAULT_PRIORITY: u8 = 25;

    /// Hard exclusion
    pub const EXCLUDED: u8 = 0;

    /// Percentage kept for files under test directories
    pub const TEST_PATH_PERCENT: u32 = 80;

    /// Percentage kept for files under documentation directories
    pub const DOCS_PATH_PERCENT: u32 = 70;

    /// Percentage kept for files under script/tool directories
    pub const SCRIPTS_PATH_PERCENT: u32 = 90;

    /// Percentage kept for generated files
    pub const GENERATED_PERCENT: u32 = 50;

    /// Characters of content inspected for generated-file markers
    pub const CONTENT_SAMPLE_SCAN_CHARS: usize = 2000;
}

/// Smart hybrid packer
pub mod smart {
    /// Shrink-to-fit iterations before falling back to statistics only
    pub const MAX_ITERATIONS: usize = 3;

    /// Geometric shrink (percent kept) applied when a pass is over budget
    /// without demotions
    pub const SHRINK_PERCENT: usize = 80;

    /// Characters of staged content fetched per file for scoring
    pub const CONTENT_SAMPLE_CHARS: usize = 1000;
}

/// Prompt assembly
pub mod prompt {
    /// Default ticket prefix recognised at the start of branch names
    pub const DEFAULT_TICKET_PREFIX: &str = "IOTIL";
}

//! Diff Compression Engine
//!
//! Keeps a version-control diff small enough to embed in an LLM prompt.
//!
//! ## Flow
//!
//! ```text
//! measure ──► should_compress ──► apply(strategy)
//!                                   ├─ stat / compact / filtered / function-context
//!                                   └─ smart: score ──► rank ──► shrink-to-fit packing
//! ```
//!
//! All diff data comes through a [`DiffProvider`]: [`GitCli`] for a real
//! repository, [`StaticDiff`] for a diff that is already in memory.

pub mod dispatch;
pub mod metrics;
pub mod patterns;
pub mod provider;
pub mod scorer;
pub mod smart;
mod static_diff;
pub mod strategy;

pub use dispatch::{
    CompressionMetadata, CompressionResult, NO_STRATEGY, apply, apply_strategy,
    compress_if_needed,
};
pub use metrics::{ChangeStatistics, DiffSizeMetrics, measure, should_compress};
pub use provider::{DiffProvider, DiffTarget, GitCli, NumStat, ProviderResult};
pub use scorer::{ScoreBreakdown, explain, score_file};
pub use smart::{PackOutcome, pack};
pub use static_diff::StaticDiff;
pub use strategy::{Strategy, StrategyOutput};

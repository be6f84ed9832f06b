//! Path Pattern Sets
//!
//! Glob lists used to exclude, downweight and tier changed files.
//!
//! The exclusion set and the generated-file set overlap in intent but are kept
//! apart: an excluded file never reaches the prompt, a generated file is only
//! discounted.

use std::sync::LazyLock;

use glob::Pattern;

use crate::constants::scoring::CONTENT_SAMPLE_SCAN_CHARS;
use crate::types::truncate_chars;

/// Files that never appear in full: binaries, lock files, minified bundles,
/// generated artifacts.
pub const EXCLUDE_PATTERNS: &[&str] = &[
    // Images and media
    "*.png", "*.jpg", "*.jpeg", "*.gif", "*.bmp", "*.ico", "*.webp", "*.tiff",
    "*.mp3", "*.mp4", "*.mov", "*.wav", "*.avi",
    // Fonts
    "*.woff", "*.woff2", "*.ttf", "*.otf", "*.eot",
    // Archives and compiled output
    "*.zip", "*.tar", "*.gz", "*.tgz", "*.bz2", "*.xz", "*.7z", "*.jar", "*.war",
    "*.class", "*.pyc", "*.pyo", "*.o", "*.a", "*.so", "*.dylib", "*.dll", "*.exe",
    "*.bin", "*.wasm", "*.pdf",
    // Lock files
    "package-lock.json", "yarn.lock", "pnpm-lock.yaml", "bun.lockb", "poetry.lock",
    "Pipfile.lock", "uv.lock", "Cargo.lock", "Gemfile.lock", "composer.lock",
    "npm-shrinkwrap.json",
    // Minified and bundled
    "*.min.js", "*.min.css", "*.min.map", "*.js.map", "*.css.map", "*.bundle.js",
    // Generated names
    "*.generated.*", "*-generated.*",
];

/// Files that are kept but discounted as machine-written
pub const GENERATED_PATTERNS: &[&str] = &[
    "*.pb.go", "*.pb.cc", "*.pb.h", "*_pb2.py", "*_pb2_grpc.py", "*_generated.*",
    "*_gen.go", "*.gen.ts", "*.g.dart", "*.freezed.dart", "*.designer.cs",
];

/// Case-insensitive phrases marking generated content
pub const GENERATED_MARKERS: &[&str] = &[
    "@generated",
    "auto-generated",
    "autogenerated",
    "do not edit",
    "code generated by",
    "this file is generated",
    "generated by",
];

/// Source code
pub const HIGH_PRIORITY_PATTERNS: &[&str] = &[
    "*.rs", "*.py", "*.go", "*.js", "*.jsx", "*.mjs", "*.ts", "*.tsx", "*.java",
    "*.kt", "*.kts", "*.scala", "*.swift", "*.m", "*.c", "*.h", "*.cc", "*.cpp",
    "*.hpp", "*.cs", "*.rb", "*.php", "*.lua", "*.dart", "*.ex", "*.exs", "*.hs",
    "*.clj", "*.vue", "*.svelte", "*.sql", "*.sh", "*.bash", "*.zsh",
];

/// Configuration, documentation, build files
pub const MEDIUM_PRIORITY_PATTERNS: &[&str] = &[
    "Dockerfile", "Makefile", "CMakeLists.txt", "Justfile", "Jenkinsfile",
    "*.json", "*.yaml", "*.yml", "*.toml", "*.ini", "*.cfg", "*.conf", "*.xml",
    "*.gradle", "*.properties", "*.md", "*.rst", "*.txt", "*.html", "*.css",
    "*.scss", "*.proto", "*.graphql",
];

/// Derived manifests and bookkeeping files
pub const LOW_PRIORITY_PATTERNS: &[&str] = &[
    "package.json", "composer.json", "bower.json", "go.sum", "CHANGELOG.md",
    "LICENSE", ".gitignore", ".gitattributes", "*.lock", "*.sum", "*.snap",
];

// =============================================================================
// Glob Set
// =============================================================================

/// A compiled pattern list split into exact names and wildcard globs.
///
/// Each pattern is tested against both the basename and the full path.
#[derive(Debug)]
pub struct GlobSet {
    exact: Vec<&'static str>,
    wildcard: Vec<Pattern>,
}

impl GlobSet {
    pub fn compile(patterns: &[&'static str]) -> Self {
        let (wildcard, exact): (Vec<&'static str>, Vec<&'static str>) =
            patterns.iter().copied().partition(|p| is_wildcard(p));

        Self {
            exact,
            wildcard: wildcard
                .into_iter()
                .filter_map(|p| Pattern::new(p).ok())
                .collect(),
        }
    }

    /// A pattern without wildcard characters equals the basename or path
    pub fn matches_exact(&self, path: &str) -> bool {
        let name = basename(path);
        self.exact.iter().any(|p| *p == name || *p == path)
    }

    /// A wildcard pattern matches the basename or path
    pub fn matches_wildcard(&self, path: &str) -> bool {
        let name = basename(path);
        self.wildcard
            .iter()
            .any(|p| p.matches(name) || p.matches(path))
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matches_exact(path) || self.matches_wildcard(path)
    }
}

fn is_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Final path component
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

pub static EXCLUDED: LazyLock<GlobSet> = LazyLock::new(|| GlobSet::compile(EXCLUDE_PATTERNS));
pub static GENERATED: LazyLock<GlobSet> = LazyLock::new(|| GlobSet::compile(GENERATED_PATTERNS));
pub static HIGH_TIER: LazyLock<GlobSet> =
    LazyLock::new(|| GlobSet::compile(HIGH_PRIORITY_PATTERNS));
pub static MEDIUM_TIER: LazyLock<GlobSet> =
    LazyLock::new(|| GlobSet::compile(MEDIUM_PRIORITY_PATTERNS));
pub static LOW_TIER: LazyLock<GlobSet> = LazyLock::new(|| GlobSet::compile(LOW_PRIORITY_PATTERNS));

// =============================================================================
// Checks
// =============================================================================

/// Path matches the exclusion set
pub fn is_excluded(path: &str) -> bool {
    EXCLUDED.matches(path)
}

/// Path matches the generated-file set
pub fn is_generated_name(path: &str) -> bool {
    GENERATED.matches(path)
}

/// The leading part of `sample` carries a generated-content marker
pub fn has_generated_marker(sample: &str) -> bool {
    let head = truncate_chars(sample, CONTENT_SAMPLE_SCAN_CHARS).to_lowercase();
    GENERATED_MARKERS.iter().any(|marker| head.contains(marker))
}

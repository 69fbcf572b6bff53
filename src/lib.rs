// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # tagrules - rule-based tag inference
//!
//! Compiles a set of tag rules once, then answers questions about sets of
//! tags attached to items.
//!
//! ## Core Concept
//!
//! A rule set describes a tag vocabulary: aliases, an is-a hierarchy,
//! implications, suggestions, exclusions and properties. From a compiled
//! rule set, tagrules can:
//!
//! - **Normalize** tags to their canonical form
//! - **Close** a tag set under the hierarchy (a `cat` is also a `mammal`)
//! - **Detect conflicts** with exclusion rules and rejected tags
//! - **Find gaps**: implications the tags do not yet satisfy
//! - **Suggest** concrete tags that would complete the description
//!
//! ## Quick Start
//!
//! ```rust
//! use tagrules::{TagOperator, TagRule, TagRuleEngine};
//!
//! let engine = TagRuleEngine::new(vec![
//!     TagRule::simple("cat", TagOperator::Specialization, "mammal"),
//!     TagRule::simple("mammal", TagOperator::Implication, "tail"),
//!     TagRule::simple("feline", TagOperator::Definition, "cat"),
//! ])?;
//!
//! let result = engine.analyze(["feline"]);
//! assert!(result.effective_tags.contains("mammal"));
//! assert!(result.suggested_tag_names().contains("tail"));
//! # Ok::<(), tagrules::Error>(())
//! ```
//!
//! ## Operators
//!
//! | Operator | Symbol | Meaning |
//! |----------|--------|---------|
//! | Definition | `=>` | left is an alias of right |
//! | Specialization | `::` | left is a kind of right |
//! | Implication | `->` | left requires one of right |
//! | BidirectionalImplication | `<->` | both directions |
//! | Suggestion | `~>` | left suggests right |
//! | BidirectionalSuggestion | `<~>` | both directions |
//! | Exclusion | `!>` | left forbids right |
//! | MutualExclusion | `<!>` | both directions |
//! | Property | `a [p]` | left carries property `p` |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                                                             │
//! │  RULES (Vec<TagRule>)                                       │
//! │       │                                                     │
//! │       ├──► Canonicalizer ──► rename / alias maps            │
//! │       │                                                     │
//! │       ├──► normalize ──► one-way rules grouped by operator  │
//! │       │                                                     │
//! │       └──► SpecializationIndex ──► ancestors / descendants  │
//! │                                                             │
//! │  TAGS                                                       │
//! │       │                                                     │
//! │       └──► engine.analyze(tags) ──► AnalysisResult          │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The compiled engine is immutable and `Send + Sync`; share it freely.

// Core modules
pub mod config;
pub mod error;
pub mod result;
pub mod rule;
pub mod tag;

// Indices
pub mod canonical;
pub mod hierarchy;

// Engine
pub mod analysis;
pub mod engine;
pub mod info;

// Re-exports
pub use canonical::Canonicalizer;
pub use config::EngineConfig;
pub use engine::TagRuleEngine;
pub use error::{Error, Result};
pub use hierarchy::SpecializationIndex;
pub use info::TagInfo;
pub use result::{AnalysisResult, RuleResult};
pub use rule::{TagOperator, TagRule};
pub use tag::{is_valid_tag, HierarchyRelation};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

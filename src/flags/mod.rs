//! Compiler flag tokenization and override-aware merging
//!
//! Treats a flag string as a sequence of tokens, each owning an override
//! key: every `-O` level shares one key, every `-march=` value another,
//! and so on. Merging by key lets a later flag replace an earlier one of
//! the same kind without disturbing everything around it.

mod shell;
mod table;

pub use shell::{join_flags, split_flags, FlagError};
pub use table::{merge_override, FlagTable, OverrideKey};

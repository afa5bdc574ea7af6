//! Ordered flag table with per-key override semantics
//!
//! Flags are keyed by what they control, not their exact text: `-O2` and
//! `-O3` compete for one slot, `-march=` values for another. Position is
//! decided by first appearance and never changes on update, so a merged
//! flag line stays readable next to the original.

/// What a flag token controls, for override purposes.
///
/// Tokens with no recognized prefix get a `Verbatim` key carrying their
/// own text, so unrelated flags never displace each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideKey {
    /// Optimization level (`-O0`, `-O2`, `-Os`, ...)
    Optimization,
    /// Target architecture (`-march=...`)
    Arch,
    /// Target tuning model (`-mtune=...`)
    Tune,
    /// Debug info level (`-g`, `-g1`, `-gmlt`, ...)
    Debug,
    /// Anything else, keyed by its exact text
    Verbatim(String),
}

impl OverrideKey {
    /// Classify a token by textual prefix.
    pub fn for_token(token: &str) -> Self {
        if token.starts_with("-O") {
            Self::Optimization
        } else if token.starts_with("-march=") {
            Self::Arch
        } else if token.starts_with("-mtune=") {
            Self::Tune
        } else if token.starts_with("-g") {
            Self::Debug
        } else {
            Self::Verbatim(token.to_string())
        }
    }
}

/// Insertion-ordered flag table.
///
/// First insertion of a key fixes its position; later insertions with the
/// same key replace the stored token in place. Small flag lists make a
/// plain vector the right container, and it keeps the ordering rule
/// explicit instead of relying on map iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagTable {
    entries: Vec<(OverrideKey, String)>,
}

impl FlagTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from tokens in sequence order
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for token in tokens {
            table.insert(token);
        }
        table
    }

    /// Insert a token, replacing any existing token with the same key.
    ///
    /// Replacement keeps the original position.
    pub fn insert(&mut self, token: impl Into<String>) {
        let token = token.into();
        let key = OverrideKey::for_token(&token);
        match self.entries.iter().position(|(existing, _)| *existing == key) {
            Some(index) => self.entries[index].1 = token,
            None => self.entries.push((key, token)),
        }
    }

    /// Current token for a key, if present
    pub fn get(&self, key: &OverrideKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, token)| token.as_str())
    }

    /// Whether a key is present
    pub fn contains(&self, key: &OverrideKey) -> bool {
        self.entries.iter().any(|(existing, _)| existing == key)
    }

    /// Emit tokens in insertion order
    pub fn tokens(&self) -> Vec<String> {
        self.entries.iter().map(|(_, token)| token.clone()).collect()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&OverrideKey, &str)> {
        self.entries.iter().map(|(key, token)| (key, token.as_str()))
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Merge two flag tables, the overlay winning per key.
///
/// Keys already in the base keep their base position with the overlay's
/// token; keys only in the overlay are appended in overlay order.
pub fn merge_override(base: FlagTable, overlay: FlagTable) -> FlagTable {
    let mut merged = base;
    for (_, token) in overlay.entries {
        merged.insert(token);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_optimization() {
        assert_eq!(OverrideKey::for_token("-O2"), OverrideKey::Optimization);
        assert_eq!(OverrideKey::for_token("-O3"), OverrideKey::Optimization);
        assert_eq!(OverrideKey::for_token("-Os"), OverrideKey::Optimization);
        assert_eq!(OverrideKey::for_token("-O"), OverrideKey::Optimization);
    }

    #[test]
    fn test_classify_arch_and_tune() {
        assert_eq!(OverrideKey::for_token("-march=native"), OverrideKey::Arch);
        assert_eq!(OverrideKey::for_token("-march=znver3"), OverrideKey::Arch);
        assert_eq!(OverrideKey::for_token("-mtune=generic"), OverrideKey::Tune);
    }

    #[test]
    fn test_classify_debug_spans_variants() {
        assert_eq!(OverrideKey::for_token("-g"), OverrideKey::Debug);
        assert_eq!(OverrideKey::for_token("-g1"), OverrideKey::Debug);
        assert_eq!(OverrideKey::for_token("-gmlt"), OverrideKey::Debug);
        assert_eq!(OverrideKey::for_token("-ggdb3"), OverrideKey::Debug);
    }

    #[test]
    fn test_classify_verbatim() {
        assert_eq!(
            OverrideKey::for_token("-Wall"),
            OverrideKey::Verbatim("-Wall".to_string())
        );
        // -march without '=' is not an arch assignment
        assert_eq!(
            OverrideKey::for_token("-march"),
            OverrideKey::Verbatim("-march".to_string())
        );
        assert_eq!(
            OverrideKey::for_token("-fno-plt"),
            OverrideKey::Verbatim("-fno-plt".to_string())
        );
    }

    #[test]
    fn test_insert_updates_value_keeps_position() {
        let table = FlagTable::from_tokens(["-O2", "-march=x86-64", "-O3"]);

        // -O3 replaced -O2 in the first slot rather than appending
        assert_eq!(table.tokens(), vec!["-O3", "-march=x86-64"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&OverrideKey::Optimization), Some("-O3"));
    }

    #[test]
    fn test_verbatim_tokens_keep_distinct_keys() {
        let table = FlagTable::from_tokens(["-Wall", "-Wextra", "-Wall"]);

        assert_eq!(table.tokens(), vec!["-Wall", "-Wextra"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_debug_tokens_share_one_key() {
        let table = FlagTable::from_tokens(["-g", "-O2", "-g1"]);

        assert_eq!(table.tokens(), vec!["-g1", "-O2"]);
    }

    #[test]
    fn test_merge_override_overlay_wins() {
        let base = FlagTable::from_tokens(["-O2", "-march=x86-64"]);
        let overlay = FlagTable::from_tokens(["-O3"]);

        let merged = merge_override(base, overlay);

        assert_eq!(merged.tokens(), vec!["-O3", "-march=x86-64"]);
    }

    #[test]
    fn test_merge_override_appends_new_keys_in_overlay_order() {
        let base = FlagTable::from_tokens(["-O2"]);
        let overlay = FlagTable::from_tokens(["-mtune=native", "-march=native"]);

        let merged = merge_override(base, overlay);

        assert_eq!(
            merged.tokens(),
            vec!["-O2", "-mtune=native", "-march=native"]
        );
    }

    #[test]
    fn test_merge_override_base_untouched_keys_survive() {
        let base = FlagTable::from_tokens(["-O2", "-g", "-Wall"]);
        let overlay = FlagTable::from_tokens(["-g1"]);

        let merged = merge_override(base, overlay);

        assert_eq!(merged.tokens(), vec!["-O2", "-g1", "-Wall"]);
    }

    #[test]
    fn test_merge_override_with_self_is_identity() {
        // Repeated -O key exercises collapse before the self-merge
        let tokens = ["-O2", "-march=x86-64", "-g1", "-Wall", "-O3"];
        let table = FlagTable::from_tokens(tokens);

        let merged = merge_override(table.clone(), FlagTable::from_tokens(tokens));

        assert_eq!(merged.tokens(), table.tokens());
    }

    #[test]
    fn test_merge_override_empty_overlay_is_identity() {
        let base = FlagTable::from_tokens(["-O2", "-march=znver3"]);
        let merged = merge_override(base.clone(), FlagTable::new());

        assert_eq!(merged, base);
    }

    #[test]
    fn test_merge_override_empty_base_takes_overlay() {
        let overlay = FlagTable::from_tokens(["-O2", "-g"]);
        let merged = merge_override(FlagTable::new(), overlay.clone());

        assert_eq!(merged, overlay);
    }

    #[test]
    fn test_empty_table() {
        let table = FlagTable::new();

        assert!(table.is_empty());
        assert!(table.tokens().is_empty());
        assert!(!table.contains(&OverrideKey::Optimization));
    }

    #[test]
    fn test_iter_yields_keys_and_tokens() {
        let table = FlagTable::from_tokens(["-O2", "-Wall"]);
        let entries: Vec<_> = table.iter().collect();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], (&OverrideKey::Optimization, "-O2"));
        assert_eq!(
            entries[1],
            (&OverrideKey::Verbatim("-Wall".to_string()), "-Wall")
        );
    }
}

//! Local symbol tables: the fixed system region, imported shared-table
//! regions, and locally interned symbols.

use std::collections::HashMap;

use crate::binary::constants::SYSTEM_SYMBOLS;

/// Number of symbols in the system region (SIDs 1..=9).
pub const SYSTEM_MAX_ID: u64 = 9;

/// A shared-table import. Only the declaration is carried — the shared
/// table itself is not available, so the `max_id` SIDs it contributes have
/// unknown text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedImport {
    pub name: String,
    pub version: u32,
    pub max_id: u32,
}

/// A local symbol table.
///
/// SIDs are dense: 1..=9 are the system symbols, followed by one region of
/// `max_id` positions per import, followed by locally declared symbols.
/// SID 0 is reserved for "no symbol" and never maps to text.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    imports: Vec<SharedImport>,
    /// Locally declared symbol texts. `None` occupies a SID without text
    /// (a non-string entry in a `symbols` list still claims its slot).
    local: Vec<Option<String>>,
    /// First SID of the local region.
    local_offset: u64,
    by_text: HashMap<String, u64>,
}

impl SymbolTable {
    /// The table every stream starts with: system symbols only.
    pub fn system() -> Self {
        Self::with_imports(Vec::new())
    }

    /// A table layered over the given shared-table imports.
    pub fn with_imports(imports: Vec<SharedImport>) -> Self {
        let mut by_text = HashMap::new();
        for (i, text) in SYSTEM_SYMBOLS.iter().enumerate().skip(1) {
            by_text.insert((*text).to_owned(), i as u64);
        }
        let imported: u64 = imports.iter().map(|i| i.max_id as u64).sum();
        Self {
            imports,
            local: Vec::new(),
            local_offset: SYSTEM_MAX_ID + imported + 1,
            by_text,
        }
    }

    /// Highest assigned SID.
    pub fn max_id(&self) -> u64 {
        self.local_offset - 1 + self.local.len() as u64
    }

    pub fn imports(&self) -> &[SharedImport] {
        &self.imports
    }

    /// Locally declared texts, in SID order.
    pub fn local_symbols(&self) -> &[Option<String>] {
        &self.local
    }

    pub fn has_local_symbols(&self) -> bool {
        !self.local.is_empty()
    }

    /// Looks up a SID's text. Unknown for SID 0, for out-of-range SIDs,
    /// and for import-region SIDs (their shared tables are absent).
    pub fn find_by_id(&self, sid: u64) -> Option<&str> {
        if sid == 0 || sid > self.max_id() {
            return None;
        }
        if sid <= SYSTEM_MAX_ID {
            return Some(SYSTEM_SYMBOLS[sid as usize]);
        }
        if sid < self.local_offset {
            return None;
        }
        self.local[(sid - self.local_offset) as usize].as_deref()
    }

    /// Looks up a text's SID.
    pub fn find_by_text(&self, text: &str) -> Option<u64> {
        self.by_text.get(text).copied()
    }

    /// Returns the existing SID for `text`, or assigns `max_id() + 1`.
    pub fn intern(&mut self, text: &str) -> u64 {
        if let Some(sid) = self.by_text.get(text) {
            return *sid;
        }
        self.append(Some(text.to_owned()))
    }

    /// Appends a local slot (with or without text) and returns its SID.
    /// Duplicate texts get a fresh SID here; lookups keep resolving to the
    /// first occurrence.
    pub fn append(&mut self, text: Option<String>) -> u64 {
        let sid = self.max_id() + 1;
        if let Some(ref text) = text {
            self.by_text.entry(text.clone()).or_insert(sid);
        }
        self.local.push(text);
        sid
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::system()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_table_layout() {
        let table = SymbolTable::system();
        assert_eq!(table.max_id(), 9);
        assert_eq!(table.find_by_id(1), Some("$ion"));
        assert_eq!(table.find_by_id(3), Some("$ion_symbol_table"));
        assert_eq!(table.find_by_id(9), Some("$ion_shared_symbol_table"));
        assert_eq!(table.find_by_id(0), None);
        assert_eq!(table.find_by_id(10), None);
        assert_eq!(table.find_by_text("name"), Some(4));
    }

    #[test]
    fn intern_is_idempotent() {
        let mut table = SymbolTable::system();
        let foo = table.intern("foo");
        assert_eq!(foo, 10);
        assert_eq!(table.intern("foo"), 10);
        assert_eq!(table.intern("bar"), 11);
        assert_eq!(table.find_by_id(foo), Some("foo"));
        assert_eq!(table.find_by_text("foo"), Some(foo));
        assert_eq!(table.max_id(), 11);
    }

    #[test]
    fn interning_a_system_symbol_reuses_its_sid() {
        let mut table = SymbolTable::system();
        assert_eq!(table.intern("$ion"), 1);
        assert!(!table.has_local_symbols());
    }

    #[test]
    fn imports_reserve_unknown_regions() {
        let imports = vec![SharedImport {
            name: "com.example".to_owned(),
            version: 2,
            max_id: 5,
        }];
        let mut table = SymbolTable::with_imports(imports);
        assert_eq!(table.max_id(), 14);
        // Import-region SIDs exist but have no text.
        assert_eq!(table.find_by_id(10), None);
        assert_eq!(table.find_by_id(14), None);
        // Local symbols start after the import region.
        assert_eq!(table.intern("tail"), 15);
        assert_eq!(table.find_by_id(15), Some("tail"));
    }

    #[test]
    fn textless_slots_claim_sids() {
        let mut table = SymbolTable::system();
        let empty = table.append(None);
        assert_eq!(empty, 10);
        assert_eq!(table.find_by_id(10), None);
        assert_eq!(table.intern("after"), 11);
    }

    #[test]
    fn duplicate_text_resolves_to_first_sid() {
        let mut table = SymbolTable::system();
        table.append(Some("dup".to_owned()));
        table.append(Some("dup".to_owned()));
        assert_eq!(table.max_id(), 11);
        assert_eq!(table.find_by_text("dup"), Some(10));
        assert_eq!(table.find_by_id(11), Some("dup"));
    }
}

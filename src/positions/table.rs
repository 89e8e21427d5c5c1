use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{AvatarGifError, AvatarGifResult};

/// Where and how large the avatar goes on one frame.
///
/// Serialized as a `[x, y, size]` triple. `offset_x`/`offset_y` are the visually intended top-left
/// corner; the compositor applies the paste inset on top of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "RawEntry", into = "RawEntry")]
pub struct PositionEntry {
    /// Horizontal offset in canvas pixels.
    pub offset_x: i32,
    /// Vertical offset in canvas pixels.
    pub offset_y: i32,
    /// Avatar edge length in pixels.
    pub avatar_size: u32,
}

impl PositionEntry {
    /// Build an entry from its `(x, y, size)` triple.
    pub const fn new(offset_x: i32, offset_y: i32, avatar_size: u32) -> Self {
        Self {
            offset_x,
            offset_y,
            avatar_size,
        }
    }
}

#[derive(Clone, Copy, serde::Serialize, serde::Deserialize)]
struct RawEntry(i32, i32, u32);

impl From<RawEntry> for PositionEntry {
    fn from(RawEntry(x, y, size): RawEntry) -> Self {
        Self::new(x, y, size)
    }
}

impl From<PositionEntry> for RawEntry {
    fn from(e: PositionEntry) -> Self {
        RawEntry(e.offset_x, e.offset_y, e.avatar_size)
    }
}

/// Ordered per-frame positions for one source GIF.
///
/// Never empty; frames beyond the table length wrap around (`frame % len`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionTable {
    entries: Vec<PositionEntry>,
}

impl PositionTable {
    /// Create a validated table (non-empty, all sizes > 0).
    pub fn new(entries: Vec<PositionEntry>) -> AvatarGifResult<Self> {
        if entries.is_empty() {
            return Err(AvatarGifError::validation("position table must be non-empty"));
        }
        if let Some(idx) = entries.iter().position(|e| e.avatar_size == 0) {
            return Err(AvatarGifError::validation(format!(
                "position table entry {idx} has avatar size 0"
            )));
        }
        Ok(Self { entries })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; tables are validated non-empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in table order.
    pub fn entries(&self) -> &[PositionEntry] {
        &self.entries
    }

    /// Entry for `frame_index`, wrapping modulo the table length.
    pub fn entry_for_frame(&self, frame_index: usize) -> PositionEntry {
        self.entries[frame_index % self.entries.len()]
    }

    /// Distinct avatar sizes needed to composite frames `0..frame_count`.
    pub fn distinct_sizes(&self, frame_count: usize) -> BTreeSet<u32> {
        (0..frame_count.min(self.entries.len()))
            .map(|i| self.entries[i].avatar_size)
            .collect()
    }
}

/// Read-only lookup of position tables by source name.
///
/// Built once at startup and shared (`Arc`) across all pipeline invocations.
#[derive(Clone, Debug, Default)]
pub struct PositionTables {
    tables: BTreeMap<String, PositionTable>,
}

impl PositionTables {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the table for `source_name`.
    pub fn insert(&mut self, source_name: impl Into<String>, table: PositionTable) {
        self.tables.insert(source_name.into(), table);
    }

    /// Builder-style [`PositionTables::insert`].
    pub fn with(mut self, source_name: impl Into<String>, table: PositionTable) -> Self {
        self.insert(source_name, table);
        self
    }

    /// Parse a JSON document of the form `{ "2.gif": [[x, y, size], ...], ... }`.
    pub fn from_json_str(json: &str) -> AvatarGifResult<Self> {
        let raw: BTreeMap<String, Vec<PositionEntry>> = serde_json::from_str(json)
            .map_err(|e| AvatarGifError::validation(format!("invalid position tables JSON: {e}")))?;

        let mut out = Self::new();
        for (name, entries) in raw {
            let table = PositionTable::new(entries).map_err(|e| {
                AvatarGifError::validation(format!("position table '{name}': {e}"))
            })?;
            out.insert(name, table);
        }
        Ok(out)
    }

    /// Read and parse a JSON position tables file.
    pub fn from_json_file(path: &Path) -> AvatarGifResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read position tables '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Serialize back to the JSON document format.
    pub fn to_json_string(&self) -> AvatarGifResult<String> {
        let raw: BTreeMap<&str, &[PositionEntry]> = self
            .tables
            .iter()
            .map(|(name, table)| (name.as_str(), table.entries()))
            .collect();
        serde_json::to_string_pretty(&raw)
            .map_err(|e| AvatarGifError::internal(format!("serialize position tables: {e}")))
    }

    /// Table for `source_name`, or [`AvatarGifError::SourceNotFound`].
    pub fn lookup(&self, source_name: &str) -> AvatarGifResult<&PositionTable> {
        self.tables
            .get(source_name)
            .ok_or_else(|| AvatarGifError::source_not_found(source_name))
    }

    /// Whether a table exists for `source_name`.
    pub fn contains(&self, source_name: &str) -> bool {
        self.tables.contains_key(source_name)
    }

    /// Known source names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Number of known sources.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no sources are known.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/positions/table.rs"]
mod tests;

//! Table groups
//!
//! Families of identically shaped tables (for example any number of
//! `Other Fixed Operating Cost - <variant>` tables) are aggregated together.
//! Each table is tagged with its group when it enters the store, so the
//! aggregation never has to guess from names at calculation time.

use std::fmt;

/// Category of a table whose rows are summed with its siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TableGroup {
    /// Direct capital cost tables
    DirectCapitalCost,
    /// Indirect capital cost tables
    IndirectCapitalCost,
    /// Non-depreciable capital costs other than land
    OtherNonDepreciableCapitalCost,
    /// Yearly fixed operating costs other than labor
    OtherFixedOperatingCost,
    /// Yearly variable operating costs other than utilities
    OtherVariableOperatingCost,
    /// Yearly unplanned replacement costs
    UnplannedReplacement,
}

impl TableGroup {
    /// All groups, longest marker first
    pub const ALL: [TableGroup; 6] = [
        TableGroup::OtherNonDepreciableCapitalCost,
        TableGroup::OtherVariableOperatingCost,
        TableGroup::OtherFixedOperatingCost,
        TableGroup::IndirectCapitalCost,
        TableGroup::UnplannedReplacement,
        TableGroup::DirectCapitalCost,
    ];

    /// Name fragment that identifies tables of this group in input files
    pub fn marker(self) -> &'static str {
        match self {
            TableGroup::DirectCapitalCost => "Direct Capital Cost",
            TableGroup::IndirectCapitalCost => "Indirect Capital Cost",
            TableGroup::OtherNonDepreciableCapitalCost => "Other Non-Depreciable Capital Cost",
            TableGroup::OtherFixedOperatingCost => "Other Fixed Operating Cost",
            TableGroup::OtherVariableOperatingCost => "Other Variable Operating Cost",
            TableGroup::UnplannedReplacement => "Unplanned Replacement",
        }
    }

    /// Classify a table by name.
    ///
    /// Tables whose name is exactly a group total (`Direct Capital Costs`) are
    /// not members; only the `<marker>` family tables are.
    pub fn classify(table_name: &str) -> Option<TableGroup> {
        TableGroup::ALL
            .into_iter()
            .find(|group| table_name.contains(group.marker()))
            .filter(|group| !is_group_total(table_name, *group))
    }
}

/// `Direct Capital Costs` holds the group total written by the capital cost plugin
fn is_group_total(table_name: &str, group: TableGroup) -> bool {
    table_name.trim() == format!("{}s", group.marker())
}

impl fmt::Display for TableGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

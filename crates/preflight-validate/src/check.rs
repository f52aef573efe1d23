//! Check catalog.

use std::fmt;

use serde::Serialize;

/// Every check the library performs.
///
/// The name is the default error-code location for the check; the local code
/// is added to the location's base code to form the report code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Check {
    ContainsRequiredCols,
    NoDuplicateCols,
    NoDuplicateIndices,
    ColPopulated,
    ColumnsContainListVals,
    IndexContainsListVals,
    ColNonBlank,
    ColNumeric,
    ColValsInNumericRange,
    ColContainsListVals,
    ColContainsNodupsListVals,
    NoDuplicateColVals,
    ColValsMatchRegex,
    TableLocMatchesRegex,
}

impl Check {
    pub const ALL: [Check; 14] = [
        Check::ContainsRequiredCols,
        Check::NoDuplicateCols,
        Check::NoDuplicateIndices,
        Check::ColPopulated,
        Check::ColumnsContainListVals,
        Check::IndexContainsListVals,
        Check::ColNonBlank,
        Check::ColNumeric,
        Check::ColValsInNumericRange,
        Check::ColContainsListVals,
        Check::ColContainsNodupsListVals,
        Check::NoDuplicateColVals,
        Check::ColValsMatchRegex,
        Check::TableLocMatchesRegex,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Check::ContainsRequiredCols => "ContainsRequiredCols",
            Check::NoDuplicateCols => "NoDuplicateCols",
            Check::NoDuplicateIndices => "NoDuplicateIndices",
            Check::ColPopulated => "ColPopulated",
            Check::ColumnsContainListVals => "ColumnsContainListVals",
            Check::IndexContainsListVals => "IndexContainsListVals",
            Check::ColNonBlank => "ColNonBlank",
            Check::ColNumeric => "ColNumeric",
            Check::ColValsInNumericRange => "ColValsInNumericRange",
            Check::ColContainsListVals => "ColContainsListVals",
            Check::ColContainsNodupsListVals => "ColContainsNodupsListVals",
            Check::NoDuplicateColVals => "NoDuplicateColVals",
            Check::ColValsMatchRegex => "ColValsMatchRegex",
            Check::TableLocMatchesRegex => "TableLocMatchesRegex",
        }
    }

    pub fn local_code(self) -> i64 {
        match self {
            Check::ContainsRequiredCols => 1,
            Check::NoDuplicateCols => 2,
            Check::NoDuplicateIndices => 3,
            Check::ColPopulated => 4,
            Check::ColumnsContainListVals => 5,
            Check::IndexContainsListVals => 6,
            Check::ColNonBlank => 7,
            Check::ColNumeric => 8,
            Check::ColValsInNumericRange => 9,
            Check::ColContainsListVals => 10,
            Check::ColContainsNodupsListVals => 11,
            Check::NoDuplicateColVals => 12,
            Check::ColValsMatchRegex => 30,
            Check::TableLocMatchesRegex => 31,
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

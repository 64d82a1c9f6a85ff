//! Report categories of disclosure packages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a disclosure package, found in the summary file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportCategory {
    /// Earnings summary, Japanese GAAP.
    Edjp,
    /// Earnings summary, US GAAP.
    Edus,
    /// Earnings summary, IFRS.
    Edif,
    /// Earnings summary, IFRS (designated).
    Edit,
    /// Notice of dividend forecast revision.
    Rvdf,
    /// Notice of earnings forecast revision.
    Rvfc,
    /// REIT earnings summary.
    Rejp,
    /// REIT distribution forecast revision.
    Rrdf,
    /// REIT operating forecast revision.
    Rrfc,
    /// ETF earnings summary.
    Efjp,
}

/// How many summary files a category requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryClass {
    /// Summary plus at least one supporting statement.
    FinancialStatement,
    /// Exactly one file.
    Revision,
}

impl ReportCategory {
    /// Every category, in the order names are matched.
    pub const ALL: [ReportCategory; 10] = [
        Self::Edjp,
        Self::Edus,
        Self::Edif,
        Self::Edit,
        Self::Rvdf,
        Self::Rvfc,
        Self::Rejp,
        Self::Rrdf,
        Self::Rrfc,
        Self::Efjp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Edjp => "edjp",
            Self::Edus => "edus",
            Self::Edif => "edif",
            Self::Edit => "edit",
            Self::Rvdf => "rvdf",
            Self::Rvfc => "rvfc",
            Self::Rejp => "rejp",
            Self::Rrdf => "rrdf",
            Self::Rrfc => "rrfc",
            Self::Efjp => "efjp",
        }
    }

    pub fn class(&self) -> CategoryClass {
        match self {
            Self::Edjp | Self::Edus | Self::Edif | Self::Edit | Self::Rejp | Self::Efjp => {
                CategoryClass::FinancialStatement
            }
            Self::Rvdf | Self::Rvfc | Self::Rrdf | Self::Rrfc => CategoryClass::Revision,
        }
    }

    /// First category whose marker occurs in `path`.
    pub fn detect(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| path.contains(c.as_str()))
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

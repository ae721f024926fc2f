//! SQL Server release table and version-code resolution.
//!
//! Every lookup goes through [`classify`], so the name and the major version
//! of a code always come from the same classification:
//!
//! | Code                           | Name                         | Major        |
//! |--------------------------------|------------------------------|--------------|
//! | in the table                   | table entry                  | table entry  |
//! | below the oldest known release | `Version before <oldest>`    | oldest − 1   |
//! | above the newest known release | `Version after <newest>`     | newest + 1   |
//! | between two known releases     | `Unrecognized version`       | `0`          |
//!
//! Codes follow <https://sqlserverbuilds.blogspot.com/>.

use std::fmt;

/// Internal version code stored in a backup's signature block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct VersionCode(u16);

impl VersionCode {
    /// Wraps a raw code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the raw code
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl From<u16> for VersionCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl fmt::Display for VersionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A known SQL Server release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Release {
    /// Internal version code written by this release
    pub code: u16,
    /// Major version number
    pub major: u16,
    /// Product name, without the "SQL Server" prefix
    pub name: &'static str,
}

const fn release(code: u16, major: u16, name: &'static str) -> Release {
    Release { code, major, name }
}

/// Known releases, ordered by code
const RELEASES: &[Release] = &[
    release(408, 6, "6.5"),
    release(515, 7, "7.0"),
    release(539, 8, "2000"),
    release(611, 9, "2005"),
    release(612, 9, "2005 SP2+"),
    release(655, 10, "2008"),
    release(660, 10, "2008 R2"),
    release(661, 10, "2008 R2"),
    release(684, 11, "2012 CTP1"),
    release(706, 11, "2012"),
    release(782, 12, "2014"),
    release(852, 13, "2016"),
    release(869, 14, "2017"),
];

const OLDEST: &Release = &RELEASES[0];
const NEWEST: &Release = &RELEASES[RELEASES.len() - 1];

/// Major version reported for codes that fall between known releases
pub const UNKNOWN_MAJOR: u16 = 0;

/// Name reported for codes that fall between known releases
pub const UNRECOGNIZED_NAME: &str = "Unrecognized version";

/// Returns the known releases, ordered by code
pub fn releases() -> &'static [Release] {
    RELEASES
}

/// Where a code falls relative to the release table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Exact table entry
    Known(&'static Release),
    /// Older than every known release
    BeforeKnown,
    /// Newer than every known release
    AfterKnown,
    /// Inside the table's range but not listed
    Unrecognized,
}

/// Classify a code against the release table
pub fn classify(code: u16) -> Classification {
    match RELEASES.binary_search_by_key(&code, |r| r.code) {
        Ok(index) => Classification::Known(&RELEASES[index]),
        Err(0) => Classification::BeforeKnown,
        Err(index) if index == RELEASES.len() => Classification::AfterKnown,
        Err(_) => Classification::Unrecognized,
    }
}

/// Returns the user-readable product name for a code
pub fn resolve_name(code: u16) -> String {
    match classify(code) {
        Classification::Known(release) => release.name.to_string(),
        Classification::BeforeKnown => format!("Version before {}", OLDEST.name),
        Classification::AfterKnown => format!("Version after {}", NEWEST.name),
        Classification::Unrecognized => UNRECOGNIZED_NAME.to_string(),
    }
}

/// Returns the major version for a code
///
/// Gap codes yield [`UNKNOWN_MAJOR`] rather than a neighbouring release.
pub fn resolve_major(code: u16) -> u16 {
    match classify(code) {
        Classification::Known(release) => release.major,
        Classification::BeforeKnown => OLDEST.major - 1,
        Classification::AfterKnown => NEWEST.major + 1,
        Classification::Unrecognized => UNKNOWN_MAJOR,
    }
}

/// Product name and major version resolved from a [`VersionCode`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VersionInfo {
    /// Product name, e.g. `2008 R2`
    pub product_name: String,
    /// Major version, e.g. `10`
    pub major_version: u16,
}

impl From<VersionCode> for VersionInfo {
    fn from(code: VersionCode) -> Self {
        Self {
            product_name: resolve_name(code.get()),
            major_version: resolve_major(code.get()),
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SQL Server {} ({}.0)", self.product_name, self.major_version)
    }
}

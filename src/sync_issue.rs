// SPDX-License-Identifier: MPL-2.0

//! Structured diagnostics handed back to the build configuration layer.

use std::fmt::{self, Display};

/// The kind of problem a [SyncIssue] reports.
///
/// [IssueType::code] returns the integer constants of the build model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IssueType {
    Generic,
    /// A dependency could not be resolved at all.
    UnresolvedDependency,
    /// A local file dependency that is not a jar.
    NonJarLocalDependency,
    /// An Android library only present in the package classpath.
    NonJarPackageDependency,
    /// An Android library only present in the compile classpath.
    NonJarProvidedDependency,
    /// Two classpaths resolved different versions of the same artifact.
    MismatchedDependencyVersion,
    /// The legacy Android API artifact, ignored.
    DependencyExcludedLegacyApi,
    /// An artifact clashing with classes provided by the platform, ignored.
    DependencyInternalConflict,
}

impl IssueType {
    pub fn code(self) -> i32 {
        match self {
            Self::Generic => 0,
            Self::UnresolvedDependency => 2,
            Self::NonJarLocalDependency => 5,
            Self::NonJarPackageDependency => 6,
            Self::NonJarProvidedDependency => 7,
            Self::MismatchedDependencyVersion => 9,
            Self::DependencyExcludedLegacyApi => 14,
            Self::DependencyInternalConflict => 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// The build proceeds.
    Warning,
    /// The build should eventually fail.
    Error,
}

impl Severity {
    pub fn code(self) -> i32 {
        match self {
            Self::Warning => 1,
            Self::Error => 2,
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("WARNING"),
            Self::Error => f.write_str("ERROR"),
        }
    }
}

/// A reported dependency problem.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncIssue {
    /// The coordinate or module the issue is about.
    pub data: String,
    pub issue_type: IssueType,
    pub severity: Severity,
    /// Human readable message, already naming the project and variant.
    pub message: String,
}

impl SyncIssue {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Display for SyncIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

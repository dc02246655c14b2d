// SPDX-License-Identifier: MPL-2.0

//! Configuration of a [DependencyChecker](crate::DependencyChecker).

use crate::{Coordinates, Map};

/// API level recorded for a version of the legacy API artifact that is not in the table.
pub const UNKNOWN_API_LEVEL: i32 = -1;

/// Versions of `com.google.android:android` and the platform API level they correspond to.
pub const LEGACY_API_LEVELS: &[(&str, i32)] = &[
    ("1.5_r3", 3),
    ("1.5_r4", 3),
    ("1.6_r2", 4),
    ("2.1_r1", 7),
    ("2.1.2", 7),
    ("2.2.1", 8),
    ("2.3.1", 9),
    ("2.3.3", 10),
    ("4.0.1.2", 14),
    ("4.1.1.4", 15),
];

/// Artifacts whose classes are already provided by the platform.
pub const INTERNAL_CONFLICT_ARTIFACTS: &[(&str, &str)] = &[
    ("org.apache.httpcomponents", "httpclient"),
    ("xpp3", "xpp3"),
    ("org.json", "json"),
    ("commons-logging", "commons-logging"),
    ("xerces", "xmlParserAPIs"),
    ("org.khronos", "opengl-api"),
];

/// The kind of variant whose dependencies are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VariantType {
    Application,
    Library,
    Atom,
    /// Instrumentation tests, packaged into their own test application.
    AndroidTest,
    /// Local unit tests, run on the host.
    UnitTest,
}

impl VariantType {
    pub fn is_unit_test(self) -> bool {
        self == Self::UnitTest
    }
}

/// The variant a checker reports for.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariantContext {
    pub project_name: String,
    pub variant_name: String,
    pub variant_type: VariantType,
    /// The type of the tested variant, for test variants.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tested_variant_type: Option<VariantType>,
}

impl VariantContext {
    pub fn new(
        project_name: impl Into<String>,
        variant_name: impl Into<String>,
        variant_type: VariantType,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            variant_name: variant_name.into(),
            variant_type,
            tested_variant_type: None,
        }
    }

    /// Same context, for a test variant of a `tested` variant.
    pub fn testing(mut self, tested: VariantType) -> Self {
        self.tested_variant_type = Some(tested);
        self
    }

    /// Whether an Android library may be present at compile time only.
    ///
    /// Only libraries, atoms and tests of libraries have somewhere to put
    /// the resources of such a library.
    pub fn allows_provided_android_libraries(&self) -> bool {
        matches!(self.variant_type, VariantType::Library | VariantType::Atom)
            || self.tested_variant_type == Some(VariantType::Library)
    }
}

/// Artifacts the checker removes from the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExclusionRules {
    /// Group of the legacy API artifact.
    pub legacy_api_group: String,
    /// Artifact id of the legacy API artifact.
    pub legacy_api_artifact: String,
    /// Version of the legacy API artifact to API level.
    pub legacy_api_levels: Map<String, i32>,
    /// `(group, artifact)` pairs conflicting with platform classes.
    pub internal_conflicts: Vec<(String, String)>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self {
            legacy_api_group: "com.google.android".to_string(),
            legacy_api_artifact: "android".to_string(),
            legacy_api_levels: LEGACY_API_LEVELS
                .iter()
                .map(|&(version, level)| (version.to_string(), level))
                .collect(),
            internal_conflicts: INTERNAL_CONFLICT_ARTIFACTS
                .iter()
                .map(|&(group, artifact)| (group.to_string(), artifact.to_string()))
                .collect(),
        }
    }
}

impl ExclusionRules {
    pub fn is_legacy_api(&self, module: &Coordinates) -> bool {
        module.group == self.legacy_api_group && module.artifact == self.legacy_api_artifact
    }

    /// The API level of a version of the legacy API artifact, looked up by exact version string.
    pub fn legacy_api_level(&self, version: &str) -> i32 {
        self.legacy_api_levels
            .get(version)
            .copied()
            .unwrap_or(UNKNOWN_API_LEVEL)
    }

    pub fn is_internal_conflict(&self, module: &Coordinates) -> bool {
        self.internal_conflicts
            .iter()
            .any(|(group, artifact)| *group == module.group && *artifact == module.artifact)
    }
}

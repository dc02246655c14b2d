// SPDX-License-Identifier: MPL-2.0

//! Cross-checks of the compile and package classpaths of a variant, and of a
//! test variant against the variant it tests.
//!
//! Conflicts are never returned as errors. They are recorded as [SyncIssue]s
//! and checking continues, so a single pass reports as many problems as
//! possible. The only errors are the structural ones of [GraphError].

use std::sync::Arc;

use log::{error, info, warn};

use crate::{
    Coordinates, Dependency, DependencyContainer, ExclusionRules, FnvIndexMap, GraphError,
    IssueType, Map, MutableDependencyDataMap, Severity, SyncIssue, VariantContext,
};

/// Dependencies of one classpath keyed by version-less id.
pub type VersionMap = FnvIndexMap<String, Arc<Dependency>>;

/// Resolved versions of the tested variant keyed by version-less id.
pub type TestedVersionMap = Map<String, String>;

/// Explanation of why test and tested application must agree on versions.
pub const APP_TEST_CONFLICT_URL: &str = "http://g.co/androidstudio/app-test-app-conflict";

/// Builds a [VersionMap]. The first dependency of a key wins, which is the
/// highest priority one for a flattened list.
///
/// [DependencyChecker::validate] reports the versions this leaves out.
pub fn version_map(dependencies: &[Arc<Dependency>]) -> VersionMap {
    let mut map = VersionMap::default();
    for dependency in dependencies {
        map.entry(dependency.versionless_id())
            .or_insert_with(|| Arc::clone(dependency));
    }
    map
}

/// Builds the [TestedVersionMap] of the packaged dependencies of a tested variant.
pub fn tested_version_map(tested: &DependencyContainer) -> TestedVersionMap {
    let mut map = TestedVersionMap::default();
    for dependency in tested.all_packaged_dependencies() {
        map.entry(dependency.versionless_id())
            .or_insert_with(|| dependency.version().to_string());
    }
    map
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Android,
    Java,
}

/// Validates the dependencies of one variant and accumulates the issues found.
#[derive(Debug, Clone)]
pub struct DependencyChecker {
    context: VariantContext,
    rules: ExclusionRules,
    sync_issues: Vec<SyncIssue>,
    legacy_api_levels: Map<Coordinates, i32>,
}

impl DependencyChecker {
    /// A checker with the default [ExclusionRules].
    pub fn new(context: VariantContext) -> Self {
        Self::with_rules(context, ExclusionRules::default())
    }

    pub fn with_rules(context: VariantContext, rules: ExclusionRules) -> Self {
        Self {
            context,
            rules,
            sync_issues: Vec::new(),
            legacy_api_levels: Map::default(),
        }
    }

    pub fn context(&self) -> &VariantContext {
        &self.context
    }

    /// Issues recorded so far, in the order they were found.
    pub fn sync_issues(&self) -> &[SyncIssue] {
        &self.sync_issues
    }

    /// Hands over the recorded issues, leaving the checker without any.
    pub fn take_sync_issues(&mut self) -> Vec<SyncIssue> {
        std::mem::take(&mut self.sync_issues)
    }

    pub fn has_errors(&self) -> bool {
        self.sync_issues.iter().any(SyncIssue::is_error)
    }

    /// The API level inferred for each excluded legacy API module.
    pub fn legacy_api_levels(&self) -> &Map<Coordinates, i32> {
        &self.legacy_api_levels
    }

    /// Records an issue.
    pub fn handle_issue(
        &mut self,
        data: impl Into<String>,
        issue_type: IssueType,
        severity: Severity,
        message: impl Into<String>,
    ) {
        let issue = SyncIssue {
            data: data.into(),
            issue_type,
            severity,
            message: message.into(),
        };
        match severity {
            Severity::Warning => warn!("{}", issue.message),
            Severity::Error => error!("{}", issue.message),
        }
        self.sync_issues.push(issue);
    }

    /// Whether a module must be left out of the dependency graph.
    ///
    /// The legacy API artifact is always excluded, and its API level recorded.
    /// Artifacts conflicting with platform classes are excluded except for unit tests,
    /// which run against a mockable platform jar rather than the device.
    pub fn check_for_exclusion(&mut self, module: &Coordinates) -> bool {
        if self.rules.is_legacy_api(module) {
            let level = self.rules.legacy_api_level(&module.version);
            self.legacy_api_levels.insert(module.clone(), level);
            let message = format!(
                "{}: ignoring Android API artifact {module}",
                self.location()
            );
            self.handle_issue(
                module.to_string(),
                IssueType::DependencyExcludedLegacyApi,
                Severity::Warning,
                message,
            );
            return true;
        }

        if self.context.variant_type.is_unit_test() {
            return false;
        }

        if self.rules.is_internal_conflict(module) {
            let message = format!(
                "{}: dependency {module} is ignored as it may be conflicting with the \
                 internal version provided by Android. In case of problem, please repackage \
                 it with jarjar to change the class packages",
                self.location()
            );
            self.handle_issue(
                module.to_string(),
                IssueType::DependencyInternalConflict,
                Severity::Warning,
                message,
            );
            return true;
        }

        false
    }

    /// Checks the Android libraries of the compile classpath against the package classpath.
    ///
    /// Matched entries are removed from `package`. Afterwards, `package` only holds
    /// package-only libraries, which are all reported.
    pub fn compare_android_dependencies(
        &mut self,
        compile: &VersionMap,
        package: &mut VersionMap,
        data_map: &MutableDependencyDataMap,
        tested: &TestedVersionMap,
    ) -> Result<(), GraphError> {
        self.compare_dependencies(Flavor::Android, compile, package, data_map, tested)
    }

    /// Checks the jars of the compile classpath against the package classpath.
    ///
    /// Compile-only jars are marked provided. Package-only jars are valid.
    pub fn compare_java_dependencies(
        &mut self,
        compile: &VersionMap,
        package: &mut VersionMap,
        data_map: &MutableDependencyDataMap,
        tested: &TestedVersionMap,
    ) -> Result<(), GraphError> {
        self.compare_dependencies(Flavor::Java, compile, package, data_map, tested)
    }

    /// Skips a dependency the tested variant already packages.
    ///
    /// The dependency is skipped whenever the tested variant has the same version-less
    /// id, and an error is recorded if the resolved versions differ.
    pub fn skip_test_dependency(
        &mut self,
        data_map: &MutableDependencyDataMap,
        dependency: &Dependency,
        tested: &TestedVersionMap,
    ) -> Result<(), GraphError> {
        if tested.is_empty() {
            return Ok(());
        }
        let key = dependency.versionless_id();
        let Some(tested_version) = tested.get(&key) else {
            return Ok(());
        };

        data_map.skip(dependency)?;

        if tested_version != dependency.version() {
            let message = format!(
                "Conflict with dependency '{key}' in project '{}', variant '{}'. \
                 Resolved versions for app ({tested_version}) and test app ({}) differ. \
                 See {APP_TEST_CONFLICT_URL} for details.",
                self.context.project_name,
                self.context.variant_name,
                dependency.version()
            );
            self.handle_issue(
                key,
                IssueType::MismatchedDependencyVersion,
                Severity::Error,
                message,
            );
        }
        Ok(())
    }

    /// Runs both comparisons on the compile and package containers of the variant.
    ///
    /// `tested` holds the packaged dependencies of the tested variant for test variants.
    /// Flags are written to the data map of `compile`.
    pub fn validate(
        &mut self,
        compile: &DependencyContainer,
        package: &DependencyContainer,
        tested: Option<&DependencyContainer>,
    ) -> Result<(), GraphError> {
        let tested = tested.map(tested_version_map).unwrap_or_default();
        let data_map = compile.data_map();
        let issues_before = self.sync_issues.len();

        let compile_android = self.classpath_versions(
            "compilation",
            compile.all_android_dependencies(),
            data_map,
            None,
        )?;
        let mut package_android = self.classpath_versions(
            "packaging",
            package.all_android_dependencies(),
            data_map,
            Some(&tested),
        )?;
        self.compare_android_dependencies(
            &compile_android,
            &mut package_android,
            data_map,
            &tested,
        )?;

        let compile_java = self.classpath_versions(
            "compilation",
            compile.all_java_dependencies(),
            data_map,
            None,
        )?;
        let mut package_java = self.classpath_versions(
            "packaging",
            package.all_java_dependencies(),
            data_map,
            Some(&tested),
        )?;
        self.compare_java_dependencies(&compile_java, &mut package_java, data_map, &tested)?;

        info!(
            "validated {} of project {}: {} new issue(s)",
            self.context.variant_name,
            self.context.project_name,
            self.sync_issues.len() - issues_before
        );
        Ok(())
    }

    /// Builds the [VersionMap] of one classpath and reports every version-less id
    /// resolved to more than one version.
    ///
    /// With `tested`, the versions left out of the map still go through
    /// [skip_test_dependency](Self::skip_test_dependency).
    fn classpath_versions(
        &mut self,
        classpath: &str,
        dependencies: &[Arc<Dependency>],
        data_map: &MutableDependencyDataMap,
        tested: Option<&TestedVersionMap>,
    ) -> Result<VersionMap, GraphError> {
        let mut map = VersionMap::default();
        for dependency in dependencies {
            let key = dependency.versionless_id();
            let Some(first) = map.get(&key) else {
                map.insert(key, Arc::clone(dependency));
                continue;
            };
            let message = format!(
                "{}: conflict with dependency '{key}'. Several versions resolved for \
                 {classpath}: {} and {}.",
                self.location(),
                first.version(),
                dependency.version()
            );
            self.handle_issue(
                key,
                IssueType::MismatchedDependencyVersion,
                Severity::Error,
                message,
            );
            if let Some(tested) = tested {
                self.skip_test_dependency(data_map, dependency, tested)?;
            }
        }
        Ok(map)
    }

    fn compare_dependencies(
        &mut self,
        flavor: Flavor,
        compile: &VersionMap,
        package: &mut VersionMap,
        data_map: &MutableDependencyDataMap,
        tested: &TestedVersionMap,
    ) -> Result<(), GraphError> {
        for (key, compile_dependency) in compile {
            match package.shift_remove(key.as_str()) {
                Some(package_dependency) => {
                    self.skip_test_dependency(data_map, &package_dependency, tested)?;
                    if compile_dependency.version() != package_dependency.version() {
                        let message = format!(
                            "{}: conflict with dependency '{key}'. Resolved versions for \
                             compilation ({}) and packaging ({}) differ.",
                            self.location(),
                            compile_dependency.version(),
                            package_dependency.version()
                        );
                        self.handle_issue(
                            key.clone(),
                            IssueType::MismatchedDependencyVersion,
                            Severity::Error,
                            message,
                        );
                    }
                }
                None if flavor == Flavor::Java
                    || self.context.allows_provided_android_libraries() =>
                {
                    data_map.set_provided(compile_dependency)?;
                }
                None => {
                    let message = format!(
                        "{}: provided dependencies can only be jars. {} is an Android Library.",
                        self.location(),
                        compile_dependency
                    );
                    self.handle_issue(
                        key.clone(),
                        IssueType::NonJarProvidedDependency,
                        Severity::Error,
                        message,
                    );
                }
            }
        }

        for (key, package_dependency) in package.iter() {
            match flavor {
                Flavor::Java => self.skip_test_dependency(data_map, package_dependency, tested)?,
                Flavor::Android => {
                    let message = format!(
                        "{}: apk-only dependencies can only be jars. {} is an Android Library.",
                        self.location(),
                        package_dependency
                    );
                    self.handle_issue(
                        key.clone(),
                        IssueType::NonJarPackageDependency,
                        Severity::Error,
                        message,
                    );
                }
            }
        }
        Ok(())
    }

    fn location(&self) -> String {
        format!(
            "Project {}, variant {}",
            self.context.project_name, self.context.variant_name
        )
    }
}

// SPDX-License-Identifier: MPL-2.0

//! Immutable dependency values shared across graphs.

use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Trait for the identifier the external resolver uses to refer to a dependency.
/// Automatically implemented for types already implementing
/// [Clone] + [Eq] + [Hash] + [Debug] + [Display].
pub trait Address: Clone + Eq + Hash + Debug + Display {}

/// Automatically implement the Address trait for any type
/// that already implement [Clone] + [Eq] + [Hash] + [Debug] + [Display].
impl<T: Clone + Eq + Hash + Debug + Display> Address for T {}

/// Group used for the synthetic coordinates of local jar files.
pub const LOCAL_JAR_GROUP: &str = "__local_jars__";

/// Version used for the synthetic coordinates of local jar files.
pub const LOCAL_JAR_VERSION: &str = "unspecified";

/// Maven-style coordinates of a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinates {
    /// Group id, e.g. `com.google.guava`.
    pub group: String,
    /// Artifact id, e.g. `guava`.
    pub artifact: String,
    /// Resolved version.
    pub version: String,
    /// Optional classifier, part of the version-less key.
    #[cfg_attr(feature = "serde", serde(default))]
    pub classifier: Option<String>,
}

impl Coordinates {
    /// Coordinates without a classifier.
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
            classifier: None,
        }
    }

    /// Same coordinates with a classifier.
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// Synthetic coordinates for a jar file that does not come from a repository.
    ///
    /// The artifact is the path with backslashes doubled and every byte that is
    /// not UTF-8 written as `\xNN`, so distinct paths get distinct coordinates.
    pub fn for_local_jar(path: &Path) -> Self {
        Self::new(LOCAL_JAR_GROUP, escape_path(path), LOCAL_JAR_VERSION)
    }

    /// The conflict-matching key: `group:artifact` plus `:classifier` if any.
    ///
    /// Only one version of a given key may be active per classpath.
    pub fn versionless_id(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!("{}:{}:{}", self.group, self.artifact, classifier),
            None => format!("{}:{}", self.group, self.artifact),
        }
    }
}

impl Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

fn escape_path(path: &Path) -> String {
    let mut escaped = String::new();
    for chunk in path.as_os_str().as_encoded_bytes().utf8_chunks() {
        for c in chunk.valid().chars() {
            if c == '\\' {
                escaped.push_str("\\\\");
            } else {
                escaped.push(c);
            }
        }
        for byte in chunk.invalid() {
            escaped.push_str(&format!("\\x{byte:02x}"));
        }
    }
    escaped
}

/// The closed set of dependency subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DependencyKind {
    /// An Android library (AAR), carrying resources as well as code.
    AndroidLibrary,
    /// A plain jar.
    JavaLibrary {
        /// Whether the jar is a local file of the project rather than a repository artifact.
        local: bool,
    },
    /// A module component of the legacy atom packaging model.
    Atom,
}

/// A unique library, module or jar dependency.
///
/// Equality and hashing only look at the [Coordinates], so the same logical
/// dependency resolved into the compile and the package classpath compares equal
/// even when the backing file differs.
#[derive(Debug, Clone)]
pub struct Dependency {
    coordinates: Coordinates,
    kind: DependencyKind,
    file: PathBuf,
}

impl Dependency {
    /// Creates a dependency.
    pub fn new(coordinates: Coordinates, kind: DependencyKind, file: impl Into<PathBuf>) -> Self {
        Self {
            coordinates,
            kind,
            file: file.into(),
        }
    }

    /// An Android library backed by its extracted folder.
    pub fn android_library(coordinates: Coordinates, folder: impl Into<PathBuf>) -> Self {
        Self::new(coordinates, DependencyKind::AndroidLibrary, folder)
    }

    /// A repository jar.
    pub fn java_library(coordinates: Coordinates, jar: impl Into<PathBuf>) -> Self {
        Self::new(coordinates, DependencyKind::JavaLibrary { local: false }, jar)
    }

    /// A local jar file, with synthetic coordinates derived from its path.
    pub fn local_jar(jar: impl Into<PathBuf>) -> Self {
        let jar = jar.into();
        Self::new(
            Coordinates::for_local_jar(&jar),
            DependencyKind::JavaLibrary { local: true },
            jar,
        )
    }

    /// An atom backed by its extracted folder.
    pub fn atom(coordinates: Coordinates, folder: impl Into<PathBuf>) -> Self {
        Self::new(coordinates, DependencyKind::Atom, folder)
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    pub fn kind(&self) -> DependencyKind {
        self.kind
    }

    /// The resolved backing file or directory.
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn version(&self) -> &str {
        &self.coordinates.version
    }

    /// See [Coordinates::versionless_id].
    pub fn versionless_id(&self) -> String {
        self.coordinates.versionless_id()
    }

    pub fn is_android_library(&self) -> bool {
        matches!(self.kind, DependencyKind::AndroidLibrary)
    }

    pub fn is_java_library(&self) -> bool {
        matches!(self.kind, DependencyKind::JavaLibrary { .. })
    }

    pub fn is_local_jar(&self) -> bool {
        matches!(self.kind, DependencyKind::JavaLibrary { local: true })
    }

    pub fn is_atom(&self) -> bool {
        matches!(self.kind, DependencyKind::Atom)
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.coordinates == other.coordinates
    }
}

impl Eq for Dependency {}

impl Hash for Dependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coordinates.hash(state);
    }
}

impl Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.coordinates, f)
    }
}

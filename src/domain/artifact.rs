use std::fmt;
use std::path::PathBuf;

/// How the release artifact was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Renamed platform archive from an archive-build
    PlatformArchive,
    /// Zip package assembled from the standard build output
    StandardPackage,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::PlatformArchive => write!(f, "platform archive"),
            ArtifactKind::StandardPackage => write!(f, "standard package"),
        }
    }
}

/// The single file produced by one release run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseArtifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

impl ReleaseArtifact {
    pub fn new(path: impl Into<PathBuf>, kind: ArtifactKind) -> Self {
        ReleaseArtifact {
            path: path.into(),
            kind,
        }
    }

    /// File name of the artifact, as uploaded
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Artifact file name: `{project}-v{version}.{ext}`
pub fn artifact_file_name(project: &str, version: &str, extension: &str) -> String {
    format!("{}-v{}.{}", project, version, extension)
}

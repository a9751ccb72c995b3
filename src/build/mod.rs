//! Local build and release packaging
//!
//! Installs dependencies, runs the project build, classifies the project and
//! produces exactly one [`ReleaseArtifact`]. Every step runs to completion
//! before the next one starts, and any failed postcondition aborts with a
//! build error.

pub mod runner;

pub use runner::{CommandOutput, CommandRunner, CommandSpec, ScriptedRunner, SystemRunner};

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::BuildConfig;
use crate::domain::{artifact_file_name, ArtifactKind, ReleaseArtifact, Version};
use crate::error::{GitFlowError, Result};
use runner::run_checked;

/// Package manager picked from the lock file present at the project root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// `package-lock.json` or `npm-shrinkwrap.json`
    NpmLocked,
    /// `yarn.lock`
    Yarn,
    /// `pnpm-lock.yaml`
    Pnpm,
    /// No lock file: best-effort install
    NpmUnlocked,
}

impl PackageManager {
    pub fn detect(project_dir: &Path) -> Self {
        let has = |name: &str| project_dir.join(name).is_file();

        if has("pnpm-lock.yaml") {
            PackageManager::Pnpm
        } else if has("yarn.lock") {
            PackageManager::Yarn
        } else if has("package-lock.json") || has("npm-shrinkwrap.json") {
            PackageManager::NpmLocked
        } else {
            PackageManager::NpmUnlocked
        }
    }

    pub fn install_command(&self) -> CommandSpec {
        match self {
            PackageManager::NpmLocked => CommandSpec::new("npm", ["ci"]),
            PackageManager::Yarn => CommandSpec::new("yarn", ["install", "--frozen-lockfile"]),
            PackageManager::Pnpm => CommandSpec::new("pnpm", ["install", "--frozen-lockfile"]),
            PackageManager::NpmUnlocked => CommandSpec::new("npm", ["install"]),
        }
    }

    pub fn build_command(&self) -> CommandSpec {
        match self {
            PackageManager::NpmLocked | PackageManager::NpmUnlocked => {
                CommandSpec::new("npm", ["run", "build"])
            }
            PackageManager::Yarn => CommandSpec::new("yarn", ["build"]),
            PackageManager::Pnpm => CommandSpec::new("pnpm", ["run", "build"]),
        }
    }
}

/// Build variant, decided after the build has run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
    /// Platform descriptor present: the build leaves an archive to release
    Archive,
    /// Everything else: the build output is zipped with the project files
    Standard,
}

impl BuildKind {
    pub fn classify(project_dir: &Path, settings: &BuildConfig) -> Self {
        if project_dir.join(&settings.archive_descriptor).is_file() {
            BuildKind::Archive
        } else {
            BuildKind::Standard
        }
    }
}

/// Drives install and build for one release and packages the result
pub struct BuildPackager<'a> {
    runner: &'a dyn CommandRunner,
    project_dir: &'a Path,
    settings: &'a BuildConfig,
}

impl<'a> BuildPackager<'a> {
    pub fn new(runner: &'a dyn CommandRunner, project_dir: &'a Path, settings: &'a BuildConfig) -> Self {
        BuildPackager {
            runner,
            project_dir,
            settings,
        }
    }

    /// Install, build and package.
    ///
    /// For archive builds `update_descriptor` is called with the descriptor
    /// path once the archive has been renamed, never before.
    pub fn package<F>(
        &self,
        project: &str,
        version: &Version,
        update_descriptor: F,
    ) -> Result<ReleaseArtifact>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        let manager = PackageManager::detect(self.project_dir);

        tracing::info!(?manager, "installing dependencies");
        run_checked(self.runner, &manager.install_command().in_dir(self.project_dir))?;

        tracing::info!("building project");
        run_checked(self.runner, &manager.build_command().in_dir(self.project_dir))?;

        let kind = BuildKind::classify(self.project_dir, self.settings);
        tracing::info!(?kind, "classified build");

        let archive = match kind {
            BuildKind::Archive => {
                let artifact = self.collect_archive(project, version)?;
                update_descriptor(&self.project_dir.join(&self.settings.archive_descriptor))?;
                Some(artifact)
            }
            BuildKind::Standard => {
                self.verify_standard_output()?;
                None
            }
        };

        match archive {
            Some(artifact) => Ok(artifact),
            None => self.assemble_package(project, version),
        }
    }

    /// Find the built archive and rename it to `{project}-v{version}.{ext}`
    fn collect_archive(&self, project: &str, version: &Version) -> Result<ReleaseArtifact> {
        let archive_dir = self.project_dir.join(&self.settings.archive_dir);
        if !archive_dir.is_dir() {
            return Err(GitFlowError::build(format!(
                "Archive directory '{}' not found - build may have failed",
                archive_dir.display()
            )));
        }

        let source = self.first_archive(&archive_dir)?.ok_or_else(|| {
            GitFlowError::build(format!(
                "No .{} file in '{}' - build may have failed",
                self.settings.archive_extension,
                archive_dir.display()
            ))
        })?;

        let target = archive_dir.join(artifact_file_name(
            project,
            &version.to_string(),
            &self.settings.archive_extension,
        ));
        if source != target {
            fs::rename(&source, &target).map_err(|e| {
                GitFlowError::build(format!(
                    "Cannot rename '{}' to '{}': {}",
                    source.display(),
                    target.display(),
                    e
                ))
            })?;
        }

        tracing::info!(artifact = %target.display(), "archive ready");
        Ok(ReleaseArtifact::new(target, ArtifactKind::PlatformArchive))
    }

    fn first_archive(&self, archive_dir: &Path) -> Result<Option<PathBuf>> {
        let extension = self.settings.archive_extension.as_str();
        let mut archives = Vec::new();

        for entry in fs::read_dir(archive_dir)? {
            let path = entry?.path();
            let matches = path.is_file()
                && path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case(extension))
                    .unwrap_or(false);
            if matches {
                archives.push(path);
            }
        }

        archives.sort();
        Ok(archives.into_iter().next())
    }

    fn verify_standard_output(&self) -> Result<()> {
        let output = self.project_dir.join(&self.settings.standard_output);
        if !output.is_file() {
            return Err(GitFlowError::build(format!(
                "Build output '{}' not found - build may have failed",
                output.display()
            )));
        }
        Ok(())
    }

    /// Zip the standard release files into `{project}-v{version}.zip`
    fn assemble_package(&self, project: &str, version: &Version) -> Result<ReleaseArtifact> {
        let file_name = artifact_file_name(project, &version.to_string(), "zip");
        let target = self.project_dir.join(&file_name);

        // zip -r updates an existing archive in place
        if target.exists() {
            fs::remove_file(&target)?;
        }

        let included: Vec<String> = self
            .settings
            .package_paths
            .iter()
            .filter(|path| self.project_dir.join(path).exists())
            .cloned()
            .collect();
        if included.is_empty() {
            return Err(GitFlowError::build("Nothing to package: no release files found"));
        }

        let mut args = vec!["-r".to_string(), file_name.clone()];
        args.extend(included);
        run_checked(self.runner, &CommandSpec::new("zip", args).in_dir(self.project_dir))?;

        if !target.is_file() {
            return Err(GitFlowError::build(format!(
                "Package '{}' was not created",
                target.display()
            )));
        }

        tracing::info!(artifact = %target.display(), "package ready");
        Ok(ReleaseArtifact::new(target, ArtifactKind::StandardPackage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn settings() -> BuildConfig {
        BuildConfig::default()
    }

    /// Runner that fakes `zip` by creating the named archive
    fn zip_faking_runner() -> ScriptedRunner {
        ScriptedRunner::new(|cmd| {
            if cmd.program == "zip" {
                if let (Some(dir), Some(name)) = (&cmd.cwd, cmd.args.get(1)) {
                    fs::write(dir.join(name), b"PK")?;
                }
            }
            Ok(CommandOutput::ok(""))
        })
    }

    fn write(dir: &Path, path: &str, content: &str) {
        let full = dir.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }

    #[test]
    fn test_detect_package_manager() {
        let dir = TempDir::new().unwrap();
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::NpmUnlocked);

        write(dir.path(), "package-lock.json", "{}");
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::NpmLocked);

        write(dir.path(), "yarn.lock", "");
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Yarn);
    }

    #[test]
    fn test_install_and_build_commands_follow_lock_file() {
        assert_eq!(PackageManager::NpmLocked.install_command().to_string(), "npm ci");
        assert_eq!(PackageManager::NpmUnlocked.install_command().to_string(), "npm install");
        assert_eq!(
            PackageManager::Pnpm.install_command().to_string(),
            "pnpm install --frozen-lockfile"
        );
        assert_eq!(PackageManager::Yarn.build_command().to_string(), "yarn build");
    }

    #[test]
    fn test_install_failure_aborts_before_build() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new(|_| Ok(CommandOutput::failed("network down")));
        let config = settings();
        let packager = BuildPackager::new(&runner, dir.path(), &config);

        let err = packager
            .package("billing", &Version::new(1, 2, 0), |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, GitFlowError::Build(_)));
        assert_eq!(runner.command_lines(), vec!["npm install"]);
    }

    #[test]
    fn test_standard_build_produces_zip() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package-lock.json", "{}");
        write(dir.path(), "dist/index.js", "module.exports = {}");
        write(dir.path(), "action.yml", "name: billing");
        write(dir.path(), "package.json", "{}");

        let runner = zip_faking_runner();
        let config = settings();
        let packager = BuildPackager::new(&runner, dir.path(), &config);

        let artifact = packager
            .package("billing", &Version::new(1, 2, 0), |_| {
                panic!("standard builds have no descriptor")
            })
            .unwrap();

        assert_eq!(artifact.kind, ArtifactKind::StandardPackage);
        assert_eq!(artifact.path, dir.path().join("billing-v1.2.0.zip"));
        assert_eq!(
            runner.command_lines(),
            vec![
                "npm ci",
                "npm run build",
                "zip -r billing-v1.2.0.zip dist action.yml package.json"
            ]
        );
    }

    #[test]
    fn test_standard_build_without_output_fails() {
        let dir = TempDir::new().unwrap();
        let runner = zip_faking_runner();
        let config = settings();
        let packager = BuildPackager::new(&runner, dir.path(), &config);

        let err = packager
            .package("billing", &Version::new(1, 2, 0), |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, GitFlowError::Build(_)));
        assert!(err.to_string().contains("dist/index.js"));
    }

    #[test]
    fn test_archive_build_without_archive_dir_fails() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "mta.yaml", "ID: billing\nversion: 1.1.0\n");

        let runner = ScriptedRunner::succeeding();
        let config = settings();
        let packager = BuildPackager::new(&runner, dir.path(), &config);
        let called = Cell::new(false);

        let err = packager
            .package("billing", &Version::new(1, 2, 0), |_| {
                called.set(true);
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, GitFlowError::Build(_)));
        assert!(err.to_string().contains("build may have failed"));
        assert!(!called.get());
    }

    #[test]
    fn test_archive_build_with_empty_archive_dir_fails() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "mta.yaml", "ID: billing\nversion: 1.1.0\n");
        write(dir.path(), "mta_archives/build.log", "ok");

        let runner = ScriptedRunner::succeeding();
        let config = settings();
        let packager = BuildPackager::new(&runner, dir.path(), &config);
        let called = Cell::new(false);

        let err = packager
            .package("billing", &Version::new(1, 2, 0), |_| {
                called.set(true);
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, GitFlowError::Build(_)));
        assert!(!called.get(), "descriptor must not be patched without an archive");
    }

    #[test]
    fn test_archive_build_renames_then_updates_descriptor() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "mta.yaml", "ID: billing\nversion: 1.1.0\n");
        write(dir.path(), "mta_archives/billing_1.1.0.mtar", "archive");

        let runner = ScriptedRunner::succeeding();
        let config = settings();
        let packager = BuildPackager::new(&runner, dir.path(), &config);
        let renamed = dir.path().join("mta_archives/billing-v1.2.0.mtar");
        let original = dir.path().join("mta_archives/billing_1.1.0.mtar");

        let artifact = packager
            .package("billing", &Version::new(1, 2, 0), |descriptor| {
                assert!(renamed.is_file(), "archive must be renamed before the descriptor update");
                assert!(!original.exists());
                assert_eq!(descriptor, dir.path().join("mta.yaml"));
                Ok(())
            })
            .unwrap();

        assert_eq!(artifact.kind, ArtifactKind::PlatformArchive);
        assert_eq!(artifact.path, renamed);
        assert!(!runner.command_lines().iter().any(|line| line.starts_with("zip")));
    }

    #[test]
    fn test_archive_descriptor_update_failure_is_propagated() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "mta.yaml", "ID: billing\nversion: 1.1.0\n");
        write(dir.path(), "mta_archives/billing.mtar", "archive");

        let runner = ScriptedRunner::succeeding();
        let config = settings();
        let packager = BuildPackager::new(&runner, dir.path(), &config);

        let err = packager
            .package("billing", &Version::new(1, 2, 0), |_| {
                Err(GitFlowError::gateway("sha mismatch"))
            })
            .unwrap_err();
        assert!(matches!(err, GitFlowError::Gateway(_)));
    }
}

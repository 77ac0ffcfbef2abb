//! Template providers.
//!
//! A provider turns a template name into its body. [`LocalProvider`] reads
//! from a directory on disk; [`GitProvider`] clones the named repository
//! into a temporary checkout and reads from there, additionally exposing
//! the checkout's head commit for deploy metadata.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::{TemplateError, TemplateResult};

/// Source of template bodies.
pub trait TemplateProvider {
    /// Read a template body by filename.
    fn read(&self, name: &str) -> TemplateResult<String>;

    /// Head commit hash of the template checkout, when resolvable.
    fn head(&self) -> TemplateResult<Option<String>>;

    /// Symbolic ref the checkout points at, when resolvable.
    fn git_ref(&self) -> Option<String>;
}

/// Provider reading templates from a local directory.
#[derive(Debug)]
pub struct LocalProvider {
    root: PathBuf,
}

impl LocalProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TemplateProvider for LocalProvider {
    fn read(&self, name: &str) -> TemplateResult<String> {
        let path = self.root.join(name);
        if !path.exists() {
            return Err(TemplateError::NotFound(path.display().to_string()));
        }
        debug!("Reading template from {:?}", path);
        Ok(fs::read_to_string(path)?)
    }

    // Local templates carry no resolvable source-control metadata
    fn head(&self) -> TemplateResult<Option<String>> {
        Ok(None)
    }

    fn git_ref(&self) -> Option<String> {
        None
    }
}

/// Provider reading templates from a temporary git checkout.
pub struct GitProvider {
    root: Option<String>,
    checkout: TempDir,
}

impl GitProvider {
    /// Check if git is available on the system.
    pub fn is_git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Clone `repo` (depth 1) into a temporary directory.
    ///
    /// The checkout lives as long as the provider.
    pub fn clone(repo: &str, root: Option<&str>) -> TemplateResult<Self> {
        let checkout = TempDir::new()?;
        info!("Cloning {} into {:?}", repo, checkout.path());

        let output = Command::new("git")
            .args(["clone", "--depth", "1", repo, "."])
            .current_dir(checkout.path())
            .output()
            .map_err(|e| TemplateError::Git(format!("Failed to run git clone: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TemplateError::Git(format!(
                "git clone {} failed: {}",
                repo,
                stderr.trim()
            )));
        }

        Ok(Self {
            root: root.map(String::from),
            checkout,
        })
    }

    fn content_dir(&self) -> PathBuf {
        match &self.root {
            Some(root) => self.checkout.path().join(root),
            None => self.checkout.path().to_path_buf(),
        }
    }

    fn rev_parse(&self, args: &[&str]) -> TemplateResult<String> {
        let output = Command::new("git")
            .arg("rev-parse")
            .args(args)
            .current_dir(self.checkout.path())
            .output()
            .map_err(|e| TemplateError::Git(format!("Failed to run git rev-parse: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TemplateError::Git(format!(
                "git rev-parse failed: {}",
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl TemplateProvider for GitProvider {
    fn read(&self, name: &str) -> TemplateResult<String> {
        let path = self.content_dir().join(name);
        if !path.exists() {
            return Err(TemplateError::NotFound(format!(
                "{} (in cloned repository)",
                name
            )));
        }
        debug!("Reading template from {:?}", path);
        Ok(fs::read_to_string(path)?)
    }

    fn head(&self) -> TemplateResult<Option<String>> {
        self.rev_parse(&["HEAD"]).map(Some)
    }

    fn git_ref(&self) -> Option<String> {
        self.rev_parse(&["--abbrev-ref", "HEAD"])
            .ok()
            .filter(|r| !r.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn init_fixture_repo(path: &Path) {
        for args in [
            vec!["init", "-b", "main"],
            vec!["config", "user.email", "ci@example.com"],
            vec!["config", "user.name", "ci"],
            vec!["add", "."],
            vec!["commit", "-m", "fixture"],
        ] {
            let output = Command::new("git")
                .args(&args)
                .current_dir(path)
                .output()
                .unwrap();
            assert!(
                output.status.success(),
                "git {} failed: {}",
                args[0],
                String::from_utf8_lossy(&output.stderr)
            );
        }
    }

    #[test]
    fn test_local_provider_reads_template() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("vpc.yaml"), "Resources: {}\n").unwrap();

        let provider = LocalProvider::new(temp.path());
        let body = provider.read("vpc.yaml").unwrap();
        assert_eq!(body, "Resources: {}\n");
    }

    #[test]
    fn test_local_provider_missing_template() {
        let temp = TempDir::new().unwrap();
        let provider = LocalProvider::new(temp.path());

        match provider.read("missing.yaml") {
            Err(TemplateError::NotFound(path)) => assert!(path.contains("missing.yaml")),
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_local_provider_has_no_head() {
        let temp = TempDir::new().unwrap();
        let provider = LocalProvider::new(temp.path());
        assert!(provider.head().unwrap().is_none());
        assert!(provider.git_ref().is_none());
    }

    #[test]
    fn test_git_provider_clone_and_head() {
        if !GitProvider::is_git_available() {
            println!("Git not available, skipping test");
            return;
        }

        let upstream = TempDir::new().unwrap();
        fs::write(upstream.path().join("vpc.yaml"), "Resources: {}\n").unwrap();
        init_fixture_repo(upstream.path());

        let provider =
            GitProvider::clone(upstream.path().to_str().unwrap(), None).unwrap();
        assert_eq!(provider.read("vpc.yaml").unwrap(), "Resources: {}\n");

        let head = provider.head().unwrap().unwrap();
        assert_eq!(head.len(), 40);
    }
}

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::DriverError;

/// A private copy of a Terraform folder. The copy is removed when this value
/// is dropped, so keep it alive until after `destroy` has run.
pub struct TestFolder {
    _root: tempfile::TempDir,
    path: PathBuf,
}

impl TestFolder {
    /// Absolute path of the Terraform folder inside the copy.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Copy `root` into a fresh temporary directory and return the location of
/// `relative` inside it, so parallel runs never share `.terraform/` or state
/// files.
///
/// Hidden entries (except the provider lock file and `.terraform-version`),
/// state files and `terraform.tfvars[.json]` are not copied. Symlinks are
/// followed, so the copy holds real files.
pub fn copy_terraform_folder_to_temp(
    root: &Path,
    relative: &Path,
    name_hint: &str,
) -> Result<TestFolder, DriverError> {
    let root = root
        .canonicalize()
        .map_err(|e| DriverError::Internal(format!("canonicalize {:?}: {}", root, e)))?;

    let tmp = tempfile::Builder::new()
        .prefix(&format!("{}-", name_hint))
        .tempdir()
        .map_err(|e| DriverError::Internal(format!("create temp dir: {}", e)))?;

    copy_dir(&root, tmp.path())?;

    let path = tmp.path().join(relative);
    if !path.is_dir() {
        return Err(DriverError::Internal(format!(
            "{:?} is not a directory under {:?}",
            relative, root
        )));
    }
    debug!(from = %root.display(), to = %path.display(), "copied terraform folder");

    Ok(TestFolder { _root: tmp, path })
}

fn copy_dir(from: &Path, to: &Path) -> Result<(), DriverError> {
    let walker = WalkDir::new(from)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(&e.file_name().to_string_lossy()));

    for entry in walker {
        let entry = entry.map_err(|e| DriverError::Internal(format!("walk {:?}: {}", from, e)))?;
        let src = entry.path();
        let rel = src
            .strip_prefix(from)
            .map_err(|e| DriverError::Internal(format!("{:?} outside {:?}: {}", src, from, e)))?;
        let dst = to.join(rel);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dst)
                .map_err(|e| DriverError::Internal(format!("create {:?}: {}", dst, e)))?;
        } else {
            std::fs::copy(src, &dst)
                .map_err(|e| DriverError::Internal(format!("copy {:?} → {:?}: {}", src, dst, e)))?;
        }
    }
    Ok(())
}

/// Files Terraform needs from a hidden name: the provider lock file and the
/// version pin.
const KEPT_DOTFILES: &[&str] = &[".terraform.lock.hcl", ".terraform-version"];

fn is_excluded(name: &str) -> bool {
    (name.starts_with('.') && !KEPT_DOTFILES.contains(&name))
        || name.contains(".tfstate")
        || name == "terraform.tfvars"
        || name == "terraform.tfvars.json"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "x").unwrap();
    }

    #[test]
    fn copies_definitions_and_skips_state() {
        let src = tempfile::tempdir().unwrap();
        touch(&src.path().join("main.tf"));
        touch(&src.path().join("modules/bucket/main.tf"));
        touch(&src.path().join("terraform.tfstate"));
        touch(&src.path().join("terraform.tfstate.backup"));
        touch(&src.path().join("terraform.tfvars"));
        touch(&src.path().join(".terraform/plugins/p"));
        touch(&src.path().join(".hidden"));
        touch(&src.path().join(".terraform.lock.hcl"));
        touch(&src.path().join(".terraform-version"));

        let folder = copy_terraform_folder_to_temp(src.path(), Path::new("."), "t").unwrap();
        let dir = folder.path();

        assert!(dir.join("main.tf").exists());
        assert!(dir.join("modules/bucket/main.tf").exists());
        assert!(!dir.join("terraform.tfstate").exists());
        assert!(!dir.join("terraform.tfstate.backup").exists());
        assert!(!dir.join("terraform.tfvars").exists());
        assert!(!dir.join(".terraform").exists());
        assert!(!dir.join(".hidden").exists());
        assert!(dir.join(".terraform.lock.hcl").exists());
        assert!(dir.join(".terraform-version").exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_module_dir_is_copied() {
        let shared = tempfile::tempdir().unwrap();
        touch(&shared.path().join("main.tf"));
        touch(&shared.path().join("nested/outputs.tf"));

        let src = tempfile::tempdir().unwrap();
        touch(&src.path().join("main.tf"));
        std::os::unix::fs::symlink(shared.path(), src.path().join("modules")).unwrap();

        let folder = copy_terraform_folder_to_temp(src.path(), Path::new("."), "t").unwrap();
        let modules = folder.path().join("modules");

        assert!(modules.join("main.tf").is_file());
        assert!(modules.join("nested/outputs.tf").is_file());
        assert!(!std::fs::symlink_metadata(&modules)
            .unwrap()
            .file_type()
            .is_symlink());
    }

    #[test]
    fn returns_subfolder_and_cleans_up_on_drop() {
        let src = tempfile::tempdir().unwrap();
        touch(&src.path().join("examples/basic/main.tf"));

        let folder =
            copy_terraform_folder_to_temp(src.path(), Path::new("examples/basic"), "t").unwrap();
        let path = folder.path().to_path_buf();
        assert!(path.join("main.tf").exists());
        assert_ne!(path, src.path().join("examples/basic"));

        drop(folder);
        assert!(!path.exists());
    }

    #[test]
    fn two_copies_are_independent() {
        let src = tempfile::tempdir().unwrap();
        touch(&src.path().join("main.tf"));

        let a = copy_terraform_folder_to_temp(src.path(), Path::new("."), "a").unwrap();
        let b = copy_terraform_folder_to_temp(src.path(), Path::new("."), "b").unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn missing_subfolder_is_error() {
        let src = tempfile::tempdir().unwrap();
        touch(&src.path().join("main.tf"));
        assert!(copy_terraform_folder_to_temp(src.path(), Path::new("nope"), "t").is_err());
    }
}

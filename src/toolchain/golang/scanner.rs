//! Go package discovery.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use walkdir::{DirEntry, WalkDir};

use crate::core::registry::UnitScanner;
use crate::core::unit::{SourceUnit, UnitKind};
use crate::toolchain::golang::GO_PACKAGE;
use crate::util::fs::{relative_path, slash_path};

static MODULE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^module\s+"?([^"\s]+)"?"#).expect("valid module regex"));

/// Finds Go packages: one unit per directory holding `.go` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoScanner;

/// Directories the go tool ignores.
fn is_ignored_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name.starts_with('_') || name == "testdata" || name == "vendor"
}

impl UnitScanner for GoScanner {
    fn kind(&self) -> UnitKind {
        UnitKind::new(GO_PACKAGE)
    }

    fn scan_units(&self, dir: &Path) -> Result<Vec<SourceUnit>> {
        let mut packages: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_ignored_dir(e))
        {
            let entry =
                entry.with_context(|| format!("failed to walk {}", dir.display()))?;
            if !entry.file_type().is_file()
                || entry.path().extension().is_none_or(|ext| ext != "go")
            {
                continue;
            }

            let file = relative_path(dir, entry.path());
            let pkg_dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
            packages.entry(pkg_dir).or_default().push(file);
        }

        let units = packages
            .into_iter()
            .map(|(pkg_dir, files)| {
                let name = slash_path(&pkg_dir);
                SourceUnit::new(name.clone(), self.kind(), PathBuf::from(name)).with_files(files)
            })
            .collect::<Vec<_>>();

        tracing::debug!("Found {} Go package(s) in {}", units.len(), dir.display());
        Ok(units)
    }

    fn detect_namespace(&self, dir: &Path) -> Result<Option<String>> {
        let go_mod = dir.join("go.mod");
        if !go_mod.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&go_mod)
            .with_context(|| format!("failed to read {}", go_mod.display()))?;
        Ok(module_path(&contents))
    }
}

/// Module path declared in go.mod contents.
fn module_path(go_mod: &str) -> Option<String> {
    MODULE_LINE
        .captures(go_mod)
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "package x\n").unwrap();
    }

    #[test]
    fn test_scan_packages() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "main.go");
        touch(tmp.path(), "util/util.go");
        touch(tmp.path(), "util/util_test.go");
        touch(tmp.path(), "util/README.md");
        touch(tmp.path(), "vendor/dep/dep.go");
        touch(tmp.path(), "testdata/fixture.go");
        touch(tmp.path(), ".hidden/h.go");
        touch(tmp.path(), "_old/o.go");
        touch(tmp.path(), "docs/notes.txt");

        let units = GoScanner.scan_units(tmp.path()).unwrap();
        let names: Vec<_> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec![".", "util"]);

        let util = &units[1];
        assert_eq!(util.kind.as_str(), GO_PACKAGE);
        assert_eq!(util.dir, PathBuf::from("util"));
        assert_eq!(
            util.files,
            vec![PathBuf::from("util/util.go"), PathBuf::from("util/util_test.go")]
        );
    }

    #[test]
    fn test_detect_namespace() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(GoScanner.detect_namespace(tmp.path()).unwrap(), None);

        fs::write(
            tmp.path().join("go.mod"),
            "// comment\nmodule example.com/app\n\ngo 1.22\n",
        )
        .unwrap();
        assert_eq!(
            GoScanner.detect_namespace(tmp.path()).unwrap(),
            Some("example.com/app".to_string())
        );
    }

    #[test]
    fn test_quoted_module_path() {
        assert_eq!(
            module_path("module \"example.com/q\"\n"),
            Some("example.com/q".to_string())
        );
        assert_eq!(module_path("go 1.22\n"), None);
    }
}

//! Test fixtures for common test scenarios.
//!
//! Checkouts on disk and a ready-made toolchain environment.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use git2::{Repository, Signature};
use tempfile::TempDir;

use crate::core::environment::Environment;
use crate::util::config::{Config, RuntimeKind};

use super::CountingMetadataSource;

/// Grapher command printing an empty graph.
pub const EMPTY_GRAPHER: &[&str] = &[
    "sh",
    "-c",
    r#"echo '{"symbols":[],"refs":[],"docs":[]}'"#,
];

/// Write `files` under `root`, creating parent directories.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, contents) in files {
        let path = root.join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
}

/// A git repository with `files` committed as one commit.
///
/// Returns the checkout and the commit id.
pub fn git_repo(files: &[(&str, &str)]) -> (TempDir, String) {
    let tmp = TempDir::new().unwrap();
    write_files(tmp.path(), files);

    let repo = Repository::init(tmp.path()).unwrap();
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let sig = Signature::now("Test Author", "author@example.com").unwrap();
    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, "initial commit", &tree, &[])
        .unwrap();

    (tmp, oid.to_string())
}

/// A Go module `example.com/app` with a root package and `util`.
pub fn go_repo() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_files(
        tmp.path(),
        &[
            ("go.mod", "module example.com/app\n\ngo 1.22\n"),
            (
                "main.go",
                "package main\n\nimport (\n\t\"fmt\"\n\n\t\"example.com/app/util\"\n)\n\nfunc main() { fmt.Println(util.Name()) }\n",
            ),
            ("util/util.go", "package util\n\nfunc Name() string { return \"app\" }\n"),
        ],
    );
    tmp
}

/// Configuration running commands on the host.
pub fn local_config(with_grapher: bool) -> Config {
    let mut config = Config::default();
    config.container.runtime = Some(RuntimeKind::Local);
    if with_grapher {
        config.go.grapher = Some(EMPTY_GRAPHER.iter().map(|s| s.to_string()).collect());
    }
    config
}

/// Built-in toolchains on the local runtime, with an empty metadata table.
pub fn test_environment(with_grapher: bool) -> Environment {
    Environment::with_metadata(
        &local_config(with_grapher),
        Arc::new(CountingMetadataSource::new()),
    )
}

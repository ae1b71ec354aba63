//! `go list` based dependency lister.

use std::path::Path;

use anyhow::{bail, Result};

use crate::builder::container::ContainerCommand;
use crate::core::dependency::DependencyKind;
use crate::core::registry::Lister;
use crate::core::repository::RepositoryConfig;
use crate::core::unit::SourceUnit;
use crate::dep::lister::line_transform;
use crate::toolchain::golang::{GoToolchain, GO_IMPORT_PATH};
use crate::util::fs::slash_path;

/// Prints direct, test and external test imports, one per line.
const IMPORTS_TEMPLATE: &str =
    "{{join .Imports \"\\n\"}}\n{{join .TestImports \"\\n\"}}\n{{join .XTestImports \"\\n\"}}";

impl GoToolchain {
    /// Directory the repository is mounted at inside the container.
    pub fn container_workdir(config: &RepositoryConfig) -> String {
        let namespace = config.namespace.trim_matches('/');
        if namespace.is_empty() {
            "/src".to_string()
        } else {
            format!("/go/src/{}", namespace)
        }
    }
}

impl Lister for GoToolchain {
    fn build_lister(
        &self,
        dir: &Path,
        unit: &SourceUnit,
        config: &RepositoryConfig,
    ) -> Result<ContainerCommand> {
        if unit.dir.is_absolute() {
            bail!(
                "unit directory `{}` must be relative to the repository",
                unit.dir.display()
            );
        }

        let package = match slash_path(&unit.dir).as_str() {
            "." => ".".to_string(),
            rel => format!("./{}", rel),
        };

        let args = vec![
            "go".to_string(),
            "list".to_string(),
            "-e".to_string(),
            "-f".to_string(),
            IMPORTS_TEMPLATE.to_string(),
            package,
        ];

        Ok(
            ContainerCommand::new(&self.image, dir, Self::container_workdir(config), args)
                .env("GOFLAGS", "-mod=mod")
                .with_transform(line_transform(DependencyKind::new(GO_IMPORT_PATH))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::dependency::RawDependency;
    use crate::core::unit::UnitKind;
    use crate::test_support::CountingMetadataSource;
    use crate::toolchain::golang::GO_PACKAGE;
    use crate::util::config::GoConfig;

    fn toolchain() -> GoToolchain {
        GoToolchain::new(&GoConfig::default(), Arc::new(CountingMetadataSource::new()))
    }

    #[test]
    fn test_go_list_command() {
        let unit = SourceUnit::new("util", UnitKind::new(GO_PACKAGE), "util");
        let config = RepositoryConfig::new("example.com/app").with_namespace("example.com/app");

        let cmd = toolchain()
            .build_lister(Path::new("/repo"), &unit, &config)
            .unwrap();

        assert_eq!(cmd.image, "golang:1.22");
        assert_eq!(cmd.workdir, "/go/src/example.com/app");
        assert_eq!(&cmd.args[..3], &["go", "list", "-e"]);
        assert_eq!(cmd.args.last().unwrap(), "./util");
        assert!(cmd.args[4].contains(".XTestImports"));
    }

    #[test]
    fn test_root_package() {
        let unit = SourceUnit::new(".", UnitKind::new(GO_PACKAGE), ".");
        let cmd = toolchain()
            .build_lister(Path::new("/repo"), &unit, &RepositoryConfig::default())
            .unwrap();

        assert_eq!(cmd.workdir, "/src");
        assert_eq!(cmd.args.last().unwrap(), ".");
    }

    #[test]
    fn test_transform_produces_import_paths() {
        let unit = SourceUnit::new("util", UnitKind::new(GO_PACKAGE), "util");
        let cmd = toolchain()
            .build_lister(Path::new("/repo"), &unit, &RepositoryConfig::default())
            .unwrap();

        let out = cmd.transform(b"fmt\nos\n\nfmt\ntesting\n").unwrap();
        let deps: Vec<RawDependency> = serde_json::from_slice(&out).unwrap();
        let paths: Vec<_> = deps.iter().map(|d| d.target_str().unwrap()).collect();
        assert_eq!(paths, vec!["fmt", "os", "testing"]);
        assert!(deps.iter().all(|d| d.target_kind.as_str() == GO_IMPORT_PATH));
    }

    #[test]
    fn test_absolute_unit_dir_rejected() {
        let unit = SourceUnit::new("x", UnitKind::new(GO_PACKAGE), "/abs/x");
        assert!(toolchain()
            .build_lister(Path::new("/repo"), &unit, &RepositoryConfig::default())
            .is_err());
    }
}

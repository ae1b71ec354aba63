//! Grapher backed by an external analyzer command.
//!
//! The command runs in the toolchain image with the unit directory appended
//! to its arguments and must print a JSON object with `symbols`, `refs` and
//! `docs` arrays.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::builder::container::{ContainerCommand, ContainerRuntime};
use crate::core::registry::{GraphOutput, Grapher};
use crate::core::repository::RepositoryConfig;
use crate::core::unit::SourceUnit;
use crate::util::fs::slash_path;

pub struct CommandGrapher {
    image: String,
    command: Vec<String>,
    runtime: Arc<dyn ContainerRuntime>,
}

impl CommandGrapher {
    pub fn new(
        image: impl Into<String>,
        command: Vec<String>,
        runtime: Arc<dyn ContainerRuntime>,
    ) -> Self {
        CommandGrapher {
            image: image.into(),
            command,
            runtime,
        }
    }

    fn command_for(&self, dir: &Path, unit: &SourceUnit) -> ContainerCommand {
        let mut args = self.command.clone();
        args.push(slash_path(&unit.dir));
        ContainerCommand::new(&self.image, dir, "/src", args)
    }
}

impl Grapher for CommandGrapher {
    fn graph(
        &self,
        dir: &Path,
        unit: &SourceUnit,
        _config: &RepositoryConfig,
    ) -> Result<GraphOutput> {
        let output = self.command_for(dir, unit).run(self.runtime.as_ref())?;
        serde_json::from_slice(&output)
            .with_context(|| format!("grapher produced invalid output for {}", unit.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::builder::container::LocalRuntime;
    use crate::core::unit::UnitKind;

    fn grapher(script: &str) -> CommandGrapher {
        CommandGrapher::new(
            "unused",
            vec!["sh".to_string(), "-c".to_string(), script.to_string(), "graph".to_string()],
            Arc::new(LocalRuntime),
        )
    }

    #[test]
    fn test_graph_output_decoded() {
        let tmp = TempDir::new().unwrap();
        let unit = SourceUnit::new("util", UnitKind::new("GoPackage"), "util");

        let out = grapher(r#"echo "{\"symbols\":[{\"name\":\"$1\"}],\"refs\":[]}""#)
            .graph(tmp.path(), &unit, &RepositoryConfig::default())
            .unwrap();

        assert_eq!(out.symbols.len(), 1);
        assert_eq!(out.symbols[0]["name"], "util");
        assert!(out.docs.is_empty());
    }

    #[test]
    fn test_invalid_output() {
        let tmp = TempDir::new().unwrap();
        let unit = SourceUnit::new("util", UnitKind::new("GoPackage"), "util");

        let err = grapher("echo nope")
            .graph(tmp.path(), &unit, &RepositoryConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("invalid output"));
    }
}

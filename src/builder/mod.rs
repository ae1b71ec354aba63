//! Build planning and execution.
//!
//! A plan holds one rule per analysis phase of every source unit; the
//! executor runs stale rules in dependency order.

pub mod actions;
pub mod container;
pub mod events;
pub mod executor;
pub mod fingerprint;
pub mod plan;

pub use container::{ContainerCommand, ContainerRuntime, DockerRuntime, LocalRuntime};
pub use events::{BuildEvent, EventSink};
pub use executor::{execute, render, ExecError, ExecuteOptions, ExecuteReport};
pub use plan::{plan, BuildPlan, BuildRule, Phase, PlanError, PlanRequest};

//! Build executor: validates a plan and runs its rules in dependency order.
//!
//! Rules run on a bounded pool of worker threads. The main thread owns the
//! ready queue, decides freshness and dispatches stale rules; workers run
//! actions and write targets atomically.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::time::{Duration, Instant, SystemTime};

use anyhow::{anyhow, Context};
use indicatif::{ProgressBar, ProgressStyle};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use crate::builder::events::{BuildEvent, EventSink};
use crate::builder::fingerprint::{action_fingerprint, FingerprintCache, FINGERPRINT_FILE};
use crate::builder::plan::{ActionContext, BuildPlan, BuildRule};
use crate::util::fs::{modified, write_atomic};

/// A rule that did not produce its target.
#[derive(Debug)]
pub struct RuleFailure {
    pub target: String,
    pub error: anyhow::Error,
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("rule `{target}` needs `{}`, which is neither a rule target nor an existing file", .prerequisite.display())]
    MissingPrerequisite {
        target: String,
        prerequisite: PathBuf,
    },

    #[error("rule target `{}` is produced by more than one rule", .0.display())]
    DuplicateTarget(PathBuf),

    #[error("dependency cycle detected at rule `{target}`")]
    Cycle { target: String },

    #[error("rule `{target}` failed: {error:#}")]
    RuleFailed {
        target: String,
        error: anyhow::Error,
    },

    #[error("failed to write `{}`: {error:#}", .path.display())]
    Write { path: PathBuf, error: anyhow::Error },

    #[error("{} rule(s) failed:{}", .0.len(), format_failures(.0))]
    Failures(Vec<RuleFailure>),

    #[error(transparent)]
    Io(anyhow::Error),
}

fn format_failures(failures: &[RuleFailure]) -> String {
    failures.iter().fold(String::new(), |mut out, f| {
        let _ = write!(out, "\n  {}: {:#}", f.target, f.error);
        out
    })
}

/// Execution settings.
#[derive(Clone, Default)]
pub struct ExecuteOptions {
    /// Worker threads (None = CPU count)
    pub jobs: Option<usize>,

    /// Keep running independent rules after a failure
    pub keep_going: bool,

    /// Receives build events
    pub events: Option<EventSink>,

    /// Draw a progress bar on stderr
    pub progress: bool,
}

/// What an execution did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecuteReport {
    /// Rules whose action ran, in completion order
    pub ran: Vec<String>,

    /// Rules skipped as fresh
    pub fresh: Vec<String>,

    /// Rules not run because a prerequisite failed
    pub skipped: Vec<String>,

    pub duration: Duration,
}

/// Render the plan as a makefile-style listing.
pub fn render(plan: &BuildPlan) -> String {
    let mut out = String::new();
    for rule in &plan.rules {
        let prereqs: Vec<String> = rule
            .prerequisites
            .iter()
            .map(|p| p.path().display().to_string())
            .collect();
        let _ = writeln!(out, "{}: {}", rule.target.path.display(), prereqs.join(" "));
        let _ = writeln!(out, "\t{}", rule.action.describe());
        out.push('\n');
    }
    out
}

/// Prerequisite edges of every rule, by index.
struct RuleGraph {
    /// Rule prerequisites of each rule
    deps: Vec<Vec<usize>>,
    /// Rules depending on each rule
    dependents: Vec<Vec<usize>>,
}

fn build_graph(plan: &BuildPlan) -> Result<RuleGraph, ExecError> {
    let mut by_target: HashMap<&Path, usize> = HashMap::new();
    for (idx, rule) in plan.rules.iter().enumerate() {
        if by_target.insert(&rule.target.path, idx).is_some() {
            return Err(ExecError::DuplicateTarget(rule.target.path.clone()));
        }
    }

    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<NodeIndex> = (0..plan.rules.len()).map(|i| graph.add_node(i)).collect();
    let mut deps = vec![Vec::new(); plan.rules.len()];
    let mut dependents = vec![Vec::new(); plan.rules.len()];

    for (idx, rule) in plan.rules.iter().enumerate() {
        for prereq in &rule.prerequisites {
            let path = prereq.path();
            match by_target.get(path) {
                Some(&dep) => {
                    graph.add_edge(nodes[dep], nodes[idx], ());
                    deps[idx].push(dep);
                    dependents[dep].push(idx);
                }
                None if path.exists() => {}
                None => {
                    return Err(ExecError::MissingPrerequisite {
                        target: rule.target.rel_name.clone(),
                        prerequisite: path.to_path_buf(),
                    })
                }
            }
        }
    }

    toposort(&graph, None).map_err(|cycle| ExecError::Cycle {
        target: plan.rules[graph[cycle.node_id()]].target.rel_name.clone(),
    })?;

    Ok(RuleGraph { deps, dependents })
}

/// Whether a rule's target is up to date.
fn is_fresh(
    rule: &BuildRule,
    deps: &[usize],
    rebuilt: &HashSet<usize>,
    fingerprints: &FingerprintCache,
    fingerprint: &str,
) -> anyhow::Result<bool> {
    let Some(target_mtime) = modified(&rule.target.path)? else {
        return Ok(false);
    };

    if deps.iter().any(|d| rebuilt.contains(d)) {
        return Ok(false);
    }

    for prereq in &rule.prerequisites {
        if let Some(mtime) = modified(prereq.path())? {
            if newer(mtime, target_mtime) {
                return Ok(false);
            }
        }
    }

    Ok(!fingerprints.is_stale(&rule.target.path, fingerprint))
}

fn newer(a: SystemTime, b: SystemTime) -> bool {
    a.duration_since(b).is_ok_and(|d| !d.is_zero())
}

struct Job {
    idx: usize,
}

enum Outcome {
    Finished { idx: usize, duration: Duration },
    ActionFailed { idx: usize, error: anyhow::Error },
    WriteFailed { idx: usize, error: anyhow::Error },
}

fn run_rule(plan: &BuildPlan, idx: usize) -> Outcome {
    let rule = &plan.rules[idx];
    let start = Instant::now();

    let ctx = ActionContext {
        root_dir: &plan.root_dir,
        target: &rule.target,
        inputs: rule
            .prerequisites
            .iter()
            .map(|p| p.path().to_path_buf())
            .collect(),
    };

    tracing::debug!("Running {}: {}", rule.target.rel_name, rule.action.describe());
    let result = panic::catch_unwind(AssertUnwindSafe(|| rule.action.run(&ctx)))
        .unwrap_or_else(|payload| Err(anyhow!("action panicked: {}", panic_message(&*payload))));
    let bytes = match result {
        Ok(bytes) => bytes,
        Err(error) => return Outcome::ActionFailed { idx, error },
    };

    match write_atomic(&rule.target.path, &bytes) {
        Ok(()) => Outcome::Finished {
            idx,
            duration: start.elapsed(),
        },
        Err(error) => Outcome::WriteFailed { idx, error },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

fn progress_bar(enabled: bool, total: usize) -> ProgressBar {
    if !enabled || total < 2 {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Execute every stale rule of `plan`.
pub fn execute(plan: &BuildPlan, opts: &ExecuteOptions) -> Result<ExecuteReport, ExecError> {
    let start = Instant::now();
    let graph = build_graph(plan)?;
    let total = plan.rules.len();

    let emit = |event: BuildEvent| {
        if let Some(sink) = &opts.events {
            sink(&event);
        }
    };

    let fingerprint_path = plan.work_dir.join(FINGERPRINT_FILE);
    let mut fingerprints = FingerprintCache::load(&fingerprint_path);
    let rule_fingerprints: Vec<String> = plan
        .rules
        .iter()
        .map(|r| action_fingerprint(&r.action.describe()))
        .collect();

    let num_workers = match opts.jobs {
        Some(0) | None => std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4),
        Some(n) => n,
    };
    tracing::debug!("Executing {} rule(s) on {} worker(s)", total, num_workers);

    let pb = progress_bar(opts.progress, total);

    let mut in_degree: Vec<usize> = graph.deps.iter().map(Vec::len).collect();
    let mut ready: Vec<usize> = (0..total).filter(|&i| in_degree[i] == 0).collect();
    ready.reverse();

    let mut report = ExecuteReport::default();
    let mut rebuilt: HashSet<usize> = HashSet::new();
    let mut failures: Vec<RuleFailure> = Vec::new();
    let mut first_error: Option<ExecError> = None;
    let mut dead: HashSet<usize> = HashSet::new();

    let (job_tx, job_rx) = mpsc::channel::<Job>();
    let (result_tx, result_rx) = mpsc::channel::<Outcome>();
    let job_rx = Mutex::new(job_rx);

    std::thread::scope(|s| {
        for _ in 0..num_workers.min(total.max(1)) {
            let tx = result_tx.clone();
            let job_rx = &job_rx;
            s.spawn(move || loop {
                let job = match job_rx.lock() {
                    Ok(rx) => match rx.recv() {
                        Ok(job) => job,
                        Err(_) => break,
                    },
                    Err(_) => break,
                };
                if tx.send(run_rule(plan, job.idx)).is_err() {
                    break;
                }
            });
        }
        drop(result_tx);

        let mut completed = 0usize;
        let mut in_flight = 0usize;
        let mut halted = false;

        let release = |idx: usize, ready: &mut Vec<usize>, in_degree: &mut Vec<usize>| {
            for &dep in &graph.dependents[idx] {
                in_degree[dep] -= 1;
                if in_degree[dep] == 0 {
                    ready.push(dep);
                }
            }
        };

        while completed < total {
            if !halted {
                while let Some(idx) = ready.pop() {
                    let rule = &plan.rules[idx];
                    let fresh = match is_fresh(
                        rule,
                        &graph.deps[idx],
                        &rebuilt,
                        &fingerprints,
                        &rule_fingerprints[idx],
                    ) {
                        Ok(fresh) => fresh,
                        Err(e) => {
                            tracing::debug!("Cannot check {}: {:#}", rule.target.rel_name, e);
                            false
                        }
                    };

                    if fresh {
                        tracing::debug!("Fresh: {}", rule.target.rel_name);
                        emit(BuildEvent::fresh(&rule.target.rel_name));
                        report.fresh.push(rule.target.rel_name.clone());
                        completed += 1;
                        pb.inc(1);
                        release(idx, &mut ready, &mut in_degree);
                        continue;
                    }

                    emit(BuildEvent::started(&rule.target.rel_name));
                    pb.set_message(rule.target.rel_name.clone());
                    if job_tx.send(Job { idx }).is_err() {
                        break;
                    }
                    in_flight += 1;
                }
            }

            if in_flight == 0 {
                break;
            }

            let Ok(outcome) = result_rx.recv() else {
                break;
            };
            in_flight -= 1;
            completed += 1;
            pb.inc(1);

            match outcome {
                Outcome::Finished { idx, duration } => {
                    let rule = &plan.rules[idx];
                    tracing::info!("Built {}", rule.target.rel_name);
                    emit(BuildEvent::finished_rule(
                        &rule.target.rel_name,
                        rule.target.path.clone(),
                        duration.as_millis() as u64,
                    ));
                    fingerprints.update(rule.target.path.clone(), rule_fingerprints[idx].clone());
                    rebuilt.insert(idx);
                    report.ran.push(rule.target.rel_name.clone());
                    release(idx, &mut ready, &mut in_degree);
                }
                Outcome::ActionFailed { idx, error } | Outcome::WriteFailed { idx, error }
                    if opts.keep_going =>
                {
                    let rule = &plan.rules[idx];
                    tracing::warn!("{} failed: {:#}", rule.target.rel_name, error);
                    emit(BuildEvent::failed(&rule.target.rel_name, format!("{:#}", error)));

                    let skipped: Vec<usize> = transitive_dependents(&graph.dependents, idx)
                        .into_iter()
                        .filter(|d| dead.insert(*d))
                        .collect();
                    for &dep in &skipped {
                        let name = &plan.rules[dep].target.rel_name;
                        emit(BuildEvent::failed(
                            name,
                            format!("prerequisite {} failed", rule.target.rel_name),
                        ));
                        report.skipped.push(name.clone());
                    }
                    completed += skipped.len();
                    pb.inc(skipped.len() as u64);

                    failures.push(RuleFailure {
                        target: rule.target.rel_name.clone(),
                        error,
                    });
                }
                Outcome::ActionFailed { idx, error } => {
                    let rule = &plan.rules[idx];
                    emit(BuildEvent::failed(&rule.target.rel_name, format!("{:#}", error)));
                    if first_error.is_none() {
                        first_error = Some(ExecError::RuleFailed {
                            target: rule.target.rel_name.clone(),
                            error,
                        });
                    }
                    halted = true;
                }
                Outcome::WriteFailed { idx, error } => {
                    let rule = &plan.rules[idx];
                    emit(BuildEvent::failed(&rule.target.rel_name, format!("{:#}", error)));
                    if first_error.is_none() {
                        first_error = Some(ExecError::Write {
                            path: rule.target.path.clone(),
                            error,
                        });
                    }
                    halted = true;
                }
            }
        }

        drop(job_tx);
    });

    pb.finish_and_clear();
    report.duration = start.elapsed();

    if !report.ran.is_empty() {
        fingerprints
            .save(&fingerprint_path)
            .context("failed to record action fingerprints")
            .map_err(ExecError::Io)?;
    }

    let success = first_error.is_none() && failures.is_empty();
    emit(BuildEvent::finished(
        success,
        report.duration.as_millis() as u64,
        report.ran.len() as u64,
        report.fresh.len() as u64,
    ));

    if let Some(err) = first_error {
        return Err(err);
    }
    if !failures.is_empty() {
        return Err(ExecError::Failures(failures));
    }

    tracing::info!(
        "Finished {} rule(s) ({} fresh) in {:.2}s",
        report.ran.len(),
        report.fresh.len(),
        report.duration.as_secs_f64()
    );
    Ok(report)
}

/// Every rule reachable from `idx` through dependent edges.
fn transitive_dependents(dependents: &[Vec<usize>], idx: usize) -> Vec<usize> {
    let mut seen = HashSet::new();
    let mut stack = dependents[idx].clone();
    let mut out = Vec::new();
    while let Some(next) = stack.pop() {
        if seen.insert(next) {
            out.push(next);
            stack.extend(dependents[next].iter().copied());
        }
    }
    out.sort_unstable();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tempfile::TempDir;

    use crate::builder::plan::{Prerequisite, Target};
    use crate::core::repository::RepositoryConfig;
    use crate::test_support::RecordingAction;

    struct Fixture {
        tmp: TempDir,
        rules: Vec<BuildRule>,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            fs::create_dir_all(tmp.path().join("src")).unwrap();
            Fixture {
                tmp,
                rules: Vec::new(),
            }
        }

        fn file(&self, name: &str) -> PathBuf {
            let path = self.tmp.path().join("src").join(name);
            fs::write(&path, name).unwrap();
            path
        }

        fn target(&self, name: &str) -> Target {
            Target {
                rel_name: name.to_string(),
                path: self.tmp.path().join("work").join(name),
            }
        }

        fn rule(&mut self, name: &str, prereqs: Vec<Prerequisite>, action: Arc<RecordingAction>) {
            self.rules.push(BuildRule {
                target: self.target(name),
                prerequisites: prereqs,
                action,
            });
        }

        fn plan(&self) -> BuildPlan {
            BuildPlan {
                root_dir: self.tmp.path().join("src"),
                work_dir: self.tmp.path().join("work"),
                build_dir: self.tmp.path().join("work"),
                commit_id: "c".to_string(),
                repo: Arc::new(RepositoryConfig::default()),
                rules: self.rules.clone(),
            }
        }
    }

    fn opts() -> ExecuteOptions {
        ExecuteOptions {
            jobs: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn test_render() {
        let mut fx = Fixture::new();
        let input = fx.file("a.go");
        fx.rule("a.json", vec![Prerequisite::File(input.clone())], RecordingAction::ok("echo a"));

        let out = render(&fx.plan());
        let expected = format!(
            "{}: {}\n\techo a\n\n",
            fx.target("a.json").path.display(),
            input.display()
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_dependency_order_and_inputs() {
        let mut fx = Fixture::new();
        let input = fx.file("a.go");
        let a = RecordingAction::ok("a");
        let b = RecordingAction::ok("b");
        let a_target = fx.target("a.json").path;
        fx.rule("a.json", vec![Prerequisite::File(input)], a.clone());
        fx.rule("b.json", vec![Prerequisite::Rule(a_target.clone())], b.clone());

        let report = execute(&fx.plan(), &opts()).unwrap();

        assert_eq!(report.ran, vec!["a.json", "b.json"]);
        assert_eq!(fs::read_to_string(&a_target).unwrap(), "a");
        assert_eq!(b.last_inputs(), vec![a_target]);
    }

    #[test]
    fn test_fresh_rules_skipped() {
        let mut fx = Fixture::new();
        let input = fx.file("a.go");
        let a = RecordingAction::ok("a");
        fx.rule("a.json", vec![Prerequisite::File(input)], a.clone());

        execute(&fx.plan(), &opts()).unwrap();
        let report = execute(&fx.plan(), &opts()).unwrap();

        assert_eq!(a.runs.load(Ordering::SeqCst), 1);
        assert_eq!(report.fresh, vec!["a.json"]);
        assert!(report.ran.is_empty());
    }

    #[test]
    fn test_newer_prerequisite_reruns() {
        let mut fx = Fixture::new();
        let input = fx.file("a.go");
        let a = RecordingAction::ok("a");
        fx.rule("a.json", vec![Prerequisite::File(input.clone())], a.clone());

        execute(&fx.plan(), &opts()).unwrap();

        let target = fx.target("a.json").path;
        let old = fs::metadata(&target).unwrap().modified().unwrap();
        let file = fs::File::options().write(true).open(&input).unwrap();
        file.set_modified(old + Duration::from_secs(10)).unwrap();

        execute(&fx.plan(), &opts()).unwrap();
        assert_eq!(a.runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_rerun_prerequisite_reruns_dependents() {
        let mut fx = Fixture::new();
        let input = fx.file("a.go");
        let a = RecordingAction::ok("a");
        let b = RecordingAction::ok("b");
        let a_target = fx.target("a.json").path;
        fx.rule("a.json", vec![Prerequisite::File(input)], a.clone());
        fx.rule("b.json", vec![Prerequisite::Rule(a_target.clone())], b.clone());

        execute(&fx.plan(), &opts()).unwrap();
        fs::remove_file(&a_target).unwrap();
        execute(&fx.plan(), &opts()).unwrap();

        assert_eq!(a.runs.load(Ordering::SeqCst), 2);
        assert_eq!(b.runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_changed_action_reruns() {
        let mut fx = Fixture::new();
        let input = fx.file("a.go");
        fx.rule("a.json", vec![Prerequisite::File(input.clone())], RecordingAction::ok("v1"));
        execute(&fx.plan(), &opts()).unwrap();

        let mut fx2 = Fixture { tmp: fx.tmp, rules: Vec::new() };
        let v2 = RecordingAction::ok("v2");
        fx2.rule("a.json", vec![Prerequisite::File(input)], v2.clone());
        execute(&fx2.plan(), &opts()).unwrap();

        assert_eq!(v2.runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_leaves_no_target() {
        let mut fx = Fixture::new();
        let input = fx.file("a.go");
        fx.rule("a.json", vec![Prerequisite::File(input)], RecordingAction::failing("boom"));

        let err = execute(&fx.plan(), &opts()).unwrap_err();
        assert!(matches!(err, ExecError::RuleFailed { ref target, .. } if target == "a.json"));
        assert!(err.to_string().contains("boom"));
        assert!(!fx.target("a.json").path.exists());
    }

    #[test]
    fn test_failure_keeps_previous_target() {
        let mut fx = Fixture::new();
        let input = fx.file("a.go");
        fx.rule("a.json", vec![Prerequisite::File(input.clone())], RecordingAction::ok("good"));
        execute(&fx.plan(), &opts()).unwrap();

        let mut fx2 = Fixture { tmp: fx.tmp, rules: Vec::new() };
        fx2.rule("a.json", vec![Prerequisite::File(input)], RecordingAction::failing("bad"));
        assert!(execute(&fx2.plan(), &opts()).is_err());
        assert_eq!(fs::read_to_string(fx2.target("a.json").path).unwrap(), "good");
    }

    #[test]
    fn test_panicking_action_is_a_rule_failure() {
        let mut fx = Fixture::new();
        let input = fx.file("a.go");
        let c = RecordingAction::ok("c");
        fx.rule("a.json", vec![Prerequisite::File(input.clone())], RecordingAction::panicking("kaboom"));
        fx.rule("c.json", vec![Prerequisite::File(input)], c.clone());

        let opts = ExecuteOptions {
            jobs: Some(1),
            keep_going: true,
            ..Default::default()
        };
        let err = execute(&fx.plan(), &opts).unwrap_err();
        match err {
            ExecError::Failures(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].target, "a.json");
                assert!(format!("{:#}", failures[0].error).contains("kaboom"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(c.runs.load(Ordering::SeqCst), 1);
        assert!(!fx.target("a.json").path.exists());
    }

    #[test]
    fn test_halt_on_first_failure() {
        let mut fx = Fixture::new();
        let input = fx.file("a.go");
        let a_target = fx.target("a.json").path;
        let b = RecordingAction::ok("b");
        fx.rule("a.json", vec![Prerequisite::File(input)], RecordingAction::failing("boom"));
        fx.rule("b.json", vec![Prerequisite::Rule(a_target)], b.clone());

        assert!(execute(&fx.plan(), &ExecuteOptions { jobs: Some(1), ..Default::default() }).is_err());
        assert_eq!(b.runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_keep_going_skips_only_dependents() {
        let mut fx = Fixture::new();
        let input = fx.file("a.go");
        let a_target = fx.target("a.json").path;
        let b = RecordingAction::ok("b");
        let c = RecordingAction::ok("c");
        fx.rule("a.json", vec![Prerequisite::File(input.clone())], RecordingAction::failing("boom"));
        fx.rule("b.json", vec![Prerequisite::Rule(a_target)], b.clone());
        fx.rule("c.json", vec![Prerequisite::File(input)], c.clone());

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink_events = events.clone();
        let opts = ExecuteOptions {
            jobs: Some(2),
            keep_going: true,
            events: Some(Arc::new(move |e: &BuildEvent| {
                sink_events.lock().unwrap().push(e.clone())
            })),
            progress: false,
        };

        let err = execute(&fx.plan(), &opts).unwrap_err();
        match err {
            ExecError::Failures(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].target, "a.json");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(b.runs.load(Ordering::SeqCst), 0);
        assert_eq!(c.runs.load(Ordering::SeqCst), 1);

        let events = events.lock().unwrap();
        assert!(events.contains(&BuildEvent::failed("b.json", "prerequisite a.json failed")));
        assert!(matches!(
            events.last(),
            Some(BuildEvent::BuildFinished { success: false, .. })
        ));
    }

    #[test]
    fn test_missing_prerequisite() {
        let mut fx = Fixture::new();
        let missing = fx.tmp.path().join("src/missing.go");
        fx.rule("a.json", vec![Prerequisite::File(missing.clone())], RecordingAction::ok("a"));

        let err = execute(&fx.plan(), &opts()).unwrap_err();
        assert!(matches!(err, ExecError::MissingPrerequisite { prerequisite, .. } if prerequisite == missing));
    }

    #[test]
    fn test_cycle_detected() {
        let mut fx = Fixture::new();
        let a_target = fx.target("a.json").path;
        let b_target = fx.target("b.json").path;
        fx.rule("a.json", vec![Prerequisite::Rule(b_target)], RecordingAction::ok("a"));
        fx.rule("b.json", vec![Prerequisite::Rule(a_target)], RecordingAction::ok("b"));

        let err = execute(&fx.plan(), &opts()).unwrap_err();
        assert!(matches!(err, ExecError::Cycle { .. }));
    }

    #[test]
    fn test_independent_rules_run_in_parallel() {
        let mut fx = Fixture::new();
        let input = fx.file("a.go");
        for i in 0..8 {
            fx.rule(
                &format!("r{}.json", i),
                vec![Prerequisite::File(input.clone())],
                RecordingAction::ok(&format!("r{}", i)),
            );
        }

        let report = execute(&fx.plan(), &ExecuteOptions { jobs: Some(4), ..Default::default() })
            .unwrap();
        assert_eq!(report.ran.len(), 8);
        for i in 0..8 {
            assert!(fx.target(&format!("r{}.json", i)).path.exists());
        }
    }
}

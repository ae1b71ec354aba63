//! `srcgraph list-deps`, `resolve-deps` and `graph` commands

use std::collections::BTreeMap;

use anyhow::Result;

use crate::cli::UnitArgs;
use srcgraph::ops::{graph as graph_unit, list_deps, resolve_deps, scan, select_units};

pub fn list(args: UnitArgs, verbose: bool) -> Result<()> {
    let (ctx, checkout, env) = super::setup(&args.repo, verbose)?;
    let repo = scan(&checkout, &env, ctx.config())?;

    let mut out = BTreeMap::new();
    for unit in select_units(&repo, &args.units)? {
        out.insert(unit.id(), list_deps(&checkout, &env, &repo, unit)?);
    }
    super::print_json(&out)
}

pub fn resolve(args: UnitArgs, verbose: bool) -> Result<()> {
    let (ctx, checkout, env) = super::setup(&args.repo, verbose)?;
    let repo = scan(&checkout, &env, ctx.config())?;

    let mut out = BTreeMap::new();
    for unit in select_units(&repo, &args.units)? {
        out.insert(unit.id(), resolve_deps(&checkout, &env, &repo, unit)?);
    }
    super::print_json(&out)
}

pub fn graph(args: UnitArgs, verbose: bool) -> Result<()> {
    let (ctx, checkout, env) = super::setup(&args.repo, verbose)?;
    let repo = scan(&checkout, &env, ctx.config())?;

    let mut out = BTreeMap::new();
    for unit in select_units(&repo, &args.units)? {
        out.insert(unit.id(), graph_unit(&checkout, &env, &repo, unit)?);
    }
    super::print_json(&out)
}

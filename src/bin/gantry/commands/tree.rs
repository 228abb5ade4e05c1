//! `gantry tree` command

use std::collections::HashSet;

use anyhow::Result;

use gantry::core::module_id::ModuleId;
use gantry::ops::resolve_project;
use gantry::resolver::{DepKind, ModuleGraph};
use gantry::util::GlobalContext;

use crate::cli::TreeArgs;
use crate::commands::{diagnose_resolve, load_project, target_context};

pub fn execute(args: TreeArgs, color: bool) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let project = load_project(&ctx)?;
    let target = target_context(&args.target);

    let resolved =
        resolve_project(&project, &target).map_err(|e| diagnose_resolve(e, color))?;
    let graph = &resolved.graph;

    let roots: Vec<ModuleId> = match args.module {
        Some(ref name) => {
            let id = ModuleId::new(name.as_str());
            if !graph.contains(id) {
                anyhow::bail!(
                    "module `{}` not found\nhelp: Run `gantry tree` to see all discovered modules",
                    name
                );
            }
            vec![id]
        }
        // No module given: start from modules nothing depends on
        None => graph
            .descriptors()
            .map(|d| d.name())
            .filter(|&id| graph.dependents(id).is_empty())
            .collect(),
    };

    let max_depth = args.depth.unwrap_or(usize::MAX);
    for root in roots {
        let mut seen = HashSet::new();
        print_tree(graph, root, None, 0, max_depth, &mut seen);
    }

    Ok(())
}

fn print_tree(
    graph: &ModuleGraph,
    id: ModuleId,
    edge: Option<&str>,
    depth: usize,
    max_depth: usize,
    seen: &mut HashSet<ModuleId>,
) {
    if depth > max_depth {
        return;
    }

    let is_duplicate = !seen.insert(id);

    let prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}├── ", "│   ".repeat(depth - 1))
    };
    let edge_marker = edge.map(|e| format!(" ({})", e)).unwrap_or_default();
    let dup_marker = if is_duplicate { " (*)" } else { "" };

    println!("{}{}{}{}", prefix, id, edge_marker, dup_marker);

    if is_duplicate {
        return;
    }

    for (dep, kind) in graph.deps_with_kind(id) {
        let marker = match kind {
            DepKind::Public => "public",
            DepKind::Private => "private",
        };
        print_tree(graph, dep, Some(marker), depth + 1, max_depth, seen);
    }
}

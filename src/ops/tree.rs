//! Implementation of `bru tree`.

use anyhow::Result;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::core::{Catalog, ProjectManifest, Workspace};
use crate::resolver::{Decision, Resolution, Resolver};
use crate::util::GlobalContext;

/// Resolve the project manifest against the catalog without acquiring
/// anything.
pub fn resolve_project(ctx: &GlobalContext) -> Result<Resolution> {
    let catalog = Catalog::new(ctx.catalog_dir());
    let workspace = Workspace::new(ctx.cwd());
    let manifest_path = workspace.project_manifest()?;
    let manifest = ProjectManifest::load(&manifest_path)?;

    let root = manifest_path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    let resolver = Resolver::new(&catalog);
    resolver.resolve(&root, &manifest.dependencies)
}

/// Render the first-requestor tree followed by any version conflicts.
pub fn render_tree(resolution: &Resolution) -> String {
    let (graph, root) = resolution.requestor_graph();
    let mut out = String::new();
    out.push_str(&graph[root]);
    out.push('\n');
    render_children(&graph, root, "", &mut out);

    if !resolution.conflicts().is_empty() {
        out.push_str("\nversion conflicts:\n");
        for conflict in resolution.conflicts() {
            let kept = match conflict.decision {
                Decision::Keep => &conflict.resolved_version,
                Decision::Replace => &conflict.requested_version,
            };
            out.push_str(&format!(
                "  {}: v{} (by {}) vs v{} (by {}), using v{}\n",
                conflict.module,
                conflict.resolved_version,
                conflict.resolved_requestor,
                conflict.requested_version,
                conflict.requestor,
                kept
            ));
        }
    }
    out
}

fn render_children(graph: &DiGraph<String, ()>, node: NodeIndex, prefix: &str, out: &mut String) {
    let mut children: Vec<_> = graph.neighbors_directed(node, Direction::Outgoing).collect();
    // Neighbors come back newest first.
    children.sort();

    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&graph[*child]);
        out.push('\n');

        let nested = format!("{}{}", prefix, if last { "    " } else { "│   " });
        render_children(graph, *child, &nested, out);
    }
}

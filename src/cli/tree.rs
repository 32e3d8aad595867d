//! Display dependency trees for project modules.
//!
//! The `tree` command resolves a module's dependency graph through the
//! project's [`DependencyResolver`](crate::resolver::DependencyResolver) and
//! renders it hierarchically, similar to `cargo tree`. Modules already
//! expanded elsewhere in the tree are marked with `(*)` instead of being
//! re-expanded, so cyclic graphs print as finite trees.
//!
//! # Output Format
//!
//! ```text
//! frontend/entrypoint.ts
//! ├── frontend/pages/index.ts
//! │   └── common/theme.ts
//! └── frontend/nav.ts
//!     └── common/theme.ts (*)
//!
//! (*) = already expanded above
//! ```

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::manifest::{Manifest, ProjectLayout, find_manifest};
use crate::resolver::{DependencyGraph, DependencyResolver, DependencyTree, ModuleId};
use crate::utils::normalize_path;

/// Command to display a module's dependency tree.
#[derive(Args, Debug)]
pub struct TreeCommand {
    /// Module to resolve, relative to the current directory
    file: PathBuf,

    /// Maximum depth to display (unlimited if not specified)
    #[arg(short = 'd', long)]
    depth: Option<usize>,

    /// Output format (tree, json, text)
    #[arg(short = 'f', long, default_value = "tree")]
    format: String,

    /// List modules reached from more than one place instead of the tree
    #[arg(long)]
    duplicates: bool,
}

impl TreeCommand {
    /// Resolves the module graph and prints it.
    ///
    /// # Errors
    ///
    /// Fails when no manifest can be located, the manifest or its import map
    /// is invalid, or a configured app directory is missing.
    pub async fn execute(self, manifest_path: Option<PathBuf>) -> Result<()> {
        let manifest_path = match manifest_path {
            Some(path) => path,
            None => {
                let cwd = env::current_dir().context("cannot determine current directory")?;
                find_manifest(&cwd)?
            }
        };
        let manifest = Manifest::load(&manifest_path)?;
        let root = manifest_path
            .parent()
            .context("manifest path has no parent directory")?
            .to_path_buf();

        let layout = ProjectLayout::new(&manifest.app, &root);
        layout.validate()?;

        let resolver = DependencyResolver::from_manifest(&manifest, &root)?;

        let file = if self.file.is_absolute() {
            self.file.clone()
        } else {
            normalize_path(&root.join(&self.file))
        };
        let entry = ModuleId::from_path(&file);

        let tree = resolver
            .load_dependency_list(&entry)
            .await
            .context("no dependency information could be resolved")?;

        if self.duplicates {
            self.print_duplicates(&resolver);
            return Ok(());
        }

        match self.format.as_str() {
            "json" => println!("{}", serde_json::to_string_pretty(&tree)?),
            "text" => print!("{}", render_text(&resolver.display_key(&entry), &tree, self.depth)),
            _ => print!("{}", render_tree(&resolver.display_key(&entry), &tree, self.depth)),
        }
        Ok(())
    }

    fn print_duplicates(&self, resolver: &DependencyResolver) {
        let graph = DependencyGraph::from_cache(resolver.cache());
        let shared = graph.shared_modules();
        if shared.is_empty() {
            println!("No shared modules found");
            return;
        }
        println!("{}", "Shared modules (reached from more than one place):".bold());
        for module in shared {
            println!("  {}", resolver.display_key(&module));
        }
    }
}

/// Renders the box-drawing tree format.
fn render_tree(root: &str, tree: &DependencyTree, depth: Option<usize>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", root.bold()));
    let mut has_marks = false;
    render_branches(tree, "", depth, 0, &mut out, &mut has_marks);
    if has_marks {
        out.push_str("\n(*) = already expanded above\n");
    }
    out
}

fn render_branches(
    tree: &DependencyTree,
    prefix: &str,
    depth: Option<usize>,
    level: usize,
    out: &mut String,
    has_marks: &mut bool,
) {
    if depth.is_some_and(|d| level >= d) {
        return;
    }
    let count = tree.0.len();
    for (index, (name, child)) in tree.0.iter().enumerate() {
        let last = index + 1 == count;
        let connector = if last { "└── " } else { "├── " };
        match child {
            Some(subtree) => {
                out.push_str(&format!("{prefix}{connector}{name}\n"));
                let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
                render_branches(subtree, &child_prefix, depth, level + 1, out, has_marks);
            }
            None => {
                *has_marks = true;
                out.push_str(&format!("{prefix}{connector}{name} {}\n", "(*)".dimmed()));
            }
        }
    }
}

/// Renders the plain indented text format.
fn render_text(root: &str, tree: &DependencyTree, depth: Option<usize>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{root}\n"));
    render_text_level(tree, 1, depth, &mut out);
    out
}

fn render_text_level(tree: &DependencyTree, level: usize, depth: Option<usize>, out: &mut String) {
    if depth.is_some_and(|d| level > d) {
        return;
    }
    for (name, child) in &tree.0 {
        out.push_str(&format!("{}{name}\n", "  ".repeat(level)));
        if let Some(subtree) = child {
            render_text_level(subtree, level + 1, depth, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn leaf() -> Option<DependencyTree> {
        Some(DependencyTree(BTreeMap::new()))
    }

    fn sample() -> DependencyTree {
        let mut inner = BTreeMap::new();
        inner.insert("common/theme.ts".to_string(), leaf());
        let mut top = BTreeMap::new();
        top.insert("frontend/nav.ts".to_string(), Some(DependencyTree(inner)));
        top.insert("common/theme.ts".to_string(), None);
        DependencyTree(top)
    }

    #[test]
    fn tree_format_marks_revisits() {
        colored::control::set_override(false);
        let rendered = render_tree("frontend/entrypoint.ts", &sample(), None);
        assert!(rendered.contains("├── common/theme.ts (*)"));
        assert!(rendered.contains("└── frontend/nav.ts"));
        assert!(rendered.contains("    └── common/theme.ts"));
        assert!(rendered.contains("(*) = already expanded above"));
    }

    #[test]
    fn depth_limits_rendering() {
        colored::control::set_override(false);
        let rendered = render_tree("root", &sample(), Some(1));
        assert!(rendered.contains("frontend/nav.ts"));
        assert!(!rendered.contains("    └── common/theme.ts"));
    }

    #[test]
    fn text_format_indents() {
        let rendered = render_text("root", &sample(), None);
        assert!(rendered.contains("\n  frontend/nav.ts\n"));
        assert!(rendered.contains("\n    common/theme.ts\n"));
    }
}

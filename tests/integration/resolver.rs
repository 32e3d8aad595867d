//! Dependency resolution over real on-disk projects.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use weft::manifest::Manifest;
use weft::resolver::{DependencyResolver, ModuleId};
use weft::test_utils::init_test_logging;

/// Writes a small fullstack project: frontend entrypoint importing pages and
/// shared code, a backend module leaking into the frontend graph, and an
/// exposed backend module that legitimately crosses over.
fn write_project(root: &Path) {
    fs::create_dir_all(root.join("frontend/pages")).unwrap();
    fs::create_dir_all(root.join("backend")).unwrap();
    fs::create_dir_all(root.join("common")).unwrap();

    fs::write(
        root.join("weft.toml"),
        r#"
[app]
name = "demo"
expose_backend = ["backend/api.ts"]
import_map = "importmap.json"
"#,
    )
    .unwrap();
    fs::write(
        root.join("importmap.json"),
        r#"{"imports": {"theme": "./common/theme.ts"}}"#,
    )
    .unwrap();

    fs::write(
        root.join("frontend/entrypoint.ts"),
        r#"
import { IndexPage } from "./pages/index.ts";
import { api } from "../backend/api.ts";
import { secrets } from "../backend/secrets.ts";
import theme from "theme";
import type { Config } from "./config.ts";
"#,
    )
    .unwrap();
    fs::write(
        root.join("frontend/pages/index.ts"),
        r#"
import { format } from "../../common/util.ts";
export class IndexPage {}
"#,
    )
    .unwrap();
    fs::write(root.join("common/util.ts"), "export function format() {}\n").unwrap();
    fs::write(root.join("common/theme.ts"), "export default {};\n").unwrap();
    fs::write(root.join("backend/api.ts"), "export const api = {};\n").unwrap();
    fs::write(root.join("backend/secrets.ts"), "export const secrets = {};\n").unwrap();
}

fn module(root: &Path, rel: &str) -> ModuleId {
    ModuleId::from_path(&root.join(rel))
}

#[tokio::test]
async fn resolves_project_graph_with_backend_guard() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_project(root);

    let manifest = Manifest::load(&root.join("weft.toml")).unwrap();
    let resolver = DependencyResolver::from_manifest(&manifest, root).unwrap();

    let deps = resolver.resolve(&module(root, "frontend/entrypoint.ts")).await;

    assert!(deps.contains(&module(root, "frontend/pages/index.ts")));
    assert!(deps.contains(&module(root, "common/util.ts")), "transitive module ships");
    assert!(deps.contains(&module(root, "common/theme.ts")), "import map resolved");
    assert!(deps.contains(&module(root, "backend/api.ts")), "exposed backend module ships");
    assert!(
        !deps.contains(&module(root, "backend/secrets.ts")),
        "non-exposed backend module must not leak into the frontend graph"
    );
    assert!(
        !deps.contains(&module(root, "frontend/config.ts")),
        "type-only import carries no runtime dependency"
    );
}

#[tokio::test]
async fn dependency_tree_uses_root_relative_keys() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_project(root);

    let manifest = Manifest::load(&root.join("weft.toml")).unwrap();
    let resolver = DependencyResolver::from_manifest(&manifest, root).unwrap();

    let tree = resolver
        .load_dependency_list(&module(root, "frontend/entrypoint.ts"))
        .await
        .expect("entrypoint resolution is recorded");

    assert!(tree.0.contains_key("frontend/pages/index.ts"));
    let page = tree.0["frontend/pages/index.ts"].as_ref().unwrap();
    assert!(page.0.contains_key("common/util.ts"));
}

#[tokio::test]
async fn repeated_resolution_does_not_rescan() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_project(root);

    let manifest = Manifest::load(&root.join("weft.toml")).unwrap();
    let resolver = DependencyResolver::from_manifest(&manifest, root).unwrap();
    let entry = module(root, "frontend/entrypoint.ts");

    resolver.resolve(&entry).await;
    let scans = resolver.scan_count();
    resolver.resolve(&entry).await;
    assert_eq!(resolver.scan_count(), scans);
}

#[tokio::test]
async fn cyclic_modules_on_disk_terminate() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("frontend")).unwrap();
    fs::create_dir_all(root.join("backend")).unwrap();
    fs::create_dir_all(root.join("common")).unwrap();
    fs::write(root.join("weft.toml"), "[app]\n").unwrap();
    fs::write(root.join("frontend/a.ts"), r#"import "./b.ts";"#).unwrap();
    fs::write(root.join("frontend/b.ts"), r#"import "./a.ts";"#).unwrap();

    let manifest = Manifest::load(&root.join("weft.toml")).unwrap();
    let resolver = DependencyResolver::from_manifest(&manifest, root).unwrap();

    let tree = resolver
        .load_dependency_list(&module(root, "frontend/a.ts"))
        .await
        .expect("cyclic graph still yields a tree");

    // the re-entry edge materializes as a leaf, not an infinite expansion
    let b = tree.0["frontend/b.ts"].as_ref().unwrap();
    assert!(b.0["frontend/a.ts"].is_none());
}

#[tokio::test]
async fn missing_module_degrades_to_empty_set() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("frontend")).unwrap();
    fs::create_dir_all(root.join("backend")).unwrap();
    fs::create_dir_all(root.join("common")).unwrap();
    fs::write(root.join("weft.toml"), "[app]\n").unwrap();
    fs::write(root.join("frontend/a.ts"), r#"import "./gone.ts";"#).unwrap();

    let manifest = Manifest::load(&root.join("weft.toml")).unwrap();
    let resolver = DependencyResolver::from_manifest(&manifest, root).unwrap();

    let deps = resolver.resolve(&module(root, "frontend/a.ts")).await;
    assert!(deps.contains(&module(root, "frontend/gone.ts")));
    let gone = resolver.cache().get(&module(root, "frontend/gone.ts")).unwrap();
    assert!(gone.is_empty(), "unreadable module resolves to an empty cached set");
}

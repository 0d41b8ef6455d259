use mmake_core::{CancellationToken, MmakeError, Query, Workspace, WORKSPACE_FILE};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write `contents` to `rel` under `root`, creating parent directories
fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// A small workspace with a root Makefile and a few nested packages
fn create_test_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    Workspace::init(root).unwrap();
    write(root, "Makefile", "all:\n\t@echo root\n");
    write(
        root,
        "services/api/Makefile",
        "# API service\nbuild:\n\t# Compile the API server\n\t@echo build\n\ntest:\n\t@echo test\n",
    );
    write(root, "services/web/Makefile", "build:\n\t@echo web\n");
    write(root, "tools/lint/config/Makefile", "check:\n\t@echo lint\n");
    write(root, "services/api/node_modules/x/Makefile", "hidden:\n");

    dir
}

fn discover(dir: &TempDir) -> Workspace {
    Workspace::discover(&CancellationToken::noop(), &dir.path().join("services")).unwrap()
}

#[test]
fn test_discover_from_subdirectory() {
    let dir = create_test_workspace();
    let ws = discover(&dir);
    assert_eq!(ws.root(), dir.path().canonicalize().unwrap());
    assert_eq!(ws.marker_path(), ws.root().join(WORKSPACE_FILE));
    assert_eq!(ws.config().completion.depth, 2);
}

#[test]
fn test_no_workspace() {
    let dir = TempDir::new().unwrap();
    let err = Workspace::discover(&CancellationToken::noop(), dir.path()).unwrap_err();
    assert!(matches!(err, MmakeError::NoWorkspace { .. }));
}

#[test]
fn test_init_twice_fails() {
    let dir = create_test_workspace();
    assert!(matches!(
        Workspace::init(dir.path()),
        Err(MmakeError::ConfigExists(_))
    ));
}

#[test]
fn test_scan_and_complete() {
    let dir = create_test_workspace();
    let ws = discover(&dir);
    let cancel = CancellationToken::noop();

    let mut query = Query::new(&ws, "//");
    query.update(&cancel, 0).unwrap();
    assert_eq!(query.files().len(), 4);
    assert_eq!(query.completions("//t").unwrap(), vec!["//tools/lint/config"]);
    assert_eq!(
        query.gen_comp("//").unwrap(),
        "//\n//tools/\n//services/\n//:all\n"
    );

    let mut query = Query::new(&ws, "//services/");
    query.update(&cancel, 2).unwrap();
    assert_eq!(
        query.completions("//services/").unwrap(),
        vec!["//services/api", "//services/web"]
    );

    let mut query = Query::new(&ws, "//services/api:");
    query.update(&cancel, 2).unwrap();
    assert_eq!(
        query.completions("//services/api:").unwrap(),
        vec!["//services/api:build", "//services/api:test"]
    );
    assert_eq!(
        query.completions("//services/api:te").unwrap(),
        vec!["//services/api:test"]
    );
}

#[test]
fn test_query_files_by_prefix() {
    let dir = create_test_workspace();
    let ws = discover(&dir);
    let mut query = Query::new(&ws, "");
    query.update(&CancellationToken::noop(), 0).unwrap();

    let labels: Vec<String> = query
        .query_files_by_prefix("//services/")
        .unwrap()
        .iter()
        .map(|f| f.label.to_string())
        .collect();
    assert_eq!(labels, vec!["//services/api", "//services/web"]);

    let api = query.file_by_label("//services/api").unwrap();
    assert_eq!(api.description.as_deref(), Some("# API service"));
}

#[test]
fn test_resolve_and_info() {
    let dir = create_test_workspace();
    let ws = discover(&dir);
    let cancel = CancellationToken::noop();

    let resolved = ws.resolve(&cancel, "//services/api:build").unwrap();
    assert_eq!(resolved.build_file, ws.root().join("services/api/Makefile"));
    assert_eq!(resolved.target, "build");

    // Target defaults to the package's last path segment
    assert_eq!(ws.resolve(&cancel, "//tools/lint").unwrap().target, "lint");

    assert_eq!(
        ws.info(&cancel, "//services/api:build").unwrap(),
        "# Compile the API server"
    );
    assert_eq!(ws.info(&cancel, "//services/api:test").unwrap(), "@echo test");
    assert_eq!(ws.info(&cancel, "//").unwrap(), "@echo root");

    assert!(matches!(
        ws.info(&cancel, "//services/api:deploy"),
        Err(MmakeError::TargetNotFound { .. })
    ));
    assert!(matches!(
        ws.resolve(&cancel, "//services/nope:build"),
        Err(MmakeError::NoBuildFile { .. })
    ));
}

#[cfg(unix)]
#[test]
fn test_import_then_info() {
    let dir = create_test_workspace();
    // Delegate to `true` so the test does not depend on make being installed
    fs::write(dir.path().join(WORKSPACE_FILE), "[make]\nprogram = \"true\"\n").unwrap();
    let ws = discover(&dir);
    let cancel = CancellationToken::noop();

    ws.import(&cancel, "//scripts/hello:greet", "true").unwrap();
    let makefile = ws.root().join("scripts/hello/Makefile");
    assert!(makefile.is_file());
    assert_eq!(ws.info(&cancel, "//scripts/hello:greet").unwrap(), "true");

    assert!(matches!(
        ws.import(&cancel, "//scripts/hello:greet", "true"),
        Err(MmakeError::TargetExists { .. })
    ));
}

#[test]
fn test_output_dirs_and_clean() {
    let dir = create_test_workspace();
    let ws = discover(&dir);
    ws.init_output_dir().unwrap();
    assert!(ws.out_root().is_dir());

    let build_file = ws
        .build_file_for(&CancellationToken::noop(), "//services/api")
        .unwrap();
    let env = ws.env_for(&build_file).unwrap();
    let out_path = ws.out_root().join("services/api");
    assert!(env.contains(&("MM_OUT_PATH", out_path.clone())));
    assert!(out_path.is_dir());

    let removed = ws.clean("//services/api:build").unwrap();
    assert_eq!(removed, out_path);
    assert!(!out_path.exists());
    // Cleaning again is a no-op
    ws.clean("//services/api").unwrap();
}

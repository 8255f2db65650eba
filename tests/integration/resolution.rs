use extenv::core::{ExtenvError, user_friendly_error};
use extenv::manifest::ExtensionRequirement;
use extenv::test_utils::ArchiveFixture;

use crate::helpers::Workspace;

#[test]
fn test_cycle_between_providers() {
    let ws = Workspace::new();
    let a = ws.extension(ArchiveFixture::new("a.jar").provides("y", None).requires("x", None));
    let b = ws.extension(ArchiveFixture::new("b.jar").provides("x", None).requires("y", None));
    let manager = ws.manager();

    match manager.get_environment(&a).unwrap_err() {
        ExtenvError::CycleDetected {
            artifact,
            chain,
        } => {
            assert_eq!(&artifact, a.id());
            assert_eq!(chain, vec![a.id().clone(), b.id().clone(), a.id().clone()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(manager.cache().is_empty());

    // Starting from the other end closes the cycle at that end
    match manager.get_environment(&b).unwrap_err() {
        ExtenvError::CycleDetected {
            artifact,
            ..
        } => assert_eq!(&artifact, b.id()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unsatisfied_extension_names_artifact_and_requirement() {
    let ws = Workspace::new();
    let a = ws.plugin(ArchiveFixture::new("a.jar").requires("missing", None));
    let manager = ws.manager();

    let err = manager.get_environment(&a).unwrap_err();
    match &err {
        ExtenvError::UnsatisfiedExtension {
            artifact,
            requirement,
        } => {
            assert_eq!(artifact, a.id());
            assert_eq!(requirement, &ExtensionRequirement::new("missing"));
        }
        other => panic!("unexpected error: {other}"),
    }

    let ctx = user_friendly_error(err.into());
    assert!(ctx.error.to_string().contains("a.jar"));
    assert!(ctx.error.to_string().contains("'missing'"));
}

#[test]
fn test_unsatisfied_deep_in_the_tree() {
    let ws = Workspace::new();
    let util = ws.extension(ArchiveFixture::new("util.jar").provides("util", None).requires("gone", Some("2.0")));
    ws.extension(ArchiveFixture::new("xml.jar").provides("xml", None).requires("util", None));
    let task = ws.plugin(ArchiveFixture::new("task.jar").requires("xml", None));
    let manager = ws.manager();

    match manager.get_environment(&task).unwrap_err() {
        ExtenvError::UnsatisfiedExtension {
            artifact,
            requirement,
        } => {
            assert_eq!(&artifact, util.id());
            assert_eq!(requirement, ExtensionRequirement::with_version("gone", "2.0"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_version_token_selects_provider() {
    let ws = Workspace::new();
    ws.extension(ArchiveFixture::new("xml-1.0.jar").provides("xml", Some("1.0")));
    let newer = ws.extension(ArchiveFixture::new("xml-1.4.jar").provides("xml", Some("1.4")));
    let old_ok = ws.plugin(ArchiveFixture::new("old.jar").requires("xml", Some("1.0")));
    let too_new = ws.plugin(ArchiveFixture::new("new.jar").requires("xml", Some("2.0")));
    let manager = ws.manager();

    assert_eq!(manager.resolve_providers(&old_ok).unwrap(), vec![newer]);
    assert!(matches!(manager.get_environment(&too_new), Err(ExtenvError::UnsatisfiedExtension { .. })));
}

#[test]
fn test_optional_extensions() {
    let ws = Workspace::new();
    let tools = ws.extension(ArchiveFixture::new("tools.jar").provides("tools", None));
    let a = ws.plugin(ArchiveFixture::new("a.jar").optional("tools", None).optional("absent", None));
    let manager = ws.manager();

    let env = manager.get_environment(&a).unwrap();
    assert_eq!(env.parents().len(), 2);
    assert_eq!(env.parents()[1].artifacts(), &[tools]);
}

#[test]
fn test_malformed_manifest() {
    let ws = Workspace::new();
    let a = ws.plugin(ArchiveFixture::new("a.jar").raw_manifest("Extension-List: x\n continued\nnot a header\n"));
    let manager = ws.manager();

    let err = manager.get_environment(&a).unwrap_err();
    assert!(matches!(err, ExtenvError::MalformedMetadata { .. }));
}

#[test]
fn test_dependency_graph_tree() {
    let ws = Workspace::new();
    ws.extension(ArchiveFixture::new("util.jar").provides("util", None));
    ws.extension(ArchiveFixture::new("xml.jar").provides("xml", None).requires("util", None));
    ws.extension(ArchiveFixture::new("tools.jar").provides("tools", None).requires("util", None));
    let task = ws.plugin(ArchiveFixture::new("task.jar").requires("xml", None).requires("tools", None));
    let manager = ws.manager();

    let graph = manager.dependency_graph(&task).unwrap();
    let tree = graph.to_tree_string(&task);
    assert!(tree.starts_with("task.jar\n"));
    assert!(tree.contains("├── xml.jar"));
    assert!(tree.contains("util.jar (shared)"));

    let order = graph.build_order().unwrap();
    assert_eq!(order.last(), Some(&task));
}

use std::sync::{Arc, RwLock};

use extenv::core::{Artifact, ExtenvError};
use extenv::environment::Environment;
use extenv::index::ExtensionIndex;
use extenv::manager::EnvironmentManager;
use extenv::manifest::ExtensionRequirement;
use extenv::test_utils::ArchiveFixture;

use crate::helpers::Workspace;

#[test]
fn test_repeated_requests_return_same_environment() {
    let ws = Workspace::new();
    ws.common();
    let a = ws.plugin(ArchiveFixture::new("a.jar").entry("a.txt", "a"));
    let manager = ws.manager();

    let first = manager.get_environment(&a).unwrap();
    let second = manager.get_environment(&a).unwrap();
    let by_path = manager.get_environment_for_path(ws.plugin_dir().join("../plugins/a.jar")).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &by_path));
    assert_eq!(manager.cache().len(), 1);
}

#[test]
fn test_shared_provider_environment() {
    let ws = Workspace::new();
    let e = ws.extension(ArchiveFixture::new("e.jar").provides("ext1", None));
    let a = ws.plugin(ArchiveFixture::new("a.jar").requires("ext1", None));
    let b = ws.plugin(ArchiveFixture::new("b.jar").requires("ext1", None));
    let manager = ws.manager();

    let env_a = manager.get_environment(&a).unwrap();
    let env_b = manager.get_environment(&b).unwrap();
    let env_e = manager.get_environment(&e).unwrap();

    assert!(Arc::ptr_eq(&env_a.parents()[0], manager.common()));
    assert!(Arc::ptr_eq(&env_a.parents()[1], &env_e));
    assert!(Arc::ptr_eq(&env_b.parents()[1], &env_e));
    assert_eq!(manager.cache().len(), 3);
}

#[test]
fn test_transitive_providers_in_parent_order() {
    let ws = Workspace::new();
    let util = ws.extension(ArchiveFixture::new("util.jar").provides("util", None));
    let xml = ws.extension(ArchiveFixture::new("xml.jar").provides("xml", None).requires("util", None));
    let tools = ws.extension(ArchiveFixture::new("tools.jar").provides("tools", None).requires("util", None));
    let task = ws.plugin(ArchiveFixture::new("task.jar").requires("xml", None).requires("tools", None));
    let manager = ws.manager();

    let env = manager.get_environment(&task).unwrap();
    let parents: Vec<Vec<Artifact>> = env.parents().iter().map(|p| p.artifacts().to_vec()).collect();
    assert_eq!(parents, vec![vec![], vec![xml], vec![util.clone()], vec![tools]]);

    // util's environment is the same instance everywhere it appears
    let util_env = manager.get_environment(&util).unwrap();
    assert!(Arc::ptr_eq(&env.parents()[2], &util_env));
    for parent in &env.parents()[1..] {
        if parent.artifacts() != [util.clone()] {
            assert!(Arc::ptr_eq(&parent.parents()[1], &util_env));
        }
    }
}

#[test]
fn test_failed_construction_is_not_cached() {
    let ws = Workspace::new();
    let e = ws.extension(ArchiveFixture::new("e.jar").provides("late", None));
    let a = ws.plugin(ArchiveFixture::new("a.jar").requires("late", None));

    let registered: Arc<RwLock<Option<Artifact>>> = Arc::new(RwLock::new(None));
    let lookup = Arc::clone(&registered);
    let index = move |req: &ExtensionRequirement| -> Option<Artifact> {
        (req.name == "late").then(|| lookup.read().unwrap().clone()).flatten()
    };
    let manager = EnvironmentManager::new(Arc::new(Environment::empty()), Arc::new(index));

    let err = manager.get_environment(&a).unwrap_err();
    assert!(matches!(err, ExtenvError::UnsatisfiedExtension { .. }));
    assert!(!manager.cache().contains(a.id()));

    *registered.write().unwrap() = Some(e.clone());

    let env = manager.get_environment(&a).unwrap();
    assert_eq!(env.parents()[1].artifacts(), &[e]);
    assert!(manager.cache().contains(a.id()));
}

/// Index that hands out a provider whose archive does not exist on disk.
struct GhostIndex;

impl ExtensionIndex for GhostIndex {
    fn lookup(&self, requirement: &ExtensionRequirement) -> Option<Artifact> {
        (requirement.name == "ghost").then(|| Artifact::from_canonical("/nonexistent/extenv/ghost.jar"))
    }
}

/// Reader that declares nothing for archives it cannot find.
struct LenientReader;

impl extenv::manifest::MetadataReader for LenientReader {
    fn read_metadata(&self, artifact: &Artifact) -> Result<extenv::manifest::ArtifactMetadata, ExtenvError> {
        if artifact.path().exists() {
            extenv::manifest::ArchiveMetadataReader::new().read_metadata(artifact)
        } else {
            Ok(Default::default())
        }
    }
}

#[test]
fn test_provider_failure_is_wrapped() {
    let ws = Workspace::new();
    let a = ws.plugin(ArchiveFixture::new("a.jar").requires("ghost", None));
    let manager =
        EnvironmentManager::new(Arc::new(Environment::empty()), Arc::new(GhostIndex)).with_reader(Arc::new(LenientReader));

    match manager.get_environment(&a).unwrap_err() {
        ExtenvError::ConstructionFailure {
            artifact,
            provider,
            source,
        } => {
            assert_eq!(&artifact, a.id());
            assert_eq!(provider.path(), std::path::Path::new("/nonexistent/extenv/ghost.jar"));
            assert!(matches!(*source, ExtenvError::IoFailure { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(manager.cache().is_empty());
}

#[test]
fn test_cached_environment_reads_no_metadata() {
    let ws = Workspace::new();
    ws.extension(ArchiveFixture::new("util.jar").provides("util", None));
    ws.extension(ArchiveFixture::new("xml.jar").provides("xml", None).requires("util", None));
    let task = ws.plugin(ArchiveFixture::new("task.jar").requires("xml", None));

    let reader = Arc::new(extenv::test_utils::CountingReader::new(extenv::manifest::ArchiveMetadataReader::new()));
    let manager = ws.manager().with_reader(reader.clone());

    let first = manager.get_environment(&task).unwrap();
    // task once; xml and util again for each provider build that misses the cache
    assert_eq!(reader.reads_of(&task), 1);
    assert_eq!(reader.total_reads(), 6);

    let second = manager.get_environment(&task).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(reader.total_reads(), 6);
}

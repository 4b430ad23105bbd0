use srcd_engine::domain::CatalogConfig;
use srcd_engine::domain::catalog::BBLFSH_VOLUME;
use srcd_engine::test_support::MockRuntime;
use srcd_engine::{CallContext, Catalog, ComponentError, Orchestrator, Registry};
use std::sync::Arc;

fn create_orchestrator() -> (Orchestrator, Arc<MockRuntime>) {
    let mock = Arc::new(MockRuntime::new());
    let catalog = Arc::new(Catalog::new(CatalogConfig::default()).unwrap());
    let registry = Arc::new(Registry::new(catalog, mock.clone()));
    (Orchestrator::new(registry, mock.clone()), mock)
}

fn seed_engine_state(mock: &MockRuntime) {
    mock.add_container("srcd-cli-gitbase", "srcd/gitbase:v0.17.1", true);
    mock.add_container("srcd-cli-bblfshd", "bblfsh/bblfshd:v2.9.2-drivers", true);
    mock.add_container("my-own-app", "nginx:latest", true);
    mock.add_volume(BBLFSH_VOLUME);
    mock.add_volume("srcd-cli-gitbase-cache");
    mock.add_volume("my-own-data");
    mock.set_network(true);
    mock.add_image("srcd/gitbase", "v0.17.1");
    mock.add_image("bblfsh/bblfshd", "v2.9.2-drivers");
    mock.add_image("bblfsh/bblfshd", "v2.8.0");
}

#[test]
fn test_install_foreign_never_pulls() {
    let (orchestrator, mock) = create_orchestrator();

    let result = orchestrator.install(&CallContext::background(), "foreign/img:1");

    assert!(matches!(result, Err(ComponentError::NotSrcd(_))));
    assert!(!mock.get_commands().iter().any(|c| c.starts_with("pull:")));
}

#[test]
fn test_prune_twice_is_idempotent() {
    let (orchestrator, mock) = create_orchestrator();
    seed_engine_state(&mock);
    let ctx = CallContext::background();

    let first = orchestrator.prune(&ctx, false).unwrap();
    assert_eq!(first.containers, 2);
    assert_eq!(first.volumes, 2);
    assert!(first.network);

    mock.clear_commands();
    let second = orchestrator.prune(&ctx, false).unwrap();

    assert!(second.is_empty());
    let commands = mock.get_commands();
    assert!(!commands.iter().any(|c| c.starts_with("remove_container:")));
    assert!(!commands.iter().any(|c| c.starts_with("remove_volume:")));
    assert!(mock.container_exists("my-own-app"));
    assert!(mock.volume_exists("my-own-data"));
}

#[test]
fn test_volume_failure_halts_prune() {
    let (orchestrator, mock) = create_orchestrator();
    seed_engine_state(&mock);
    mock.set_fail_on("remove_volume");

    let err = orchestrator
        .prune(&CallContext::background(), true)
        .unwrap_err();

    assert!(err.to_string().contains("volumes"));
    assert!(!mock.container_exists("srcd-cli-gitbase"));
    assert!(!mock.container_exists("srcd-cli-bblfshd"));

    let commands = mock.get_commands();
    assert!(!commands.contains(&"remove_network".to_string()));
    assert!(!commands.iter().any(|c| c.starts_with("remove_image:")));
    assert!(!commands.iter().any(|c| c.starts_with("versions_installed:")));
    assert!(mock.network_exists());
}

#[test]
fn test_prune_resumes_after_partial_failure() {
    let (orchestrator, mock) = create_orchestrator();
    seed_engine_state(&mock);
    let ctx = CallContext::background();

    mock.set_fail_on("remove_volume:srcd-cli-gitbase-cache");
    assert!(orchestrator.prune(&ctx, true).is_err());
    assert!(!mock.volume_exists(BBLFSH_VOLUME));

    mock.clear_fail_on();
    let report = orchestrator.prune(&ctx, true).unwrap();

    assert_eq!(report.containers, 0);
    assert_eq!(report.volumes, 1);
    assert!(report.network);
    assert_eq!(report.images, 3);
    assert!(!mock.image_exists("bblfsh/bblfshd", "v2.8.0"));
}

#[test]
fn test_image_removal_failure_is_labelled() {
    let (orchestrator, mock) = create_orchestrator();
    seed_engine_state(&mock);
    mock.set_fail_on("remove_image:bblfsh/bblfshd:v2.9.2-drivers");

    let err = orchestrator
        .prune(&CallContext::background(), true)
        .unwrap_err();

    assert!(err.to_string().contains("unable to remove all images"));
    assert!(!mock.image_exists("srcd/gitbase", "v0.17.1"));
    assert!(mock.image_exists("bblfsh/bblfshd", "v2.8.0"));
}

#[test]
fn test_stop_leaves_volumes_and_images() {
    let (orchestrator, mock) = create_orchestrator();
    seed_engine_state(&mock);

    let report = orchestrator.stop().unwrap();

    assert_eq!(report.containers, 2);
    assert!(mock.volume_exists(BBLFSH_VOLUME));
    assert!(mock.network_exists());
    assert!(mock.image_exists("srcd/gitbase", "v0.17.1"));
}

use srcd_engine::domain::CatalogConfig;
use srcd_engine::test_support::MockRuntime;
use srcd_engine::{CallContext, Catalog, Filter, Registry};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn create_registry() -> (Registry, Arc<MockRuntime>) {
    let mock = Arc::new(MockRuntime::new());
    let catalog = Arc::new(Catalog::new(CatalogConfig::default()).unwrap());
    (Registry::new(catalog, mock.clone()), mock)
}

#[test]
fn test_namespace_eligibility() {
    let catalog = Catalog::new(CatalogConfig::default()).unwrap();

    for cmp in catalog.components() {
        assert!(catalog.is_srcd_component(&cmp.image));
    }
    assert!(catalog.is_srcd_component("srcd/gitbase:v0.17.1"));
    assert!(!catalog.is_srcd_component("foreign/img:1"));
}

#[test]
fn test_list_without_versions_is_the_catalog() {
    let (registry, mock) = create_registry();
    mock.add_image("srcd/gitbase", "v0.1.0");

    let components = registry
        .list(&CallContext::background(), false, &[])
        .unwrap();

    let names: Vec<&str> = components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "srcd-cli-gitbase",
            "srcd-cli-gitbase-web",
            "srcd-cli-bblfshd",
            "srcd-cli-bblfsh-web",
        ]
    );
}

#[test]
fn test_list_all_versions_adds_one_extra() {
    let (registry, mock) = create_registry();
    mock.add_image("srcd/gitbase-web", "v0.3.0");
    mock.add_image("srcd/gitbase-web", "v0.2.1");

    let components = registry
        .list(&CallContext::background(), true, &[])
        .unwrap();

    assert_eq!(components.len(), 5);
    let family: Vec<String> = components
        .iter()
        .filter(|c| c.image == "srcd/gitbase-web")
        .map(|c| c.version.clone())
        .collect();
    assert_eq!(family, vec!["v0.3.0", "v0.2.1"]);
    assert!(components[4].same_family(&components[1]));
    assert_eq!(components[4].name, components[1].name);
}

#[test]
fn test_filter_order_does_not_change_result() {
    let (registry, mock) = create_registry();
    mock.add_image("srcd/gitbase", "v0.17.1");
    mock.add_image("bblfsh/bblfshd", "v2.9.2-drivers");
    mock.add_image("bblfsh/web", "v0.7.0");
    mock.add_container("srcd-cli-gitbase", "srcd/gitbase:v0.17.1", true);
    mock.add_container("srcd-cli-bblfsh-web", "bblfsh/web:v0.7.0", true);
    mock.add_container("srcd-cli-gitbase-web", "srcd/gitbase-web:v0.3.0", true);
    let ctx = CallContext::background();

    let running_first = registry
        .list(&ctx, false, &[Filter::Running, Filter::Installed])
        .unwrap();
    let installed_first = registry
        .list(&ctx, false, &[Filter::Installed, Filter::Running])
        .unwrap();

    let a: HashSet<String> = running_first.iter().map(|c| c.image_with_version()).collect();
    let b: HashSet<String> = installed_first.iter().map(|c| c.image_with_version()).collect();
    assert_eq!(a, b);
    assert_eq!(
        a,
        HashSet::from([
            "srcd/gitbase:v0.17.1".to_string(),
            "bblfsh/web:v0.7.0".to_string(),
        ])
    );
}

#[test]
fn test_installed_filter_error_excludes_without_failing() {
    let (registry, mock) = create_registry();
    mock.add_image("srcd/gitbase", "v0.17.1");
    mock.add_image("bblfsh/web", "v0.7.0");
    mock.set_fail_on("is_installed:srcd/gitbase");

    let components = registry
        .list(&CallContext::background(), false, &[Filter::Installed])
        .unwrap();

    assert_eq!(components.len(), 1);
    assert_eq!(components[0].image, "bblfsh/web");
}

#[test]
fn test_workdir_dependent_combined_with_running() {
    let (registry, mock) = create_registry();
    mock.add_container("srcd-cli-bblfshd", "bblfsh/bblfshd:v2.9.2-drivers", true);
    mock.add_container("srcd-cli-bblfsh-web", "bblfsh/web:v0.7.0", true);

    let components = registry
        .list(
            &CallContext::background(),
            false,
            &[Filter::WorkdirDependent, Filter::Running],
        )
        .unwrap();

    assert_eq!(components.len(), 1);
    assert_eq!(components[0].name, "srcd-cli-bblfshd");
}

#[test]
fn test_running_filter_error_excludes_only_that_component() {
    let (registry, mock) = create_registry();
    mock.add_container("srcd-cli-gitbase", "srcd/gitbase:v0.17.1", true);
    mock.add_container("srcd-cli-bblfshd", "bblfsh/bblfshd:v2.9.2-drivers", true);
    mock.set_fail_on("is_running:srcd-cli-gitbase");

    let components = registry
        .list(&CallContext::background(), false, &[Filter::Running])
        .unwrap();

    let names: Vec<&str> = components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["srcd-cli-bblfshd"]);
}

#[test]
fn test_expired_context_makes_installed_filter_false() {
    let (registry, mock) = create_registry();
    mock.add_image("srcd/gitbase", "v0.17.1");
    mock.add_image("bblfsh/web", "v0.7.0");
    let ctx = CallContext::background().with_timeout(Duration::ZERO);

    let components = registry.list(&ctx, false, &[Filter::Installed]).unwrap();

    assert!(components.is_empty());
}

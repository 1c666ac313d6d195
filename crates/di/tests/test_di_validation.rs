use anyhow::Result;
use common::{init_test_logging, CallCounter};
use di::{ContainerConfig, CycleDetection, DIContainer, DIError, Lifetime};
use rstest::rstest;
use std::sync::Arc;

#[derive(Debug)]
struct TypeA {
    b: Arc<TypeB>,
}

#[derive(Debug)]
struct TypeB {
    label: &'static str,
}

#[derive(Debug)]
struct Greeter {
    message: String,
}

#[derive(Debug)]
struct Ping;
#[derive(Debug)]
struct Pong;

fn register_type_a_requiring_second(container: &DIContainer) -> Result<()> {
    container.register_transient(|r| {
        Ok(TypeA {
            b: r.require_named::<TypeB>("second"),
        })
    })?;
    Ok(())
}

#[test]
fn test_missing_named_dependency_reported() -> Result<()> {
    init_test_logging();
    let container = DIContainer::new();
    container.register_instance(None, TypeB { label: "unnamed" })?;
    register_type_a_requiring_second(&container)?;

    let error = container.validate().unwrap_err();
    assert!(error.type_name.ends_with("TypeB"));
    assert_eq!(error.name.as_deref(), Some("second"));

    Ok(())
}

#[test]
fn test_complete_graph_passes_and_resolves() -> Result<()> {
    let container = DIContainer::new();
    container.register_instance(Some("second"), TypeB { label: "named" })?;
    register_type_a_requiring_second(&container)?;

    container.validate()?;
    assert_eq!(container.resolve::<TypeA>()?.b.label, "named");

    Ok(())
}

#[test]
fn test_validation_recurses_into_parent() -> Result<()> {
    let parent = DIContainer::new();
    register_type_a_requiring_second(&parent)?;

    let child = parent.child();
    child.register_instance(Some("second"), TypeB { label: "child" })?;

    // Родительская регистрация проверяется через resolver родителя
    let error = child.validate().unwrap_err();
    assert!(error.type_name.ends_with("TypeB"));
    assert_eq!(error.name.as_deref(), Some("second"));

    Ok(())
}

#[test]
fn test_child_failure_reported_before_parent() -> Result<()> {
    let parent = DIContainer::new();
    parent.register_transient::<Ping, _>(|_| Err(anyhow::anyhow!("parent is broken")))?;

    let child = parent.child();
    child.register_transient::<Pong, _>(|_| Err(anyhow::anyhow!("child is broken")))?;

    let error = child.validate().unwrap_err();
    assert!(error.reason.contains("child is broken"));
    assert!(error.type_name.ends_with("Pong"));

    let error = parent.validate().unwrap_err();
    assert!(error.reason.contains("parent is broken"));

    Ok(())
}

#[test]
fn test_validation_invokes_each_factory() -> Result<()> {
    let transient_calls = CallCounter::new();
    let singleton_calls = CallCounter::new();
    let container = DIContainer::new();
    {
        let calls = transient_calls.clone();
        container.register_transient(move |_| {
            calls.increment();
            Ok(Ping)
        })?;
    }
    {
        let calls = singleton_calls.clone();
        container.register_singleton(move |_| {
            calls.increment();
            Ok(Pong)
        })?;
    }

    container.validate()?;
    container.validate()?;
    container.resolve::<Pong>()?;

    assert_eq!(transient_calls.count(), 2);
    assert_eq!(singleton_calls.count(), 1);

    Ok(())
}

fn cyclic_container(mode: CycleDetection) -> Result<DIContainer> {
    let container = DIContainer::with_config(ContainerConfig::default().with_cycle_detection(mode));
    container.register(None, Lifetime::ContainerSingleton, |r| {
        r.resolve::<Pong>()?;
        Ok(Ping)
    })?;
    container.register(None, Lifetime::Transient, |r| {
        r.resolve::<Ping>()?;
        Ok(Pong)
    })?;
    Ok(container)
}

#[rstest]
#[case(CycleDetection::ValidationOnly)]
#[case(CycleDetection::Always)]
fn test_cycle_reported_by_validation(#[case] mode: CycleDetection) -> Result<()> {
    let container = cyclic_container(mode)?;

    let error = container.validate().unwrap_err();
    assert!(error.reason.starts_with("circular dependency"), "{}", error.reason);
    assert!(error.type_name.ends_with("Ping"));

    Ok(())
}

#[test]
fn test_cycle_reported_on_resolve_when_always() -> Result<()> {
    let container = cyclic_container(CycleDetection::Always)?;

    match container.resolve::<Pong>() {
        Err(DIError::CircularDependency { chain, .. }) => {
            assert_eq!(chain.len(), 3);
            assert!(chain[0].contains("Pong"));
            assert!(chain[2].contains("Pong"));
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("cycle must not resolve"),
    }

    // Singleton не закэширован после неудачи
    assert_eq!(container.stats().cached_singletons, 0);

    Ok(())
}

#[test]
fn test_depth_limit() -> Result<()> {
    let config = ContainerConfig {
        cycle_detection: CycleDetection::Always,
        max_dependency_depth: 1,
        ..ContainerConfig::default()
    };
    let container = DIContainer::with_config(config);
    container.register_instance(None, TypeB { label: "leaf" })?;
    container.register_transient(|r| {
        Ok(TypeA {
            b: r.resolve::<TypeB>()?,
        })
    })?;

    assert!(container.resolve::<TypeB>().is_ok());
    let error = container.resolve::<TypeA>().unwrap_err();
    assert!(matches!(error, DIError::DepthExceeded { .. }));

    Ok(())
}

#[rstest]
#[case(CycleDetection::ValidationOnly)]
#[case(CycleDetection::Always)]
fn test_child_decorating_parent_registration_is_not_a_cycle(
    #[case] mode: CycleDetection,
) -> Result<()> {
    let parent = DIContainer::with_config(ContainerConfig::default().with_cycle_detection(mode));
    parent.register_instance(
        None,
        Greeter {
            message: "hello".to_string(),
        },
    )?;

    let child = parent.child();
    let upstream = parent.clone();
    child.register_singleton(move |_| {
        let inner = upstream.resolve::<Greeter>()?;
        Ok(Greeter {
            message: format!("{} + decorated", inner.message),
        })
    })?;

    child.validate()?;
    assert_eq!(child.resolve::<Greeter>()?.message, "hello + decorated");
    assert_eq!(parent.resolve::<Greeter>()?.message, "hello");

    Ok(())
}

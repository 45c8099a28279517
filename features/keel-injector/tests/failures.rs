//! Build and stop failures.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};

use common::{build, journal, record, Journal};
use keel_injector::{
    component::InjectionPoint, Component, Constructor, Definition, DynError, Execution, Inject,
    Injector, InjectorError, Instance, Invoker, Lifecycle, Operation, RequireError, Requirement,
    State, TypeInfo,
};
use rstest::rstest;

fn build_error(builder: keel_injector::InjectorBuilder) -> InjectorError {
    match build(builder) {
        Ok(injector) => panic!("expected the build to fail, got {injector:?}"),
        Err(error) => error,
    }
}

mod initialized_cycle {
    use super::*;

    #[derive(Default)]
    pub struct Left {
        pub right: Inject<Right>,
    }
    impl Component for Left {
        fn definition() -> Definition<Self> {
            Definition::<Self>::with_default()
                .inject(Requirement::component().at(State::Initialized), |left| &left.right)
        }
    }

    #[derive(Default)]
    pub struct Right {
        pub left: Inject<Left>,
    }
    impl Component for Right {
        fn definition() -> Definition<Self> {
            Definition::<Self>::with_default()
                .inject(Requirement::component().at(State::Initialized), |right| &right.left)
        }
    }
}

#[test]
fn mutual_initialized_requirement_is_a_cycle() {
    use initialized_cycle::{Left, Right};

    let error = build_error(Injector::builder().with_component::<Left>());

    let InjectorError::CyclicDependency { chain } = &error else {
        panic!("expected a cycle, got {error}");
    };
    assert_eq!(chain.len(), 2);
    assert!(chain.contains(&TypeInfo::of::<Left>()));
    assert!(chain.contains(&TypeInfo::of::<Right>()));

    let message = error.to_string();
    assert!(message.contains("Left") && message.contains("Right"), "{message}");
}

mod constructor_cycle {
    use super::*;

    pub struct Egg;
    impl Component for Egg {
        fn definition() -> Definition<Self> {
            Definition::new().constructor(
                Constructor::new(|_| async { Ok::<_, std::convert::Infallible>(Egg) })
                    .arg(Requirement::<Chicken>::component()),
            )
        }
    }

    pub struct Chicken;
    impl Component for Chicken {
        fn definition() -> Definition<Self> {
            Definition::new().constructor(
                Constructor::new(|_| async { Ok::<_, std::convert::Infallible>(Chicken) })
                    .arg(Requirement::<Egg>::component()),
            )
        }
    }
}

#[test]
fn constructor_arguments_on_each_other_are_a_cycle() {
    use constructor_cycle::{Chicken, Egg};

    let error = build_error(Injector::builder().with_component::<Egg>());

    let InjectorError::CyclicDependency { chain } = error else {
        panic!("expected a cycle");
    };
    assert!(chain.contains(&TypeInfo::of::<Egg>()));
    assert!(chain.contains(&TypeInfo::of::<Chicken>()));
}

mod created_mutual {
    use super::*;

    #[derive(Default)]
    pub struct Ping {
        pub pong: Inject<Pong>,
    }
    impl Component for Ping {
        fn definition() -> Definition<Self> {
            Definition::<Self>::with_default()
                .inject(Requirement::component(), |ping| &ping.pong)
        }
    }

    #[derive(Default)]
    pub struct Pong {
        pub ping: Inject<Ping>,
    }
    impl Component for Pong {
        fn definition() -> Definition<Self> {
            Definition::<Self>::with_default()
                .inject(Requirement::component(), |pong| &pong.ping)
        }
    }
}

#[test]
fn mutual_fields_on_created_targets_are_wired() {
    use created_mutual::{Ping, Pong};

    let injector = build(Injector::builder().with_component::<Ping>()).expect("no cycle");

    let ping = injector.get::<Ping>().expect("ping");
    let pong = injector.get::<Pong>().expect("pong");
    assert!(std::sync::Arc::ptr_eq(&ping.pong, &pong));
    assert!(std::sync::Arc::ptr_eq(&pong.ping, &ping));
}

mod unconstructible {
    use super::*;

    pub struct Bare;
    impl Component for Bare {
        fn definition() -> Definition<Self> {
            Definition::new()
        }
    }

    pub struct Token;

    #[derive(Default)]
    pub struct Client {
        pub token: Inject<Token>,
    }
    impl Component for Client {
        fn definition() -> Definition<Self> {
            Definition::<Self>::with_default()
                .inject(Requirement::instance(), |client| &client.token)
        }
    }
}

#[test]
fn definition_without_constructor_is_not_viable() {
    use unconstructible::Bare;

    let error = build_error(Injector::builder().with_component::<Bare>());

    let InjectorError::NoViableConstructor {
        component,
        required_by,
    } = error
    else {
        panic!("expected no viable constructor");
    };
    assert_eq!(component, TypeInfo::of::<Bare>());
    assert_eq!(required_by, None);
}

#[test]
fn supplied_instance_replaces_missing_constructor() {
    use unconstructible::Bare;

    let injector = build(
        Injector::builder()
            .with_instance(Bare)
            .with_component::<Bare>(),
    )
    .expect("instance supplied");
    assert_eq!(injector.state_of::<Bare>(), Some(State::Started));
}

#[test]
fn missing_instance_names_the_requirer() {
    use unconstructible::{Client, Token};

    let error = build_error(Injector::builder().with_component::<Client>());

    let InjectorError::NoViableConstructor {
        component,
        required_by,
    } = error
    else {
        panic!("expected no viable constructor");
    };
    assert_eq!(component, TypeInfo::of::<Token>());
    assert_eq!(required_by, Some(TypeInfo::of::<Client>()));
}

#[test]
fn duplicate_instances_are_rejected() {
    use unconstructible::Token;

    let error = build_error(
        Injector::builder()
            .with_instance(Token)
            .with_instance(Token),
    );
    assert!(matches!(error, InjectorError::Duplicate(info) if info == TypeInfo::of::<Token>()));
}

mod stopped_requirement {
    use super::*;

    #[derive(Default)]
    pub struct Target;
    impl Component for Target {
        fn definition() -> Definition<Self> {
            Definition::with_default()
        }
    }

    #[derive(Default)]
    pub struct Waiter;
    impl Component for Waiter {
        fn definition() -> Definition<Self> {
            Definition::with_default().execute(
                Execution::new("wait", State::Started, |_this: std::sync::Arc<Waiter>, _args| async {
                    Ok::<_, std::convert::Infallible>(())
                })
                .arg(Requirement::<Target>::component().at(State::Stopped)),
            )
        }
    }

    #[derive(Default)]
    pub struct Cleaner;
    impl Component for Cleaner {
        fn definition() -> Definition<Self> {
            Definition::with_default().execute(
                Execution::new("clean", State::Stopped, |_this: std::sync::Arc<Cleaner>, _args| async {
                    Ok::<_, std::convert::Infallible>(())
                })
                .arg(Requirement::<Target>::component().at(State::Stopped)),
            )
        }
    }
}

#[test]
fn requiring_stopped_before_stop_is_rejected() {
    use stopped_requirement::{Target, Waiter};

    let error = build_error(Injector::builder().with_component::<Waiter>());

    let InjectorError::UnreachableRequirement {
        component,
        dependency,
        phase,
    } = error
    else {
        panic!("expected an unreachable requirement");
    };
    assert_eq!(component, TypeInfo::of::<Waiter>());
    assert_eq!(dependency, TypeInfo::of::<Target>());
    assert_eq!(phase, State::Started);
}

#[test]
fn requiring_stopped_while_stopping_waits_for_target() {
    use stopped_requirement::{Cleaner, Target};

    let mut injector = build(Injector::builder().with_component::<Cleaner>()).expect("reachable");
    futures::executor::block_on(injector.stop()).expect("target stops first");

    assert_eq!(injector.state_of::<Cleaner>(), Some(State::Stopped));
    assert_eq!(injector.state_of::<Target>(), Some(State::Stopped));
}

mod instance_precedence {
    use super::*;

    pub struct Limit(pub u32);
    impl Default for Limit {
        fn default() -> Self {
            Limit(10)
        }
    }
    impl Component for Limit {
        fn definition() -> Definition<Self> {
            Definition::with_default()
        }
    }
}

#[test]
fn instance_wins_over_component_of_the_same_type() {
    use instance_precedence::Limit;

    let injector = build(
        Injector::builder()
            .with_component::<Limit>()
            .with_instance(Limit(99)),
    )
    .expect("no duplicate");
    assert_eq!(injector.get::<Limit>().expect("limit").0, 99);
}

mod failing_constructor {
    use super::*;

    pub static DEPENDENT_CONSTRUCTED: AtomicBool = AtomicBool::new(false);

    pub struct Broken;
    impl Component for Broken {
        fn definition() -> Definition<Self> {
            Definition::new().constructor(Constructor::new(|_| async {
                Err::<Broken, DynError>("disk unavailable".into())
            }))
        }
    }

    pub struct Dependent;
    impl Component for Dependent {
        fn definition() -> Definition<Self> {
            Definition::new().constructor(
                Constructor::new(|_| async {
                    DEPENDENT_CONSTRUCTED.store(true, Ordering::SeqCst);
                    Ok::<_, std::convert::Infallible>(Dependent)
                })
                .arg(Requirement::<Broken>::component()),
            )
        }
    }
}

#[test]
fn constructor_failure_aborts_before_dependents() {
    use failing_constructor::{Broken, Dependent, DEPENDENT_CONSTRUCTED};

    let error = build_error(Injector::builder().with_component::<Dependent>());

    let InjectorError::InvocationFailed {
        component,
        operation,
        cause,
    } = error
    else {
        panic!("expected an invocation failure");
    };
    assert_eq!(component, TypeInfo::of::<Broken>());
    assert_eq!(operation, Operation::Construct);
    assert_eq!(cause.to_string(), "disk unavailable");
    assert!(!DEPENDENT_CONSTRUCTED.load(Ordering::SeqCst));
}

mod failing_execution {
    use super::*;

    #[derive(Default)]
    pub struct Migrator;
    impl Component for Migrator {
        fn definition() -> Definition<Self> {
            Definition::with_default().execute(Execution::new(
                "migrate",
                State::Resolved,
                |_this: std::sync::Arc<Migrator>, _args| async {
                    Err::<(), DynError>("schema mismatch".into())
                },
            ))
        }
    }

    #[derive(Default)]
    pub struct Unready;
    impl Component for Unready {
        fn definition() -> Definition<Self> {
            Definition::with_default().lifecycle()
        }
    }
    impl Lifecycle for Unready {
        fn start(&self) -> Result<(), DynError> {
            Err("not ready".into())
        }
    }
}

#[test]
fn execution_failure_names_the_execution() {
    use failing_execution::Migrator;

    let error = build_error(Injector::builder().with_component::<Migrator>());

    let InjectorError::InvocationFailed {
        component,
        operation,
        ..
    } = error
    else {
        panic!("expected an invocation failure");
    };
    assert_eq!(component, TypeInfo::of::<Migrator>());
    assert_eq!(
        operation,
        Operation::Execute {
            name: "migrate",
            state: State::Resolved
        }
    );
}

#[test]
fn hook_failure_names_the_phase() {
    use failing_execution::Unready;

    let error = build_error(Injector::builder().with_component::<Unready>());
    assert!(matches!(
        error,
        InjectorError::InvocationFailed {
            operation: Operation::Hook(State::Started),
            ..
        }
    ));
}

mod denied {
    use super::*;

    #[derive(Default)]
    pub struct Secret;
    impl Component for Secret {
        fn definition() -> Definition<Self> {
            Definition::with_default()
        }
    }

    #[derive(Default)]
    pub struct Spy {
        pub secret: Inject<Secret>,
    }
    impl Component for Spy {
        fn definition() -> Definition<Self> {
            Definition::<Self>::with_default()
                .inject(Requirement::component(), |spy| &spy.secret)
        }
    }

    /// Refuses every field injection
    pub struct DenyInjection;
    impl Invoker for DenyInjection {
        fn inject(
            &self,
            _owner: &Instance,
            point: &InjectionPoint,
            _value: &Instance,
        ) -> Result<(), DynError> {
            Err(format!("injecting '{}' is not allowed", point.dependency.type_info).into())
        }
    }
}

#[test]
fn invoker_can_deny_injection() {
    use denied::{DenyInjection, Secret, Spy};

    let error = build_error(
        Injector::builder()
            .with_invoker(DenyInjection)
            .with_component::<Spy>(),
    );

    let InjectorError::InvocationFailed {
        component,
        operation,
        cause,
    } = error
    else {
        panic!("expected an invocation failure");
    };
    assert_eq!(component, TypeInfo::of::<Spy>());
    assert_eq!(
        operation,
        Operation::Inject {
            field: TypeInfo::of::<Secret>()
        }
    );
    assert!(cause.to_string().contains("not allowed"));
}

#[rstest]
#[case::get(true)]
#[case::require(false)]
fn unknown_type_is_not_found(#[case] via_get: bool) {
    use denied::Secret;

    let injector = build(Injector::builder()).expect("empty injector");
    assert!(injector.is_empty());

    if via_get {
        assert!(injector.get::<Secret>().is_none());
    } else {
        assert!(matches!(
            injector.require::<Secret>(),
            Err(RequireError::TypeMissing(_))
        ));
    }
    assert_eq!(injector.state_of::<Secret>(), None);
}

mod failing_stop {
    use super::*;

    #[derive(Default)]
    pub struct Flaky;
    impl Component for Flaky {
        fn definition() -> Definition<Self> {
            Definition::with_default().lifecycle()
        }
    }
    impl Lifecycle for Flaky {
        fn stop(&self) -> Result<(), DynError> {
            Err("flush failed".into())
        }
    }

    #[derive(Default)]
    pub struct Steady;
    impl Component for Steady {
        fn definition() -> Definition<Self> {
            Definition::with_default().execute(record(State::Stopped, "Steady stopped"))
        }
    }
}

#[test]
fn stop_failures_are_collected() {
    use failing_stop::{Flaky, Steady};

    let mut injector = build(
        Injector::builder()
            .with_instance(Journal::default())
            .with_component::<Flaky>()
            .with_component::<Steady>(),
    )
    .expect("no cycle");

    let errors = futures::executor::block_on(injector.stop()).expect_err("flaky stop");
    assert_eq!(errors.errors.len(), 1);
    assert!(matches!(
        &errors.errors[0],
        InjectorError::InvocationFailed {
            operation: Operation::Hook(State::Stopped),
            ..
        }
    ));
    assert!(errors.to_string().contains("flush failed"));

    assert_eq!(journal(&injector).count("Steady stopped"), 1);
    assert_eq!(injector.state_of::<Flaky>(), Some(State::Stopped));
    assert_eq!(injector.state_of::<Steady>(), Some(State::Stopped));

    futures::executor::block_on(injector.stop()).expect("second stop is a no-op");
    assert_eq!(journal(&injector).count("Steady stopped"), 1);
}

use std::{convert::Infallible, sync::Arc};

use keel_injector::{
    Bundle, Component, Definition, DynError, Execution, Inject, Injector, Lifecycle, Requirement,
    State,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let storage = Bundle::new("storage").with::<Connection>().with::<Repository>();
    let builder = Injector::builder()
        .with_instance(Settings {
            url: "memory://demo".to_string(),
        })
        .with_bundle(storage)
        .with_component::<Greeter>();

    let mut injector = match futures::executor::block_on(builder.build()) {
        Ok(injector) => injector,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };

    println!("{:?}", injector);
    if let Some(greeter) = injector.get::<Greeter>() {
        println!("{}", greeter.greet());
    }

    if let Err(e) = futures::executor::block_on(injector.stop()) {
        eprintln!("{e}");
    }
}

struct Settings {
    url: String,
}

struct Connection {
    url: String,
}
impl Component for Connection {
    fn definition() -> Definition<Self> {
        Definition::new().constructor(
            keel_injector::Constructor::new(|args| async move {
                let settings = args.get::<Settings>()?;
                Ok::<_, keel_injector::InjectError>(Connection {
                    url: settings.url.clone(),
                })
            })
            .arg(Requirement::<Settings>::instance()),
        )
    }
}

#[derive(Default)]
struct Repository {
    connection: Inject<Connection>,
}
impl Component for Repository {
    fn definition() -> Definition<Self> {
        Definition::<Self>::with_default()
            .inject(Requirement::component(), |repository| &repository.connection)
            .lifecycle()
    }
}
impl Lifecycle for Repository {
    fn start(&self) -> Result<(), DynError> {
        println!("Repository connected to {}", self.connection.url);
        Ok(())
    }
}

#[derive(Default)]
struct Greeter {
    repository: Inject<Repository>,
}
impl Greeter {
    fn greet(&self) -> String {
        format!("Hello from {}", self.repository.connection.url)
    }
}
impl Component for Greeter {
    fn definition() -> Definition<Self> {
        Definition::<Self>::with_default()
            .inject(
                Requirement::component().at(State::Resolved),
                |greeter| &greeter.repository,
            )
            .execute(Execution::new(
                "say_goodbye",
                State::Stopped,
                |this: Arc<Greeter>, _| async move {
                    println!("Goodbye from {}", this.repository.connection.url);
                    Ok::<_, Infallible>(())
                },
            ))
    }
}

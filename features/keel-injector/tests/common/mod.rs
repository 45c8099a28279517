//! Shared fixtures for the injector integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use keel_injector::{Injector, InjectorBuilder, InjectorError};

/// Records what components did, in order
#[derive(Default)]
pub struct Journal(Mutex<Vec<String>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().expect("journal lock").push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().expect("journal lock").clone()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|recorded| recorded == entry)
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|recorded| *recorded == entry).count()
    }
}

pub fn build(builder: InjectorBuilder) -> Result<Injector, InjectorError> {
    futures::executor::block_on(builder.build())
}

pub fn journal(injector: &Injector) -> std::sync::Arc<Journal> {
    injector.get::<Journal>().expect("journal registered")
}

/// Execution writing `entry` into the journal when the owner enters `state`
pub fn record<T: keel_injector::Injectable>(
    state: keel_injector::State,
    entry: &'static str,
) -> keel_injector::Execution<T> {
    keel_injector::Execution::new(
        entry,
        state,
        move |_this: std::sync::Arc<T>, args: keel_injector::Args| async move {
            args.get::<Journal>()?.record(entry);
            Ok::<_, keel_injector::InjectError>(())
        },
    )
    .arg(keel_injector::Requirement::<Journal>::instance())
}

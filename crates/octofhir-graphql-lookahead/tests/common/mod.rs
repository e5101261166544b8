//! Shared fixtures for lookahead integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_graphql_parser::parse_query;
use async_graphql_parser::types::{ExecutableDocument, Type};
use octofhir_graphql_lookahead::{ExecutionPath, SdlRegistry};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

pub const SHOP_SDL: &str = include_str!("../fixtures/shop.graphql");

pub fn shop_schema() -> SdlRegistry {
    SdlRegistry::parse(SHOP_SDL).expect("fixture schema parses")
}

pub fn document(query: &str) -> ExecutableDocument {
    parse_query(query).expect("fixture query parses")
}

pub fn named(type_name: &str) -> Type {
    Type::new(type_name).expect("valid type reference")
}

pub fn order_path() -> ExecutionPath {
    ExecutionPath::new().field("order", "Query")
}

/// Counts ERROR events seen by the subscriber.
#[derive(Clone, Default)]
pub struct ErrorCounter {
    count: Arc<AtomicUsize>,
}

impl ErrorCounter {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Runs `f` with a subscriber that counts ERROR events and returns the
/// count alongside `f`'s result.
pub fn count_errors<T>(f: impl FnOnce() -> T) -> (T, usize) {
    use tracing_subscriber::layer::SubscriberExt;

    let counter = ErrorCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, counter.count())
}

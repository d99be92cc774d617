//! In-memory tracing layer for asserting on emitted events and span fields.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Records event messages and the fields of every `request` span.
#[derive(Debug, Clone, Default)]
pub(crate) struct CapturedTrace {
    messages: Arc<Mutex<Vec<String>>>,
    request_fields: Arc<Mutex<HashMap<String, String>>>,
}

impl CapturedTrace {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Installs the layer as the default subscriber for the calling thread.
    pub(crate) fn install(&self) -> DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    pub(crate) fn count(&self, message: &str) -> usize {
        self.messages.lock().iter().filter(|m| *m == message).count()
    }

    pub(crate) fn request_field(&self, name: &str) -> Option<String> {
        self.request_fields.lock().get(name).cloned()
    }

    fn store_request_fields(&self, fields: Vec<(String, String)>) {
        self.request_fields.lock().extend(fields);
    }
}

struct FieldVisitor<'a>(&'a mut Vec<(String, String)>);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
}

impl<S> Layer<S> for CapturedTrace
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        if attrs.metadata().name() != "request" {
            return;
        }
        let mut fields = Vec::new();
        attrs.record(&mut FieldVisitor(&mut fields));
        self.store_request_fields(fields);
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let is_request = ctx
            .span(id)
            .is_some_and(|span| span.metadata().name() == "request");
        if !is_request {
            return;
        }
        let mut fields = Vec::new();
        values.record(&mut FieldVisitor(&mut fields));
        self.store_request_fields(fields);
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Vec::new();
        event.record(&mut FieldVisitor(&mut fields));
        if let Some((_, message)) = fields.into_iter().find(|(name, _)| name == "message") {
            self.messages.lock().push(message);
        }
    }
}

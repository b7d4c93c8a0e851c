//! Per-object trace handles.
//!
//! A [`Trace`] is a `tracing` span tagged with the subsystem the object
//! belongs to, so every event an object emits carries its module and name.

use std::fmt;

use tracing::{Level, Span, span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceModule {
    Database,
    Schema,
    Table,
    Index,
    Sequence,
    Trigger,
    User,
}

impl TraceModule {
    pub fn as_str(self) -> &'static str {
        match self {
            TraceModule::Database => "database",
            TraceModule::Schema => "schema",
            TraceModule::Table => "table",
            TraceModule::Index => "index",
            TraceModule::Sequence => "sequence",
            TraceModule::Trigger => "trigger",
            TraceModule::User => "user",
        }
    }
}

impl fmt::Display for TraceModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Trace {
    span: Span,
}

impl Trace {
    pub(crate) fn new(database: &str, module: TraceModule) -> Self {
        let span = span!(
            Level::DEBUG,
            "catalog",
            db = database,
            module = module.as_str()
        );
        Self { span }
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(parent: &self.span, "{}", args);
    }
}

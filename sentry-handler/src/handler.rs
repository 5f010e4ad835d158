use std::sync::Arc;

use sentry_core::{sentry_debug, Hub};

use crate::converters::{convert_level, ClassifiedAttrs};
use crate::error::{ForwardError, RecordError};
use crate::record::{Attr, Handler, Level, LogContext, Record};

/// The key of the Sentry context holding the record attributes.
pub const CONTEXT_KEY: &str = "slog";

/// A [`Handler`] which forwards records to Sentry.
///
/// Records whose level is in the configured set are reported to Sentry:
/// [`Level::ERROR`] records as exceptions, [`Level::DEBUG`], [`Level::INFO`]
/// and [`Level::WARN`] records as messages. Every record is passed on to
/// the wrapped handler afterwards, whether or not forwarding succeeded.
#[derive(Clone, Debug)]
pub struct SentryHandler<H> {
    inner: H,
    levels: Arc<[Level]>,
    stored_attrs: Arc<[Attr]>,
}

impl<H: Handler> SentryHandler<H> {
    /// Creates a new `SentryHandler`, wrapping `inner`.
    ///
    /// An empty `levels` set forwards nothing.
    pub fn new<L>(inner: H, levels: L) -> Self
    where
        L: Into<Arc<[Level]>>,
    {
        Self {
            inner,
            levels: levels.into(),
            stored_attrs: Arc::from(Vec::new()),
        }
    }

    /// The levels forwarded to Sentry.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// The wrapped handler.
    pub fn inner(&self) -> &H {
        &self.inner
    }

    fn derive(&self, inner: H, stored_attrs: &[Attr]) -> Self {
        Self {
            inner,
            levels: self.levels.clone(),
            stored_attrs: Arc::from(stored_attrs),
        }
    }

    fn forward(&self, cx: &LogContext, record: &Record) -> Result<(), ForwardError> {
        let hub = cx.hub().cloned().unwrap_or_else(Hub::current);
        if hub.client().is_none() {
            return Err(ForwardError::NoClient);
        }

        let classified =
            ClassifiedAttrs::from_attrs(self.stored_attrs.iter().chain(record.attrs()));

        hub.with_scope(
            |scope| {
                if let Some(context) = classified.to_context() {
                    scope.set_context(CONTEXT_KEY, context);
                }
                for (key, value) in &classified.tags {
                    scope.set_tag(key, value);
                }
            },
            || match record.level {
                Level::ERROR => {
                    let err = RecordError::new(record.message.clone(), classified.error.clone());
                    hub.capture_error(&err);
                }
                Level::DEBUG | Level::INFO | Level::WARN => {
                    if let Some(level) = convert_level(record.level) {
                        hub.capture_message(&record.message, level);
                    }
                }
                _ => {}
            },
        );
        Ok(())
    }
}

impl<H: Handler> Handler for SentryHandler<H> {
    type Err = H::Err;

    fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }

    fn handle(&self, cx: &LogContext, record: &Record) -> Result<(), Self::Err> {
        if self.levels.contains(&record.level) {
            if let Err(err) = self.forward(cx, record) {
                sentry_debug!("[SentryHandler] dropped {} record: {}", record.level, err);
            }
        }
        self.inner.handle(cx, record)
    }

    /// Binds `attrs` to the derived handler.
    ///
    /// Attributes bound by an earlier `with_attrs` call are not forwarded
    /// by the derived handler; they only reach the wrapped handler.
    fn with_attrs(&self, attrs: &[Attr]) -> Self {
        self.derive(self.inner.with_attrs(attrs), attrs)
    }

    fn with_group(&self, name: &str) -> Self {
        self.derive(self.inner.with_group(name), &[])
    }
}

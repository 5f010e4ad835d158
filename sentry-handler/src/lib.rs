//! Sentry integration for structured log handlers.
//!
//! This mainly provides the [`SentryHandler`], which wraps another [`Handler`]
//! and forwards [`Record`]s of selected levels to Sentry. Records at
//! [`Level::ERROR`] are captured as exceptions, records at [`Level::DEBUG`],
//! [`Level::INFO`] and [`Level::WARN`] as messages. Every record is passed on
//! to the wrapped handler, whether or not it was forwarded.
//!
//! Record attributes are sorted as follows:
//!
//! - Attributes with a key starting with `"tag_"` become Sentry tags, keeping
//!   the prefix.
//! - The value of an `"err"` or `"error"` attribute holding an error becomes
//!   the source of the captured exception. Any other value under these keys
//!   is reported as context.
//! - The `time`, `level`, `source` and `msg` keys are ignored.
//! - Everything else is attached to the event as the `"slog"` context.
//!
//! # Examples
//!
//! ```
//! use sentry_handler::{Discard, Handler, Level, LogContext, Record, SentryHandler};
//!
//! let handler = SentryHandler::new(Discard, [Level::ERROR, Level::WARN]);
//!
//! # let events = sentry::test::with_captured_events(|| {
//! let record = Record::new(Level::WARN, "disk almost full")
//!     .with_attr("mount", "/var")
//!     .with_attr("tag_host", "db-1");
//! handler.handle(&LogContext::new(), &record).unwrap();
//! # });
//! # let event = events.into_iter().next().unwrap();
//!
//! assert_eq!(event.message.as_deref(), Some("disk almost full"));
//! assert_eq!(event.tags["tag_host"], "db-1");
//! ```
//!
//! Attributes which should be reported with every record can be bound to a
//! derived handler:
//!
//! ```
//! use sentry_handler::{Attr, Handler, Level, LogHandler, SentryHandler};
//!
//! let handler = SentryHandler::new(LogHandler::new(), vec![Level::ERROR])
//!     .with_attrs(&[Attr::new("service", "billing")]);
//! ```
//!
//! A record is reported to the [`Hub`](sentry_core::Hub) bound to its
//! [`LogContext`], or to the current hub if the context has none.

#![doc(html_favicon_url = "https://sentry-brand.storage.googleapis.com/favicon.ico")]
#![doc(html_logo_url = "https://sentry-brand.storage.googleapis.com/sentry-glyph-black.png")]
#![warn(missing_docs)]
#![deny(unsafe_code)]

mod converters;
mod error;
mod handler;
mod log_handler;
mod record;

pub use converters::{convert_level, ClassifiedAttrs, ERROR_KEY, ERR_KEY, TAG_PREFIX};
pub use error::{ForwardError, RecordError};
pub use handler::{SentryHandler, CONTEXT_KEY};
pub use log_handler::{convert_log_level, Discard, LogHandler};
pub use record::{
    Attr, Handler, Level, LogContext, Record, SharedError, Value, LEVEL_KEY, MESSAGE_KEY,
    SOURCE_KEY, TIME_KEY,
};

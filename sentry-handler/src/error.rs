use std::error::Error;
use std::fmt;

use crate::record::SharedError;

/// The error reported to Sentry for records at [`Level::ERROR`].
///
/// It pairs the record message with the error carried in the record's
/// `err` or `error` attribute. The carried error is exposed as the
/// [`source`](Error::source), so Sentry records both in the exception chain.
///
/// [`Level::ERROR`]: crate::Level::ERROR
#[derive(Clone, Debug, Default)]
pub struct RecordError {
    message: String,
    source: Option<SharedError>,
}

impl RecordError {
    /// Creates a new error from a record message and an optional carried error.
    pub fn new<M: Into<String>>(message: M, source: Option<SharedError>) -> Self {
        RecordError {
            message: message.into(),
            source,
        }
    }

    /// The record message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The carried error, if any.
    pub fn inner(&self) -> Option<&SharedError> {
        self.source.as_ref()
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.message.is_empty(), &self.source) {
            (false, Some(source)) => write!(f, "{}: {}", self.message, source),
            (true, Some(source)) => write!(f, "{source}"),
            (_, None) => f.write_str(&self.message),
        }
    }
}

impl Error for RecordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn Error + 'static))
    }
}

/// Reasons a record could not be forwarded to Sentry.
///
/// These never reach the caller of [`Handler::handle`](crate::Handler::handle).
/// They are printed through `sentry_debug!`, which only prints when the
/// current hub's client has `debug` enabled. With no client bound at all,
/// which is the usual cause of [`ForwardError::NoClient`], nothing is printed.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// The resolved hub has no client bound.
    #[error("sentry: no client bound to the hub")]
    NoClient,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[derive(Debug)]
    struct TheError;

    impl fmt::Display for TheError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("the error")
        }
    }

    impl Error for TheError {}

    #[test]
    fn test_record_error_display() {
        let cases = [
            (
                RecordError::new("the message", Some(Arc::new(TheError))),
                "the message: the error",
            ),
            (RecordError::new("", Some(Arc::new(TheError))), "the error"),
            (RecordError::new("the message", None), "the message"),
            (RecordError::default(), ""),
        ];

        for (i, (err, expected)) in cases.iter().enumerate() {
            assert_eq!(&err.to_string(), expected, "case {i}");
        }
    }

    #[test]
    fn test_record_error_unwraps_to_carried_error() {
        let carried: SharedError = Arc::new(TheError);
        let err = RecordError::new("the message", Some(carried.clone()));

        assert!(Arc::ptr_eq(err.inner().unwrap(), &carried));
        assert_eq!(err.source().unwrap().to_string(), "the error");
        assert!(err.source().unwrap().is::<TheError>());
        assert!(RecordError::new("the message", None).source().is_none());
    }
}

use std::convert::Infallible;
use std::sync::Arc;

use log::kv::{self, Key, Source, VisitSource};

use crate::record::{Attr, Handler, Level, LogContext, Record, Value};

const DEFAULT_TARGET: &str = "sentry_handler";

/// Converts a record [`Level`] to a [`log::Level`].
pub fn convert_log_level(level: Level) -> log::Level {
    if level >= Level::ERROR {
        log::Level::Error
    } else if level >= Level::WARN {
        log::Level::Warn
    } else if level >= Level::INFO {
        log::Level::Info
    } else if level >= Level::DEBUG {
        log::Level::Debug
    } else {
        log::Level::Trace
    }
}

/// A [`Handler`] which writes records to the [`log`] facade.
///
/// Attributes are passed along as structured key-values. Groups are
/// flattened into dotted keys.
#[derive(Clone, Debug)]
pub struct LogHandler {
    target: Arc<str>,
    group: Option<String>,
    attrs: Arc<[Attr]>,
}

impl Default for LogHandler {
    fn default() -> Self {
        Self {
            target: Arc::from(DEFAULT_TARGET),
            group: None,
            attrs: Arc::from(Vec::new()),
        }
    }
}

impl LogHandler {
    /// Creates a new `LogHandler` logging to the `sentry_handler` target.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log target.
    #[must_use]
    pub fn target(mut self, target: &str) -> Self {
        self.target = Arc::from(target);
        self
    }

    fn qualify(&self, key: &str) -> String {
        match &self.group {
            Some(group) => format!("{group}.{key}"),
            None => key.to_owned(),
        }
    }

    fn flatten_into(&self, prefix: &str, attr: &Attr, out: &mut Vec<(String, String)>) {
        let key = if prefix.is_empty() {
            self.qualify(&attr.key)
        } else {
            format!("{prefix}.{}", attr.key)
        };
        match &attr.value {
            Value::Group(attrs) => {
                for nested in attrs {
                    self.flatten_into(&key, nested, out);
                }
            }
            value => out.push((key, value.to_string())),
        }
    }

    fn pairs<'a, I>(&self, attrs: I) -> Vec<(String, String)>
    where
        I: IntoIterator<Item = &'a Attr>,
    {
        let mut out = Vec::new();
        for attr in attrs {
            self.flatten_into("", attr, &mut out);
        }
        out
    }
}

struct Pairs<'a>(&'a [(String, String)]);

impl Source for Pairs<'_> {
    fn visit<'kvs>(&'kvs self, visitor: &mut dyn VisitSource<'kvs>) -> Result<(), kv::Error> {
        for (key, value) in self.0 {
            visitor.visit_pair(Key::from_str(key), kv::Value::from(value.as_str()))?;
        }
        Ok(())
    }
}

impl Handler for LogHandler {
    type Err = Infallible;

    fn enabled(&self, level: Level) -> bool {
        let level = convert_log_level(level);
        level <= log::max_level()
            && log::logger().enabled(
                &log::Metadata::builder()
                    .level(level)
                    .target(&self.target)
                    .build(),
            )
    }

    fn handle(&self, _cx: &LogContext, record: &Record) -> Result<(), Self::Err> {
        let level = convert_log_level(record.level);
        if level > log::max_level() {
            return Ok(());
        }

        let mut pairs: Vec<_> = self
            .attrs
            .iter()
            .map(|attr| (attr.key.clone(), attr.value.to_string()))
            .collect();
        pairs.extend(self.pairs(record.attrs()));
        let source = Pairs(&pairs);

        log::logger().log(
            &log::Record::builder()
                .args(format_args!("{}", record.message))
                .level(level)
                .target(&self.target)
                .key_values(&source)
                .build(),
        );
        Ok(())
    }

    fn with_attrs(&self, attrs: &[Attr]) -> Self {
        let mut stored = self.attrs.to_vec();
        stored.extend(
            self.pairs(attrs)
                .into_iter()
                .map(|(key, value)| Attr::new(key, value)),
        );
        Self {
            attrs: Arc::from(stored),
            ..self.clone()
        }
    }

    fn with_group(&self, name: &str) -> Self {
        Self {
            group: Some(self.qualify(name)),
            ..self.clone()
        }
    }
}

/// A [`Handler`] which drops every record.
#[derive(Clone, Copy, Debug, Default)]
pub struct Discard;

impl Handler for Discard {
    type Err = Infallible;

    fn enabled(&self, _level: Level) -> bool {
        false
    }

    fn handle(&self, _cx: &LogContext, _record: &Record) -> Result<(), Self::Err> {
        Ok(())
    }

    fn with_attrs(&self, _attrs: &[Attr]) -> Self {
        Discard
    }

    fn with_group(&self, _name: &str) -> Self {
        Discard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pairs: &[(String, String)]) -> Vec<&str> {
        pairs.iter().map(|(key, _)| key.as_str()).collect()
    }

    #[test]
    fn test_convert_log_level() {
        assert_eq!(convert_log_level(Level::ERROR), log::Level::Error);
        assert_eq!(convert_log_level(Level(12)), log::Level::Error);
        assert_eq!(convert_log_level(Level(6)), log::Level::Warn);
        assert_eq!(convert_log_level(Level::INFO), log::Level::Info);
        assert_eq!(convert_log_level(Level::DEBUG), log::Level::Debug);
        assert_eq!(convert_log_level(Level(-8)), log::Level::Trace);
    }

    #[test]
    fn test_groups_qualify_keys() {
        let handler = LogHandler::new()
            .with_attrs(&[Attr::new("service", "api")])
            .with_group("request")
            .with_attrs(&[Attr::new("id", 7)])
            .with_group("user");

        let stored: Vec<_> = handler.attrs.iter().map(|attr| attr.key.as_str()).collect();
        assert_eq!(stored, ["service", "request.id"]);

        let pairs = handler.pairs(&[Attr::new(
            "address",
            vec![Attr::new("city", "Vienna"), Attr::new("zip", 1010)],
        )]);
        assert_eq!(
            keys(&pairs),
            ["request.user.address.city", "request.user.address.zip"]
        );
        assert_eq!(pairs[1].1, "1010");
    }

    #[test]
    fn test_discard() {
        let record = Record::new(Level::ERROR, "dropped");
        assert!(!Discard.enabled(Level::ERROR));
        assert!(Discard.handle(&LogContext::new(), &record).is_ok());
    }
}

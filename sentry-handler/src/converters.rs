use std::collections::BTreeMap;

use sentry_core::protocol::{Context, Map};

use crate::record::{Attr, Level, SharedError, LEVEL_KEY, MESSAGE_KEY, SOURCE_KEY, TIME_KEY};

/// Attributes with keys starting with this prefix become Sentry tags.
pub const TAG_PREFIX: &str = "tag_";
/// Short key for an attribute carrying an error.
pub const ERR_KEY: &str = "err";
/// Long key for an attribute carrying an error.
pub const ERROR_KEY: &str = "error";

const DEFAULT_KEYS: [&str; 6] = [
    TIME_KEY,
    LEVEL_KEY,
    SOURCE_KEY,
    MESSAGE_KEY,
    ERR_KEY,
    ERROR_KEY,
];

/// Converts a record [`Level`] to a Sentry [`Level`](sentry_core::Level).
///
/// Returns `None` for levels without a Sentry equivalent.
pub fn convert_level(level: Level) -> Option<sentry_core::Level> {
    match level {
        Level::DEBUG => Some(sentry_core::Level::Debug),
        Level::INFO => Some(sentry_core::Level::Info),
        Level::WARN => Some(sentry_core::Level::Warning),
        Level::ERROR => Some(sentry_core::Level::Error),
        _ => None,
    }
}

/// The attributes of a record, sorted into what Sentry should receive.
#[derive(Clone, Debug, Default)]
pub struct ClassifiedAttrs {
    /// Free-form attributes, reported as a context.
    pub context: BTreeMap<String, String>,
    /// Attributes with the [`TAG_PREFIX`], reported as tags.
    pub tags: BTreeMap<String, String>,
    /// The error carried in an `err` or `error` attribute.
    pub error: Option<SharedError>,
}

impl ClassifiedAttrs {
    /// Classifies `attrs` in order.
    ///
    /// Later attributes overwrite earlier ones with the same key, and the
    /// last error wins.
    pub fn from_attrs<'a, I>(attrs: I) -> Self
    where
        I: IntoIterator<Item = &'a Attr>,
    {
        let mut classified = Self::default();
        for attr in attrs {
            classified.add(attr);
        }
        classified
    }

    /// Classifies a single attribute.
    pub fn add(&mut self, attr: &Attr) {
        let key = attr.key.as_str();
        if key.starts_with(TAG_PREFIX) {
            self.tags.insert(attr.key.clone(), attr.value.to_string());
        } else if !DEFAULT_KEYS.contains(&key) {
            self.context.insert(attr.key.clone(), attr.value.to_string());
        } else if key == ERR_KEY || key == ERROR_KEY {
            match attr.value.as_error() {
                Some(err) => self.error = Some(err.clone()),
                None => {
                    self.context.insert(attr.key.clone(), attr.value.to_string());
                }
            }
        }
    }

    /// Converts the context attributes into a Sentry [`Context`].
    pub fn to_context(&self) -> Option<Context> {
        if self.context.is_empty() {
            return None;
        }
        let map: Map<_, _> = self
            .context
            .iter()
            .map(|(key, value)| (key.clone(), value.as_str().into()))
            .collect();
        Some(Context::Other(map))
    }
}

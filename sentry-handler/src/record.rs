use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use sentry_core::Hub;

/// Key under which a handler renders the record time.
pub const TIME_KEY: &str = "time";
/// Key under which a handler renders the record level.
pub const LEVEL_KEY: &str = "level";
/// Key under which a handler renders the source location.
pub const SOURCE_KEY: &str = "source";
/// Key under which a handler renders the record message.
pub const MESSAGE_KEY: &str = "msg";

/// An error value that can be shared between records and handlers.
pub type SharedError = Arc<dyn Error + Send + Sync + 'static>;

/// The severity of a [`Record`].
///
/// Levels are plain integers, so applications may define their own levels
/// in between the well-known ones.
///
/// The default level is [`Level::INFO`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(pub i32);

impl Level {
    /// Debug level.
    pub const DEBUG: Level = Level(-4);
    /// Info level.
    pub const INFO: Level = Level(0);
    /// Warn level.
    pub const WARN: Level = Level(4);
    /// Error level.
    pub const ERROR: Level = Level(8);
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Level::DEBUG => f.write_str("DEBUG"),
            Level::INFO => f.write_str("INFO"),
            Level::WARN => f.write_str("WARN"),
            Level::ERROR => f.write_str("ERROR"),
            Level(other) => write!(f, "LEVEL({other})"),
        }
    }
}

/// The value of an [`Attr`].
#[derive(Clone, Debug)]
pub enum Value {
    /// An absent value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    Uint(u64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
    /// An error object.
    Error(SharedError),
    /// A nested group of attributes.
    Group(Vec<Attr>),
}

impl Value {
    /// Creates an error value.
    pub fn error<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Value::Error(Arc::new(err))
    }

    /// Returns the contained error, if this value is one.
    pub fn as_error(&self) -> Option<&SharedError> {
        match self {
            Value::Error(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Error(err) => write!(f, "{err}"),
            Value::Group(attrs) => {
                f.write_str("[")?;
                for (i, attr) in attrs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}={}", attr.key, attr.value)?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
    f32 => Float,
    f64 => Float,
    String => String,
    &str => String,
    SharedError => Error,
    Vec<Attr> => Group,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A key-value pair attached to a [`Record`] or bound to a [`Handler`].
#[derive(Clone, Debug)]
pub struct Attr {
    /// The attribute key.
    pub key: String,
    /// The attribute value.
    pub value: Value,
}

impl Attr {
    /// Creates a new attribute.
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Attr {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A single log event.
#[derive(Clone, Debug)]
pub struct Record {
    /// When the record was created.
    pub time: SystemTime,
    /// The severity of the record.
    pub level: Level,
    /// The log message.
    pub message: String,
    attrs: Vec<Attr>,
}

impl Record {
    /// Creates a record with the current time and no attributes.
    pub fn new<M: Into<String>>(level: Level, message: M) -> Self {
        Record {
            time: SystemTime::now(),
            level,
            message: message.into(),
            attrs: Vec::new(),
        }
    }

    /// Appends an attribute, builder style.
    #[must_use]
    pub fn with_attr<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.attrs.push(Attr::new(key, value));
        self
    }

    /// Appends attributes in order.
    pub fn add_attrs<I: IntoIterator<Item = Attr>>(&mut self, attrs: I) {
        self.attrs.extend(attrs);
    }

    /// Iterates the attributes in declaration order.
    pub fn attrs(&self) -> impl Iterator<Item = &Attr> {
        self.attrs.iter()
    }

    /// The number of attributes on this record.
    pub fn num_attrs(&self) -> usize {
        self.attrs.len()
    }
}

/// Per-call context passed through [`Handler::handle`].
///
/// A context may carry the [`Hub`] that records handled under it should be
/// reported to.
#[derive(Clone, Default)]
pub struct LogContext {
    hub: Option<Arc<Hub>>,
}

impl LogContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a hub to this context.
    #[must_use]
    pub fn with_hub(mut self, hub: Arc<Hub>) -> Self {
        self.hub = Some(hub);
        self
    }

    /// The hub bound to this context, if any.
    pub fn hub(&self) -> Option<&Arc<Hub>> {
        self.hub.as_ref()
    }
}

impl fmt::Debug for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogContext")
            .field("hub", &self.hub.as_ref().map(|_| "Hub"))
            .finish()
    }
}

/// A sink for [`Record`]s.
///
/// Handlers can be derived with additional attributes or a group name.
/// Derivation never mutates the original handler.
pub trait Handler: Send + Sync {
    /// The error returned when a record could not be handled.
    type Err;

    /// Reports whether records at `level` are handled.
    fn enabled(&self, level: Level) -> bool;

    /// Handles a single record.
    fn handle(&self, cx: &LogContext, record: &Record) -> Result<(), Self::Err>;

    /// Returns a handler which includes `attrs` with every record.
    fn with_attrs(&self, attrs: &[Attr]) -> Self
    where
        Self: Sized;

    /// Returns a handler which qualifies subsequent attributes with `name`.
    fn with_group(&self, name: &str) -> Self
    where
        Self: Sized;
}

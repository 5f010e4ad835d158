use std::sync::Mutex;

use log::kv::{self, Key, Source, VisitSource};
use sentry_handler::{Attr, Handler, Level, LogContext, LogHandler, Record, SentryHandler};

struct Captured {
    level: log::Level,
    target: String,
    message: String,
    kvs: Vec<(String, String)>,
}

struct Collector<'a>(&'a mut Vec<(String, String)>);

impl<'kvs> VisitSource<'kvs> for Collector<'_> {
    fn visit_pair(&mut self, key: Key<'kvs>, value: kv::Value<'kvs>) -> Result<(), kv::Error> {
        self.0.push((key.as_str().to_owned(), value.to_string()));
        Ok(())
    }
}

struct CapturingLogger {
    records: Mutex<Vec<Captured>>,
}

impl log::Log for CapturingLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.target() != "muted"
    }

    fn log(&self, record: &log::Record<'_>) {
        let mut kvs = Vec::new();
        record
            .key_values()
            .visit(&mut Collector(&mut kvs))
            .unwrap();
        self.records.lock().unwrap().push(Captured {
            level: record.level(),
            target: record.target().to_owned(),
            message: record.args().to_string(),
            kvs,
        });
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    records: Mutex::new(Vec::new()),
};

// the logger is process-wide, so everything runs in a single test
#[test]
fn test_log_handler() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(log::LevelFilter::Debug);

    let handler = LogHandler::new()
        .target("billing")
        .with_attrs(&[Attr::new("service", "api")])
        .with_group("job");

    assert!(handler.enabled(Level::DEBUG));
    assert!(!handler.enabled(Level(-8)));
    assert!(!LogHandler::new().target("muted").enabled(Level::ERROR));

    let record = Record::new(Level::WARN, "retrying").with_attr("attempt", 2);
    handler.handle(&LogContext::new(), &record).unwrap();
    handler
        .handle(&LogContext::new(), &Record::new(Level(-8), "too chatty"))
        .unwrap();

    // forwarding without a client must not affect local output
    let forwarding = SentryHandler::new(LogHandler::new(), [Level::ERROR]);
    forwarding
        .handle(
            &LogContext::new(),
            &Record::new(Level::ERROR, "local only").with_attr("tag_env", "dev"),
        )
        .unwrap();

    let records = LOGGER.records.lock().unwrap();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].level, log::Level::Warn);
    assert_eq!(records[0].target, "billing");
    assert_eq!(records[0].message, "retrying");
    assert_eq!(
        records[0].kvs,
        [
            ("service".to_owned(), "api".to_owned()),
            ("job.attempt".to_owned(), "2".to_owned()),
        ]
    );

    assert_eq!(records[1].level, log::Level::Error);
    assert_eq!(records[1].target, "sentry_handler");
    assert_eq!(records[1].message, "local only");
    assert_eq!(
        records[1].kvs,
        [("tag_env".to_owned(), "dev".to_owned())]
    );
}

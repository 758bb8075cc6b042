use chrono::{DateTime, SecondsFormat, Utc};

/// A source of the current time that tests can pin.
pub(crate) struct Clock {
    now: Box<dyn Fn() -> DateTime<Utc>>,
}

impl Clock {
    pub(crate) fn new(now: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        Self { now: Box::new(now) }
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        (self.now)()
    }
}

/// RFC 3339 timestamp with nanosecond precision, as stored in layer metadata.
pub(crate) fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

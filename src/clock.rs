use chrono::{DateTime, FixedOffset, Offset, Utc};

/// India Standard Time, the offset hour-of-day rules are written against.
pub const IST_OFFSET_SECONDS: i32 = 330 * 60;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        let offset = FixedOffset::east_opt(IST_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix());
        Self::new(offset)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

#[test]
fn system_clock_offset_test() {
    let now = SystemClock::default().now();
    assert_eq!(now.offset().local_minus_utc(), IST_OFFSET_SECONDS);
}

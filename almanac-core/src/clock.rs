//! Wall-clock access for the scheduler.

use std::sync::Mutex;

use chrono::{DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDateTime, TimeZone, Utc};

/// Source of the current instant and of the host's timezone rules.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Turn a local wall-clock time into an absolute instant.
    fn resolve_local(&self, local: NaiveDateTime) -> Option<DateTime<Utc>>;
}

/// The host's clock and local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostClock;

impl Clock for HostClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn resolve_local(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        resolve_in(&Local, local)
    }
}

/// A clock that only moves when told to, pinned to a fixed UTC offset.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        FixedClock {
            now: Mutex::new(now),
        }
    }

    /// A clock reading `local` in UTC.
    pub fn utc(local: NaiveDateTime) -> Self {
        Self::new(local.and_utc().fixed_offset())
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        *self.now.lock().expect("mutex poisoned") = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("mutex poisoned");
        *now = *now + by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().expect("mutex poisoned").with_timezone(&Utc)
    }

    fn resolve_local(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        let offset = *self.now.lock().expect("mutex poisoned").offset();
        resolve_in(&offset, local)
    }
}

/// Resolve a wall time in `tz`. Times skipped by a DST jump move forward by
/// the usual one hour; repeated times take the earlier instant.
fn resolve_in<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => tz
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn fixed_clock_resolves_in_its_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = offset.from_local_datetime(&local(2024, 1, 1, 12, 0)).unwrap();
        let clock = FixedClock::new(now);

        let resolved = clock.resolve_local(local(2024, 1, 1, 9, 0)).unwrap();

        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap());
        assert_eq!(clock.now(), Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::utc(local(2024, 1, 1, 9, 0));
        clock.advance(Duration::minutes(90));

        assert_eq!(clock.now(), Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap());
    }

    /// Central European rules for 2024 only: UTC+1, with UTC+2 from
    /// 2024-03-31 01:00 UTC until 2024-10-27 01:00 UTC.
    #[derive(Debug, Clone, Copy)]
    struct Cet2024;

    impl Cet2024 {
        fn winter() -> FixedOffset {
            FixedOffset::east_opt(3600).unwrap()
        }

        fn summer() -> FixedOffset {
            FixedOffset::east_opt(2 * 3600).unwrap()
        }
    }

    impl TimeZone for Cet2024 {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            Cet2024
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            // Earlier instant first, as chrono orders ambiguous results.
            let valid: Vec<FixedOffset> = [Self::summer(), Self::winter()]
                .into_iter()
                .filter(|offset| self.offset_from_utc_datetime(&(*local - *offset)) == *offset)
                .collect();

            match valid.as_slice() {
                [] => LocalResult::None,
                [offset] => LocalResult::Single(*offset),
                [earliest, latest, ..] => LocalResult::Ambiguous(*earliest, *latest),
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc >= local(2024, 3, 31, 1, 0) && *utc < local(2024, 10, 27, 1, 0) {
                Self::summer()
            } else {
                Self::winter()
            }
        }
    }

    #[test]
    fn ordinary_wall_time_resolves_in_zone() {
        let resolved = resolve_in(&Cet2024, local(2024, 6, 1, 12, 0)).unwrap();
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap());

        let resolved = resolve_in(&Cet2024, local(2024, 1, 15, 9, 0)).unwrap();
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap());
    }

    #[test]
    fn skipped_wall_time_moves_one_hour_later() {
        assert!(matches!(
            Cet2024.from_local_datetime(&local(2024, 3, 31, 2, 30)),
            LocalResult::None
        ));

        let resolved = resolve_in(&Cet2024, local(2024, 3, 31, 2, 30)).unwrap();

        // 03:30 summer time.
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 3, 31, 1, 30, 0).unwrap());
    }

    #[test]
    fn repeated_wall_time_takes_earlier_instant() {
        assert!(matches!(
            Cet2024.from_local_datetime(&local(2024, 10, 27, 2, 30)),
            LocalResult::Ambiguous(_, _)
        ));

        let resolved = resolve_in(&Cet2024, local(2024, 10, 27, 2, 30)).unwrap();

        // 02:30 summer time, the first pass through the repeated hour.
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 10, 27, 0, 30, 0).unwrap());
    }

    #[test]
    fn resolve_in_utc_is_identity() {
        let resolved = resolve_in(&Utc, local(2024, 3, 31, 2, 30)).unwrap();
        assert_eq!(resolved.naive_utc(), local(2024, 3, 31, 2, 30));
    }
}

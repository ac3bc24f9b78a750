use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone};
use rand::Rng;

/// `1000-01-01 00:00:00` UTC
pub const MIN_DATETIME: i64 = -30_610_224_000;
/// `9999-12-31 23:59:59` UTC
pub const MAX_DATETIME: i64 = 253_402_300_799;
/// `1970-01-01 00:00:01` UTC
pub const MIN_TIMESTAMP: i64 = 1;
/// `2038-01-19 03:14:07` UTC
pub const MAX_TIMESTAMP: i64 = 2_147_483_647;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Epoch window a temporal kind draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    DateTime,
    Timestamp,
}

impl Window {
    fn bounds(self) -> (i64, i64) {
        match self {
            Window::DateTime => (MIN_DATETIME, MAX_DATETIME),
            Window::Timestamp => (MIN_TIMESTAMP, MAX_TIMESTAMP),
        }
    }
}

fn random_instant_in<Tz: TimeZone, R: Rng + ?Sized>(
    rng: &mut R,
    window: Window,
    tz: &Tz,
) -> DateTime<Tz> {
    let (min, max) = window.bounds();
    let secs = rng.random_range(min..max);
    // Every second of the window is representable, so the fallback is never taken.
    DateTime::from_timestamp(secs, 0)
        .unwrap_or_default()
        .with_timezone(tz)
}

fn random_instant<R: Rng + ?Sized>(rng: &mut R, window: Window) -> DateTime<Local> {
    random_instant_in(rng, window, &Local)
}

/// Whether `naive` names exactly one instant in `tz`, i.e. it is neither repeated nor
/// skipped by a daylight-saving transition.
pub fn is_unambiguous_in<Tz: TimeZone>(tz: &Tz, naive: &NaiveDateTime) -> bool {
    matches!(tz.from_local_datetime(naive), LocalResult::Single(_))
}

pub fn is_unambiguous_local(naive: &NaiveDateTime) -> bool {
    is_unambiguous_in(&Local, naive)
}

/// A random wall-clock reading of `tz` in `window`, redrawn until it names a single instant.
pub fn gen_local_datetime_in<Tz: TimeZone, R: Rng + ?Sized>(
    rng: &mut R,
    window: Window,
    tz: &Tz,
) -> NaiveDateTime {
    loop {
        let naive = random_instant_in(rng, window, tz).naive_local();
        if is_unambiguous_in(tz, &naive) {
            return naive;
        }
    }
}

pub fn gen_local_datetime<R: Rng + ?Sized>(rng: &mut R, window: Window) -> NaiveDateTime {
    gen_local_datetime_in(rng, window, &Local)
}

pub fn gen_date<R: Rng + ?Sized>(rng: &mut R) -> String {
    random_instant(rng, Window::DateTime)
        .format(DATE_FORMAT)
        .to_string()
}

pub fn gen_time<R: Rng + ?Sized>(rng: &mut R) -> String {
    random_instant(rng, Window::Timestamp)
        .format(TIME_FORMAT)
        .to_string()
}

pub fn gen_datetime<R: Rng + ?Sized>(rng: &mut R, window: Window) -> String {
    gen_local_datetime(rng, window)
        .format(DATETIME_FORMAT)
        .to_string()
}

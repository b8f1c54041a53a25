//! Static code → zone table and UTC conversions.

use super::{TimeInput, TimezoneError};
use chrono::offset::LocalResult;
use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};
use serde::Serialize;

/// Timezone code applied when a caller does not name one.
pub const DEFAULT_TIMEZONE_CODE: &str = "IST";

/// Closed set of timezone codes accepted at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedZone {
    Utc,
    Ist,
    Est,
    Pst,
    Gmt,
    Cet,
    Jst,
    Aest,
}

impl SupportedZone {
    /// Every supported zone, in directory listing order.
    pub const ALL: [SupportedZone; 8] = [
        Self::Utc,
        Self::Ist,
        Self::Est,
        Self::Pst,
        Self::Gmt,
        Self::Cet,
        Self::Jst,
        Self::Aest,
    ];

    /// Looks up a zone by its exact short code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|zone| zone.code() == code)
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Utc => "UTC",
            Self::Ist => "IST",
            Self::Est => "EST",
            Self::Pst => "PST",
            Self::Gmt => "GMT",
            Self::Cet => "CET",
            Self::Jst => "JST",
            Self::Aest => "AEST",
        }
    }

    /// Canonical IANA zone identifier.
    pub fn zone_id(self) -> &'static str {
        self.tz().name()
    }

    pub fn tz(self) -> Tz {
        match self {
            Self::Utc => Tz::UTC,
            Self::Ist => Tz::Asia__Kolkata,
            Self::Est => Tz::America__New_York,
            Self::Pst => Tz::America__Los_Angeles,
            Self::Gmt => Tz::Europe__London,
            Self::Cet => Tz::Europe__Paris,
            Self::Jst => Tz::Asia__Tokyo,
            Self::Aest => Tz::Australia__Sydney,
        }
    }

    /// Display label, `"<code> (<zone id>)"`.
    pub fn display_name(self) -> String {
        format!("{} ({})", self.code(), self.zone_id())
    }
}

/// Display metadata for one supported zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimezoneInfo {
    pub code: &'static str,
    /// IANA zone identifier.
    pub timezone: &'static str,
    pub display_name: String,
    /// `+HH:MM` or `-HH:MM`.
    pub utc_offset: String,
}

fn lookup(code: &str) -> Result<SupportedZone, TimezoneError> {
    SupportedZone::from_code(code).ok_or_else(|| TimezoneError::UnsupportedTimezone(code.to_string()))
}

/// Resolves a code to its IANA zone identifier.
///
/// # Errors
/// - `UnsupportedTimezone` when `code` is not in the directory.
pub fn resolve(code: &str) -> Result<&'static str, TimezoneError> {
    lookup(code).map(SupportedZone::zone_id)
}

/// Pure membership test.
pub fn is_supported(code: &str) -> bool {
    SupportedZone::from_code(code).is_some()
}

/// Converts caller input to a UTC instant.
///
/// Offset-carrying input converts by its own offset. Wall-clock input is
/// read as local time in the zone named by `code`, preferring standard time
/// around DST transitions: a repeated local time (fold) takes the standard
/// offset, and a skipped local time (gap) is shifted by the standard offset.
///
/// # Errors
/// - `UnsupportedTimezone` when `code` is not in the directory, even for
///   offset-carrying input.
pub fn to_utc(input: &TimeInput, code: &str) -> Result<DateTime<Utc>, TimezoneError> {
    let zone = lookup(code)?;
    let instant = match input {
        TimeInput::Fixed(value) => value.with_timezone(&Utc),
        TimeInput::Local(naive) => match zone.tz().from_local_datetime(naive) {
            LocalResult::Single(local) => local.with_timezone(&Utc),
            LocalResult::Ambiguous(first, second) => {
                if is_standard_time(&second) && !is_standard_time(&first) {
                    second.with_timezone(&Utc)
                } else {
                    first.with_timezone(&Utc)
                }
            }
            LocalResult::None => {
                let standard = zone
                    .tz()
                    .offset_from_utc_datetime(naive)
                    .base_utc_offset();
                Utc.from_utc_datetime(&(*naive - standard))
            }
        },
    };
    Ok(instant)
}

fn is_standard_time(local: &DateTime<Tz>) -> bool {
    local.offset().dst_offset().is_zero()
}

/// Converts a stored UTC instant into the zone named by `code`.
pub fn from_utc(instant: DateTime<Utc>, code: &str) -> Result<DateTime<Tz>, TimezoneError> {
    let zone = lookup(code)?;
    Ok(instant.with_timezone(&zone.tz()))
}

/// Formats an instant as `YYYY-MM-DD HH:MM:SS <CODE>` in the given zone.
pub fn format_local(instant: DateTime<Utc>, code: &str) -> Result<String, TimezoneError> {
    let local = from_utc(instant, code)?;
    Ok(format!("{} {code}", local.format("%Y-%m-%d %H:%M:%S")))
}

/// Current time in the zone named by `code`.
pub fn now_in(code: &str) -> Result<DateTime<Tz>, TimezoneError> {
    from_utc(Utc::now(), code)
}

/// Describes a zone using the offset in effect right now.
///
/// The offset reflects query time, not any particular event instant.
pub fn describe(code: &str) -> Result<TimezoneInfo, TimezoneError> {
    describe_at(code, Utc::now())
}

/// Describes a zone using the offset in effect at `at`.
pub fn describe_at(code: &str, at: DateTime<Utc>) -> Result<TimezoneInfo, TimezoneError> {
    let zone = lookup(code)?;
    Ok(info_for(zone, at))
}

/// Lists all supported zones in directory order, offsets as of now.
pub fn list_all() -> Vec<TimezoneInfo> {
    let now = Utc::now();
    SupportedZone::ALL
        .into_iter()
        .map(|zone| info_for(zone, now))
        .collect()
}

fn info_for(zone: SupportedZone, at: DateTime<Utc>) -> TimezoneInfo {
    let offset_seconds = zone
        .tz()
        .offset_from_utc_datetime(&at.naive_utc())
        .fix()
        .local_minus_utc();
    TimezoneInfo {
        code: zone.code(),
        timezone: zone.zone_id(),
        display_name: zone.display_name(),
        utc_offset: format_offset(offset_seconds),
    }
}

fn format_offset(offset_seconds: i32) -> String {
    let sign = if offset_seconds < 0 { '-' } else { '+' };
    let total_minutes = offset_seconds.unsigned_abs() / 60;
    format!("{sign}{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> TimeInput {
        TimeInput::Local(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap(),
        )
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn resolve_maps_codes_to_zone_ids() {
        assert_eq!(resolve("IST").unwrap(), "Asia/Kolkata");
        assert_eq!(resolve("AEST").unwrap(), "Australia/Sydney");
        assert_eq!(resolve("UTC").unwrap(), "UTC");
        assert_eq!(
            resolve("XYZ").unwrap_err(),
            TimezoneError::UnsupportedTimezone("XYZ".to_string())
        );
    }

    #[test]
    fn membership_is_exact_match() {
        assert!(is_supported("EST"));
        assert!(!is_supported("est"));
        assert!(!is_supported(""));
    }

    #[test]
    fn naive_input_is_read_in_code_zone() {
        let converted = to_utc(&naive(2025, 1, 15, 10, 0), "IST").unwrap();
        assert_eq!(converted, utc(2025, 1, 15, 4, 30));

        let converted = to_utc(&naive(2025, 7, 1, 9, 0), "EST").unwrap();
        assert_eq!(converted, utc(2025, 7, 1, 13, 0));
    }

    #[test]
    fn fixed_input_ignores_code_offset() {
        let input = TimeInput::parse("2025-01-15T10:00:00+09:00").unwrap();
        assert_eq!(to_utc(&input, "PST").unwrap(), utc(2025, 1, 15, 1, 0));
    }

    #[test]
    fn fixed_input_still_requires_supported_code() {
        let input = TimeInput::parse("2025-01-15T10:00:00Z").unwrap();
        assert!(matches!(
            to_utc(&input, "XYZ"),
            Err(TimezoneError::UnsupportedTimezone(_))
        ));
    }

    #[test]
    fn dst_fold_resolves_to_standard_time() {
        // 01:30 happens twice in New York on 2025-11-02; EST is -05:00.
        let converted = to_utc(&naive(2025, 11, 2, 1, 30), "EST").unwrap();
        assert_eq!(converted, utc(2025, 11, 2, 6, 30));

        // 02:30 happens twice in Sydney on 2025-04-06; AEST is +10:00.
        let converted = to_utc(&naive(2025, 4, 6, 2, 30), "AEST").unwrap();
        assert_eq!(converted, utc(2025, 4, 5, 16, 30));
    }

    #[test]
    fn dst_gap_is_shifted_by_standard_offset() {
        // 02:30 is skipped in New York on 2025-03-09.
        let converted = to_utc(&naive(2025, 3, 9, 2, 30), "EST").unwrap();
        assert_eq!(converted, utc(2025, 3, 9, 7, 30));

        // 02:30 is skipped in Paris on 2025-03-30; CET is +01:00.
        let converted = to_utc(&naive(2025, 3, 30, 2, 30), "CET").unwrap();
        assert_eq!(converted, utc(2025, 3, 30, 1, 30));
    }

    #[test]
    fn now_in_reports_current_instant_in_zone() {
        let before = Utc::now();
        let now = now_in("JST").unwrap();
        let after = Utc::now();

        assert_eq!(now.timezone(), Tz::Asia__Tokyo);
        let instant = now.with_timezone(&Utc);
        assert!(before <= instant && instant <= after);
        assert!(matches!(
            now_in("XYZ"),
            Err(TimezoneError::UnsupportedTimezone(_))
        ));
    }

    #[test]
    fn from_utc_round_trips_wall_clock() {
        let input = naive(2025, 4, 3, 18, 45);
        for zone in SupportedZone::ALL {
            let stored = to_utc(&input, zone.code()).unwrap();
            let back = from_utc(stored, zone.code()).unwrap().naive_local();
            assert_eq!(TimeInput::Local(back), input, "round trip in {}", zone.code());
        }
    }

    #[test]
    fn format_local_appends_code() {
        let text = format_local(utc(2025, 1, 15, 4, 30), "IST").unwrap();
        assert_eq!(text, "2025-01-15 10:00:00 IST");
        assert!(format_local(utc(2025, 1, 15, 4, 30), "XYZ").is_err());
    }

    #[test]
    fn describe_at_uses_offset_of_given_instant() {
        let winter = describe_at("EST", utc(2025, 1, 15, 12, 0)).unwrap();
        assert_eq!(winter.utc_offset, "-05:00");
        assert_eq!(winter.display_name, "EST (America/New_York)");

        let summer = describe_at("EST", utc(2025, 7, 15, 12, 0)).unwrap();
        assert_eq!(summer.utc_offset, "-04:00");

        let india = describe_at("IST", utc(2025, 7, 15, 12, 0)).unwrap();
        assert_eq!(india.utc_offset, "+05:30");
        assert_eq!(india.timezone, "Asia/Kolkata");
    }

    #[test]
    fn list_all_keeps_directory_order() {
        let codes: Vec<_> = list_all().into_iter().map(|info| info.code).collect();
        assert_eq!(
            codes,
            vec!["UTC", "IST", "EST", "PST", "GMT", "CET", "JST", "AEST"]
        );
    }

    #[test]
    fn offset_formatting_handles_sign_and_minutes() {
        assert_eq!(format_offset(0), "+00:00");
        assert_eq!(format_offset(19_800), "+05:30");
        assert_eq!(format_offset(-28_800), "-08:00");
        assert_eq!(format_offset(-9_000), "-02:30");
    }
}

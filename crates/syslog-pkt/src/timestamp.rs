// Copyright (C) 2025-present The LogWeave Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Normalization of the date tokens found across the syslog dialects.
//!
//! The dialect grammars only delimit the date token; this module gives it a
//! meaning. An ordered list of candidate grammars is tried until one consumes
//! the whole token. Order matters: the BSD form without a year is a strict
//! prefix of the form with one. BSD syslog omits the year entirely, so the
//! omitted-year grammar fills in the year of the supplied reference instant
//! (the receipt time). Every result is normalized to UTC.

use chrono::{
    format::{parse, Parsed, StrftimeItems},
    DateTime, Datelike, NaiveDateTime, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

/// Error type for date tokens no candidate grammar could consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum TimestampParsingError {
    #[strum(to_string = "date token '{0}' matches no candidate grammar")]
    UnrecognizedDate(String),
}

impl std::error::Error for TimestampParsingError {}

/// One candidate date grammar. A candidate either consumes the entire token
/// or declines; partial matches never produce a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum DateGrammar {
    /// RFC 3339 offset date-time, e.g. `2015-01-11T16:35:21.335785Z`.
    Rfc3339,
    /// ISO date-time with an RFC 822 style offset, e.g.
    /// `2015-01-11T16:35:21+0200`.
    OffsetNoColon,
    /// BSD `Mon d HH:MM:SS`, the year left to inference.
    BsdOmittedYear,
    /// Cisco-style `Mon d YYYY HH:MM:SS`.
    BsdWithYear,
}

impl DateGrammar {
    fn parse(&self, token: &str, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Rfc3339 => DateTime::parse_from_rfc3339(token)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Self::OffsetNoColon => {
                DateTime::parse_from_str(token, "%Y-%m-%dT%H:%M:%S%.f%z")
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            }
            Self::BsdOmittedYear => {
                let mut parsed = Parsed::new();
                parse(&mut parsed, token, StrftimeItems::new("%b %e %H:%M:%S")).ok()?;
                parsed.set_year(i64::from(reference.year())).ok()?;
                let date = parsed.to_naive_date().ok()?;
                let time = parsed.to_naive_time().ok()?;
                Some(Utc.from_utc_datetime(&date.and_time(time)))
            }
            Self::BsdWithYear => {
                NaiveDateTime::parse_from_str(token, "%b %e %Y %H:%M:%S")
                    .ok()
                    .map(|naive| Utc.from_utc_datetime(&naive))
            }
        }
    }
}

/// Ordered list of [`DateGrammar`] candidates, first full match wins.
///
/// Immutable after construction and freely shareable between workers; a
/// normalization depends only on its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampNormalizer {
    grammars: Vec<DateGrammar>,
}

impl Default for TimestampNormalizer {
    fn default() -> Self {
        Self {
            grammars: vec![
                DateGrammar::Rfc3339,
                DateGrammar::OffsetNoColon,
                DateGrammar::BsdOmittedYear,
                DateGrammar::BsdWithYear,
            ],
        }
    }
}

impl TimestampNormalizer {
    pub const fn new(grammars: Vec<DateGrammar>) -> Self {
        Self { grammars }
    }

    pub fn grammars(&self) -> &[DateGrammar] {
        &self.grammars
    }

    /// Normalize a raw date token to UTC. `reference` supplies the calendar
    /// year for tokens that omit one. Failure is reported, not recovered;
    /// choosing the fallback value is the caller's decision.
    pub fn normalize(
        &self,
        token: &str,
        reference: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, TimestampParsingError> {
        self.grammars
            .iter()
            .find_map(|grammar| grammar.parse(token, reference))
            .ok_or_else(|| TimestampParsingError::UnrecognizedDate(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap()
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_rfc3339_with_fraction() {
        let normalizer = TimestampNormalizer::default();
        let parsed = normalizer
            .normalize("2015-01-11T16:35:21.335785Z", reference())
            .unwrap();
        let expected = Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2015, 1, 11)
                .unwrap()
                .and_hms_micro_opt(16, 35, 21, 335785)
                .unwrap(),
        );
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_offset_normalized_to_utc() {
        let normalizer = TimestampNormalizer::default();
        let parsed = normalizer
            .normalize("2018-10-11T22:14:15+02:00", reference())
            .unwrap();
        assert_eq!(parsed, utc(2018, 10, 11, 20, 14, 15));
        let parsed = normalizer
            .normalize("2018-10-11T22:14:15-0700", reference())
            .unwrap();
        assert_eq!(parsed, utc(2018, 10, 12, 5, 14, 15));
    }

    #[test]
    fn test_omitted_year_takes_reference_year() {
        let normalizer = TimestampNormalizer::default();
        let parsed = normalizer.normalize("Mar 12 12:00:08", reference()).unwrap();
        assert_eq!(parsed, utc(2019, 3, 12, 12, 0, 8));
    }

    #[test]
    fn test_space_padded_day() {
        let normalizer = TimestampNormalizer::default();
        let parsed = normalizer.normalize("Mar  2 06:07:08", reference()).unwrap();
        assert_eq!(parsed, utc(2019, 3, 2, 6, 7, 8));
    }

    #[test]
    fn test_explicit_year_wins_over_inference() {
        let normalizer = TimestampNormalizer::default();
        let parsed = normalizer
            .normalize("Mar 12 2017 12:00:08", reference())
            .unwrap();
        assert_eq!(parsed, utc(2017, 3, 12, 12, 0, 8));
    }

    #[test]
    fn test_partial_match_declines() {
        let normalizer = TimestampNormalizer::default();
        let err = normalizer
            .normalize("Mar 12 12:00:08 trailing", reference())
            .unwrap_err();
        assert_eq!(
            err,
            TimestampParsingError::UnrecognizedDate("Mar 12 12:00:08 trailing".to_string())
        );
    }

    #[test]
    fn test_garbage_declines() {
        let normalizer = TimestampNormalizer::default();
        assert!(normalizer.normalize("not-a-date", reference()).is_err());
        assert!(normalizer.normalize("", reference()).is_err());
    }
}

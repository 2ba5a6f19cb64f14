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

//! Deserializer library for the syslog dialect grammars.
//!
//! Each dialect lives in its own module and exposes a
//! `parse(&SyslogRequest, &TimestampNormalizer)` returning either the typed
//! message or that module's parsing error. A parsing error is the normal
//! "wrong dialect" outcome, not a failure; [`SyslogParser`] turns the ordered
//! sequence of such attempts into an infallible classification.

pub mod cef;
pub mod cisco;
pub mod rfc3164;
pub mod rfc5424;

use crate::{
    iana::Priority,
    timestamp::TimestampNormalizer,
    SyslogMessage, SyslogRequest, UnknownMessage,
};
use chrono::{DateTime, Utc};
use nom::{
    branch::alt,
    bytes::complete::{take_while1, take_while_m_n},
    character::complete::{char, digit1, space1},
    combinator::{map, map_res, recognize, rest, verify},
    sequence::{delimited, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};

/// The `<N>` priority prefix.
pub(crate) fn priority_token(input: &str) -> IResult<&str, Priority> {
    map(
        delimited(char('<'), map_res(digit1, str::parse::<u16>), char('>')),
        Priority::new,
    )(input)
}

/// A run of anything but whitespace, the universal field token.
pub(crate) fn token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(input)
}

fn month_abbrev(input: &str) -> IResult<&str, &str> {
    take_while_m_n(3, 3, |c: char| c.is_ascii_alphabetic())(input)
}

/// BSD date token: `Mon d HH:MM:SS`, single-digit days space- or
/// zero-padded.
pub(crate) fn bsd_date_token(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        month_abbrev,
        space1,
        digit1,
        space1,
        digit1,
        char(':'),
        digit1,
        char(':'),
        digit1,
    )))(input)
}

/// Cisco-style date token: `Mon d YYYY HH:MM:SS`.
pub(crate) fn bsd_date_with_year_token(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        month_abbrev,
        space1,
        digit1,
        space1,
        digit1,
        space1,
        digit1,
        char(':'),
        digit1,
        char(':'),
        digit1,
    )))(input)
}

/// ISO-like date token, delimited loosely; the timestamp normalizer decides
/// whether it actually parses.
pub(crate) fn iso_date_token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| {
        c.is_ascii_digit() || matches!(c, 'T' | 'Z' | ':' | '.' | '+' | '-')
    })(input)
}

/// Date token of the BSD-family headers: classic BSD form or ISO fallback.
pub(crate) fn header_date_token(input: &str) -> IResult<&str, &str> {
    alt((bsd_date_token, iso_date_token))(input)
}

/// Everything to the end of input, declining on empty.
pub(crate) fn non_empty_rest(input: &str) -> IResult<&str, &str> {
    verify(rest, |s: &str| !s.is_empty())(input)
}

/// The `-` nil token decodes to an absent field, not a literal dash.
pub(crate) fn nullable(token: &str) -> Option<String> {
    if token == "-" {
        None
    } else {
        Some(token.to_string())
    }
}

/// Decode a date token, substituting the receipt time when no date grammar
/// matches. A bad date never fails the message.
pub(crate) fn resolve_timestamp(
    timestamps: &TimestampNormalizer,
    date_token: &str,
    request: &SyslogRequest<'_>,
) -> DateTime<Utc> {
    match timestamps.normalize(date_token, request.received_at()) {
        Ok(timestamp) => timestamp,
        Err(err) => {
            log::warn!("substituting receipt time for message date: {err}");
            request.received_at()
        }
    }
}

/// The dialect grammars, in the closed set the dispatcher ranges over.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum SyslogDialect {
    Cef,
    Rfc5424,
    Cisco,
    Rfc3164,
}

/// Default precedence: strict, strongly-anchored grammars before the
/// permissive BSD grammar, which is loose enough to spuriously match the
/// others' text.
pub const DEFAULT_DIALECT_ORDER: [SyslogDialect; 4] = [
    SyslogDialect::Cef,
    SyslogDialect::Rfc5424,
    SyslogDialect::Cisco,
    SyslogDialect::Rfc3164,
];

/// Ordered-dispatch parser: tries each dialect grammar in turn and returns
/// the first match, falling back to [`UnknownMessage`] when all decline.
///
/// Stateless per call: one instance can serve any number of workers
/// concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyslogParser {
    order: Vec<SyslogDialect>,
    timestamps: TimestampNormalizer,
}

impl Default for SyslogParser {
    fn default() -> Self {
        Self {
            order: DEFAULT_DIALECT_ORDER.to_vec(),
            timestamps: TimestampNormalizer::default(),
        }
    }
}

impl SyslogParser {
    pub const fn new(order: Vec<SyslogDialect>, timestamps: TimestampNormalizer) -> Self {
        Self { order, timestamps }
    }

    pub fn dialect_order(&self) -> &[SyslogDialect] {
        &self.order
    }

    /// Try a single dialect grammar; `None` means it declined.
    pub fn try_dialect(
        &self,
        dialect: SyslogDialect,
        request: &SyslogRequest<'_>,
    ) -> Option<SyslogMessage> {
        match dialect {
            SyslogDialect::Cef => cef::parse(request, &self.timestamps)
                .ok()
                .map(SyslogMessage::Cef),
            SyslogDialect::Rfc5424 => rfc5424::parse(request, &self.timestamps)
                .ok()
                .map(SyslogMessage::Rfc5424),
            SyslogDialect::Cisco => cisco::parse(request, &self.timestamps)
                .ok()
                .map(SyslogMessage::Rfc3164),
            SyslogDialect::Rfc3164 => rfc3164::parse(request, &self.timestamps)
                .ok()
                .map(SyslogMessage::Rfc3164),
        }
    }

    /// Classify one raw message. Always yields a value: input no grammar
    /// accepts comes back as [`SyslogMessage::Unknown`] carrying the raw
    /// text, the sender and the receipt time.
    pub fn parse(&self, request: &SyslogRequest<'_>) -> SyslogMessage {
        for dialect in &self.order {
            if let Some(message) = self.try_dialect(*dialect, request) {
                log::trace!("classified message as {dialect}");
                return message;
            }
        }
        log::warn!(
            "no dialect grammar matched, message left unclassified: '{}'",
            request.raw_message()
        );
        SyslogMessage::Unknown(UnknownMessage::from(request))
    }
}

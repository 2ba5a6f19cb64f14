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

//! ArcSight CEF grammar: a BSD-style syslog header followed by
//! `CEF:version|vendor|product|devVersion|classId|name|severity|extension`.
//!
//! Two boundary scans do the work no token split can: the header fields are
//! cut at unescaped pipes (`\|` stays literal), and the extension is cut at
//! `key=` anchors because its values are unquoted and may contain spaces.

use crate::{
    iana::Priority,
    timestamp::TimestampNormalizer,
    wire::deserializer::{
        header_date_token, priority_token, resolve_timestamp, token,
    },
    CefMessage, SyslogRequest,
};
use indexmap::IndexMap;
use nom::{
    bytes::complete::tag,
    character::complete::{char, digit1, space1},
    combinator::{all_consuming, map_res, opt, rest},
    IResult,
};
use serde::{Deserialize, Serialize};

/// Error type for input the CEF grammar declines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum CefParsingError {
    #[strum(to_string = "input does not match the CEF grammar")]
    GrammarMismatch,
    #[strum(to_string = "CEF header carries {0} of 6 mandatory fields")]
    TruncatedHeader(usize),
    #[strum(to_string = "CEF header field {0} is empty")]
    EmptyHeaderField(usize),
}

impl std::error::Error for CefParsingError {}

struct CefTokens<'a> {
    priority: Option<Priority>,
    date: &'a str,
    host: &'a str,
    version: u16,
    data: &'a str,
}

fn cef_line(input: &str) -> IResult<&str, CefTokens<'_>> {
    let (input, priority) = opt(priority_token)(input)?;
    let (input, date) = header_date_token(input)?;
    let (input, _) = space1(input)?;
    let (input, host) = token(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag("CEF:")(input)?;
    let (input, version) = map_res(digit1, str::parse::<u16>)(input)?;
    let (input, _) = char('|')(input)?;
    let (input, data) = rest(input)?;
    Ok((
        input,
        CefTokens {
            priority,
            date,
            host,
            version,
            data,
        },
    ))
}

/// Cut the post-version data at the first six unescaped pipes. The seventh
/// field is the extension and is taken verbatim to end of input; pipes there
/// need no escaping.
fn split_header(data: &str) -> Result<([&str; 6], &str), CefParsingError> {
    let mut fields: Vec<&str> = Vec::with_capacity(6);
    let mut start = 0;
    let mut escaped = false;
    for (idx, byte) in data.bytes().enumerate() {
        if byte == b'\\' {
            escaped = !escaped;
            continue;
        }
        if byte == b'|' && !escaped {
            fields.push(&data[start..idx]);
            start = idx + 1;
            if fields.len() == 6 {
                let fields: [&str; 6] = match fields.try_into() {
                    Ok(fields) => fields,
                    Err(_) => return Err(CefParsingError::GrammarMismatch),
                };
                return Ok((fields, &data[start..]));
            }
        }
        escaped = false;
    }
    Err(CefParsingError::TruncatedHeader(fields.len()))
}

fn unescape_pipes(field: &str) -> String {
    field.replace("\\|", "|")
}

fn is_extension_key_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'.'
}

/// Two-pass boundary scan over the free-form `key=value key2=value2 ...`
/// extension. An anchor is a key run immediately followed by `=`, starting
/// the input or preceded by whitespace; each value runs up to the next
/// anchor and is trimmed. A trailing `key=` binds to the empty string.
pub(crate) fn parse_extension(input: &str) -> IndexMap<String, String> {
    let bytes = input.as_bytes();
    let mut anchors: Vec<(usize, usize)> = Vec::new();
    let mut idx = 0;
    while idx < bytes.len() {
        let at_boundary = idx == 0 || bytes[idx - 1].is_ascii_whitespace();
        if at_boundary {
            let mut end = idx;
            while end < bytes.len() && is_extension_key_byte(bytes[end]) {
                end += 1;
            }
            if end > idx && end < bytes.len() && bytes[end] == b'=' {
                anchors.push((idx, end));
                idx = end + 1;
                continue;
            }
        }
        idx += 1;
    }
    let mut extension = IndexMap::with_capacity(anchors.len());
    for (n, (key_start, key_end)) in anchors.iter().enumerate() {
        let value_end = anchors
            .get(n + 1)
            .map(|(next_start, _)| *next_start)
            .unwrap_or(input.len());
        let value = input[key_end + 1..value_end].trim();
        extension.insert(
            input[*key_start..*key_end].to_string(),
            value.to_string(),
        );
    }
    extension
}

pub fn parse(
    request: &SyslogRequest<'_>,
    timestamps: &TimestampNormalizer,
) -> Result<CefMessage, CefParsingError> {
    let (_, tokens) = all_consuming(cef_line)(request.raw_message())
        .map_err(|_| CefParsingError::GrammarMismatch)?;
    let (fields, extension_data) = split_header(tokens.data)?;
    if let Some(index) = fields.iter().position(|field| field.is_empty()) {
        return Err(CefParsingError::EmptyHeaderField(index));
    }
    let timestamp = resolve_timestamp(timestamps, tokens.date, request);
    let [vendor, product, device_version, class_id, name, severity] = fields;
    Ok(CefMessage::new(
        timestamp,
        request.remote_address(),
        request.raw_message().to_string(),
        tokens.priority,
        tokens.version,
        tokens.host.to_string(),
        unescape_pipes(vendor),
        unescape_pipes(product),
        unescape_pipes(device_version),
        unescape_pipes(class_id),
        unescape_pipes(name),
        unescape_pipes(severity),
        parse_extension(extension_data),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn request(raw: &str) -> SyslogRequest<'_> {
        SyslogRequest::new(
            raw,
            None,
            Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_parse_classic() {
        let raw = "<13>Sep 29 08:26:10 host CEF:0|Security|threatmanager|1.0|100|worm \
                   successfully stopped|10|src=10.0.0.1 dst=2.1.2.2 spt=1232";
        let msg = parse(&request(raw), &TimestampNormalizer::default()).unwrap();
        assert_eq!(msg.priority(), Some(Priority::new(13)));
        assert_eq!(
            msg.timestamp(),
            Utc.with_ymd_and_hms(2019, 9, 29, 8, 26, 10).unwrap()
        );
        assert_eq!(msg.host(), "host");
        assert_eq!(msg.version(), 0);
        assert_eq!(msg.device_vendor(), "Security");
        assert_eq!(msg.device_product(), "threatmanager");
        assert_eq!(msg.device_version(), "1.0");
        assert_eq!(msg.device_event_class_id(), "100");
        assert_eq!(msg.name(), "worm successfully stopped");
        assert_eq!(msg.severity(), "10");
        assert_eq!(msg.extension().get("src").map(String::as_str), Some("10.0.0.1"));
        assert_eq!(msg.extension().get("dst").map(String::as_str), Some("2.1.2.2"));
        assert_eq!(msg.extension().get("spt").map(String::as_str), Some("1232"));
    }

    #[test]
    fn test_parse_without_priority() {
        let raw = "Sep 29 08:26:10 host CEF:1|V|P|2.0|c|n|низкий|";
        let msg = parse(&request(raw), &TimestampNormalizer::default()).unwrap();
        assert_eq!(msg.priority(), None);
        assert_eq!(msg.version(), 1);
        assert_eq!(msg.severity(), "низкий");
        assert!(msg.extension().is_empty());
    }

    #[test]
    fn test_escaped_pipe_in_header_field() {
        let raw = "Sep 29 08:26:10 host CEF:0|Vendor|Product|1.0|100|detected a \\| in \
                   message|5|src=10.0.0.1";
        let msg = parse(&request(raw), &TimestampNormalizer::default()).unwrap();
        assert_eq!(msg.name(), "detected a | in message");
    }

    #[test]
    fn test_extension_value_with_spaces() {
        let extension = parse_extension("src=10.0.0.1 dst=10.0.0.2 msg=connection blocked");
        assert_eq!(extension.get("src").map(String::as_str), Some("10.0.0.1"));
        assert_eq!(extension.get("dst").map(String::as_str), Some("10.0.0.2"));
        assert_eq!(
            extension.get("msg").map(String::as_str),
            Some("connection blocked")
        );
    }

    #[test]
    fn test_extension_trailing_key_binds_empty() {
        let extension = parse_extension("src=10.0.0.1 reason=");
        assert_eq!(extension.get("reason").map(String::as_str), Some(""));
    }

    #[test]
    fn test_extension_equals_inside_value_is_not_an_anchor() {
        let extension = parse_extension("request=http://example.com/?a=b act=blocked");
        assert_eq!(
            extension.get("request").map(String::as_str),
            Some("http://example.com/?a=b")
        );
        assert_eq!(extension.get("act").map(String::as_str), Some("blocked"));
        assert_eq!(extension.len(), 2);
    }

    #[test]
    fn test_extension_preserves_wire_order() {
        let extension = parse_extension("zulu=1 alpha=2 mike=3");
        let keys: Vec<&str> = extension.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zulu", "alpha", "mike"]);
    }

    #[test]
    fn test_truncated_header_is_rejected() {
        let raw = "Sep 29 08:26:10 host CEF:0|Vendor|Product|1.0";
        assert_eq!(
            parse(&request(raw), &TimestampNormalizer::default()),
            Err(CefParsingError::TruncatedHeader(3))
        );
    }

    #[test]
    fn test_empty_header_field_is_rejected() {
        let raw = "Sep 29 08:26:10 host CEF:0|Vendor||1.0|100|name|5|";
        assert_eq!(
            parse(&request(raw), &TimestampNormalizer::default()),
            Err(CefParsingError::EmptyHeaderField(1))
        );
    }

    #[test]
    fn test_plain_syslog_is_mismatch() {
        let raw = "<34>Oct 11 22:14:15 mymachine su: body";
        assert_eq!(
            parse(&request(raw), &TimestampNormalizer::default()),
            Err(CefParsingError::GrammarMismatch)
        );
    }
}

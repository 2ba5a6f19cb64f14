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

//! RFC 5424 structured syslog grammar, including the bracketed
//! structured-data sub-grammar.

use crate::{
    iana::Priority,
    timestamp::TimestampNormalizer,
    wire::deserializer::{non_empty_rest, nullable, priority_token, resolve_timestamp, token},
    Rfc5424Message, StructuredDataElement, SyslogRequest,
};
use indexmap::IndexMap;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1, take_while_m_n},
    character::complete::{char, space1},
    combinator::{all_consuming, map, map_res},
    error::{Error, ErrorKind},
    multi::{many0, many1},
    sequence::preceded,
    IResult,
};
use serde::{Deserialize, Serialize};

/// Error type for input the RFC 5424 grammar declines. Priority and version
/// are mandatory on this dialect, so their absence is a mismatch rather than
/// a recoverable field failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum Rfc5424ParsingError {
    #[strum(to_string = "input does not match the RFC 5424 grammar")]
    GrammarMismatch,
}

impl std::error::Error for Rfc5424ParsingError {}

struct Rfc5424Tokens<'a> {
    priority: Priority,
    version: u16,
    date: &'a str,
    host: &'a str,
    app_name: &'a str,
    proc_id: &'a str,
    message_id: &'a str,
    structured_data: Vec<StructuredDataElement>,
    message: &'a str,
}

/// `key="value"` where the value may carry backslash-escaped `"`, `\` or
/// `]`; the escapes are resolved here.
fn sd_param(input: &str) -> IResult<&str, (&str, String)> {
    let (input, key) =
        take_while1(|c: char| !c.is_whitespace() && !matches!(c, '=' | ']' | '"'))(input)?;
    let (input, _) = char('=')(input)?;
    let (input, value) = sd_param_value(input)?;
    Ok((input, (key, value)))
}

fn sd_param_value(input: &str) -> IResult<&str, String> {
    let (input, _) = char('"')(input)?;
    let mut value = String::new();
    let mut chars = input.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => return Ok((&input[idx + 1..], value)),
            '\\' => match chars.next() {
                Some((_, escaped @ ('"' | '\\' | ']'))) => value.push(escaped),
                Some((_, other)) => {
                    value.push('\\');
                    value.push(other);
                }
                None => break,
            },
            c => value.push(c),
        }
    }
    Err(nom::Err::Error(Error::new(input, ErrorKind::Char)))
}

/// One `[id key="value" ...]` group. The bare id must be the group's first
/// token; a group opening with a key/value pair is rejected, which in turn
/// rejects the dialect match.
fn sd_element(input: &str) -> IResult<&str, StructuredDataElement> {
    let (input, _) = char('[')(input)?;
    let (input, id) =
        take_while1(|c: char| !c.is_whitespace() && !matches!(c, ']' | '=' | '"'))(input)?;
    let (input, params) = many0(preceded(space1, sd_param))(input)?;
    let (input, _) = char(']')(input)?;
    let mut map = IndexMap::with_capacity(params.len());
    for (key, value) in params {
        map.insert(key.to_string(), value);
    }
    Ok((input, StructuredDataElement::new(id.to_string(), map)))
}

/// The structured-data section: the nil token or one or more groups.
pub(crate) fn structured_data_section(input: &str) -> IResult<&str, Vec<StructuredDataElement>> {
    alt((map(tag("-"), |_| Vec::new()), many1(sd_element)))(input)
}

fn rfc5424_line(input: &str) -> IResult<&str, Rfc5424Tokens<'_>> {
    let (input, priority) = priority_token(input)?;
    let (input, version) = map_res(
        take_while_m_n(1, 3, |c: char| c.is_ascii_digit()),
        str::parse::<u16>,
    )(input)?;
    let (input, _) = space1(input)?;
    let (input, date) = token(input)?;
    let (input, _) = space1(input)?;
    let (input, host) = token(input)?;
    let (input, _) = space1(input)?;
    let (input, app_name) = token(input)?;
    let (input, _) = space1(input)?;
    let (input, proc_id) = token(input)?;
    let (input, _) = space1(input)?;
    let (input, message_id) = token(input)?;
    let (input, _) = space1(input)?;
    let (input, structured_data) = structured_data_section(input)?;
    let (input, _) = space1(input)?;
    let (input, message) = non_empty_rest(input)?;
    Ok((
        input,
        Rfc5424Tokens {
            priority,
            version,
            date,
            host,
            app_name,
            proc_id,
            message_id,
            structured_data,
            message,
        },
    ))
}

pub fn parse(
    request: &SyslogRequest<'_>,
    timestamps: &TimestampNormalizer,
) -> Result<Rfc5424Message, Rfc5424ParsingError> {
    let (_, tokens) = all_consuming(rfc5424_line)(request.raw_message())
        .map_err(|_| Rfc5424ParsingError::GrammarMismatch)?;
    let timestamp = resolve_timestamp(timestamps, tokens.date, request);
    Ok(Rfc5424Message::new(
        timestamp,
        request.remote_address(),
        request.raw_message().to_string(),
        tokens.priority,
        tokens.version,
        tokens.host.to_string(),
        nullable(tokens.app_name),
        nullable(tokens.proc_id),
        nullable(tokens.message_id),
        tokens.structured_data,
        tokens.message.to_string(),
    ))
}

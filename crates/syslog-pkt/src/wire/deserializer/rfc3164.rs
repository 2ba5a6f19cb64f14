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

//! BSD syslog (RFC 3164) grammar. Deliberately permissive: the priority
//! prefix, the tag and the process id are all optional, which is also why
//! this grammar is tried last by the dispatcher.

use crate::{
    iana::Priority,
    timestamp::TimestampNormalizer,
    wire::deserializer::{
        header_date_token, non_empty_rest, priority_token, resolve_timestamp, token,
    },
    Rfc3164Message, SyslogRequest,
};
use nom::{
    bytes::complete::take_while1,
    character::complete::{char, digit1, space0, space1},
    combinator::{all_consuming, opt},
    sequence::{delimited, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};

/// Error type for input even the permissive BSD grammar declines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum Rfc3164ParsingError {
    #[strum(to_string = "input does not match the RFC 3164 grammar")]
    GrammarMismatch,
}

impl std::error::Error for Rfc3164ParsingError {}

struct Rfc3164Tokens<'a> {
    priority: Option<Priority>,
    date: &'a str,
    host: &'a str,
    tag: Option<&'a str>,
    process_id: Option<&'a str>,
    message: &'a str,
}

fn tag_token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && !matches!(c, '[' | ']' | ':'))(input)
}

fn rfc3164_line(input: &str) -> IResult<&str, Rfc3164Tokens<'_>> {
    let (input, priority) = opt(priority_token)(input)?;
    let (input, date) = header_date_token(input)?;
    let (input, _) = space1(input)?;
    let (input, host) = token(input)?;
    let (input, _) = space1(input)?;
    let (input, tag_part) = opt(tuple((
        tag_token,
        opt(delimited(char('['), digit1, char(']'))),
        char(':'),
    )))(input)?;
    let (input, _) = space0(input)?;
    let (input, message) = non_empty_rest(input)?;
    let (tag, process_id) = match tag_part {
        Some((tag, process_id, _)) => (Some(tag), process_id),
        None => (None, None),
    };
    Ok((
        input,
        Rfc3164Tokens {
            priority,
            date,
            host,
            tag,
            process_id,
            message,
        },
    ))
}

pub fn parse(
    request: &SyslogRequest<'_>,
    timestamps: &TimestampNormalizer,
) -> Result<Rfc3164Message, Rfc3164ParsingError> {
    let (_, tokens) = all_consuming(rfc3164_line)(request.raw_message())
        .map_err(|_| Rfc3164ParsingError::GrammarMismatch)?;
    let timestamp = resolve_timestamp(timestamps, tokens.date, request);
    Ok(Rfc3164Message::new(
        timestamp,
        request.remote_address(),
        request.raw_message().to_string(),
        tokens.priority,
        tokens.host.to_string(),
        tokens.tag.map(str::to_string),
        tokens.process_id.map(str::to_string),
        tokens.message.to_string(),
    ))
}

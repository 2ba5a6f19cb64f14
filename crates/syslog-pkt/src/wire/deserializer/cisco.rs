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

//! Cisco-style vendor grammar: `Mon d YYYY HH:MM:SS: %MNEMONIC: message`.
//! Close enough to BSD syslog to normalize into [`Rfc3164Message`], but its
//! year-bearing date and `%`-prefixed mnemonic need their own grammar.

use crate::{
    timestamp::TimestampNormalizer,
    wire::deserializer::{bsd_date_with_year_token, non_empty_rest, resolve_timestamp},
    Rfc3164Message, SyslogRequest,
};
use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0, space1},
    combinator::all_consuming,
    IResult,
};
use serde::{Deserialize, Serialize};

/// Error type for input the Cisco-style grammar declines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum CiscoParsingError {
    #[strum(to_string = "input does not match the Cisco-style grammar")]
    GrammarMismatch,
}

impl std::error::Error for CiscoParsingError {}

struct CiscoTokens<'a> {
    date: &'a str,
    host: &'a str,
    message: &'a str,
}

fn cisco_line(input: &str) -> IResult<&str, CiscoTokens<'_>> {
    let (input, date) = bsd_date_with_year_token(input)?;
    let (input, _) = char(':')(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = char('%')(input)?;
    let (input, host) = take_while1(|c: char| !c.is_whitespace() && c != ':')(input)?;
    let (input, _) = char(':')(input)?;
    let (input, _) = space0(input)?;
    let (input, message) = non_empty_rest(input)?;
    Ok((input, CiscoTokens { date, host, message }))
}

pub fn parse(
    request: &SyslogRequest<'_>,
    timestamps: &TimestampNormalizer,
) -> Result<Rfc3164Message, CiscoParsingError> {
    let (_, tokens) = all_consuming(cisco_line)(request.raw_message())
        .map_err(|_| CiscoParsingError::GrammarMismatch)?;
    let timestamp = resolve_timestamp(timestamps, tokens.date, request);
    Ok(Rfc3164Message::new(
        timestamp,
        request.remote_address(),
        request.raw_message().to_string(),
        None,
        tokens.host.to_string(),
        None,
        None,
        tokens.message.to_string(),
    ))
}

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

use crate::{
    wire::serializer::{decimal_width, priority_width, WritableMessage},
    Rfc5424Message, StructuredDataElement,
};
use chrono::SecondsFormat;
use std::io::Write;

/// Rendered width of an RFC 3339 date with a six-digit fraction and `Z`.
const RFC3339_MICROS_WIDTH: usize = 27;

#[derive(Debug, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum Rfc5424WritingError {
    #[strum(to_string = "std io error: {0}")]
    StdIOError(String),
}

impl std::error::Error for Rfc5424WritingError {}

impl From<std::io::Error> for Rfc5424WritingError {
    fn from(err: std::io::Error) -> Self {
        Self::StdIOError(err.to_string())
    }
}

/// PARAM-VALUE escaping: `"` `\` `]` carry a backslash on the wire.
fn write_param_value<T: Write>(writer: &mut T, value: &str) -> Result<(), std::io::Error> {
    for c in value.chars() {
        if matches!(c, '"' | '\\' | ']') {
            writer.write_all(b"\\")?;
        }
        write!(writer, "{c}")?;
    }
    Ok(())
}

fn write_sd_element<T: Write>(
    writer: &mut T,
    element: &StructuredDataElement,
) -> Result<(), std::io::Error> {
    write!(writer, "[{}", element.id())?;
    for (key, value) in element.params() {
        write!(writer, " {key}=\"")?;
        write_param_value(writer, value)?;
        write!(writer, "\"")?;
    }
    write!(writer, "]")?;
    Ok(())
}

fn nil_or<'a>(value: Option<&'a str>) -> &'a str {
    value.unwrap_or("-")
}

fn escaped_param_len(value: &str) -> usize {
    value.len()
        + value
            .bytes()
            .filter(|b| matches!(b, b'"' | b'\\' | b']'))
            .count()
}

fn sd_element_len(element: &StructuredDataElement) -> usize {
    2 + element.id().len()
        + element
            .params()
            .iter()
            .map(|(key, value)| 4 + key.len() + escaped_param_len(value))
            .sum::<usize>()
}

impl WritableMessage for Rfc5424Message {
    type Error = Rfc5424WritingError;

    fn len(&self) -> usize {
        let sd_len = if self.structured_data().is_empty() {
            1
        } else {
            self.structured_data().iter().map(sd_element_len).sum()
        };
        priority_width(self.priority())
            + decimal_width(self.version() as usize)
            + 1
            + RFC3339_MICROS_WIDTH
            + 1
            + self.host().len()
            + 1
            + nil_or(self.app_name()).len()
            + 1
            + nil_or(self.proc_id()).len()
            + 1
            + nil_or(self.message_id()).len()
            + 1
            + sd_len
            + 1
            + self.message().len()
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), Self::Error> {
        write!(
            writer,
            "{}{} {} {} {} {} {} ",
            self.priority(),
            self.version(),
            self.timestamp()
                .to_rfc3339_opts(SecondsFormat::Micros, true),
            self.host(),
            nil_or(self.app_name()),
            nil_or(self.proc_id()),
            nil_or(self.message_id()),
        )?;
        if self.structured_data().is_empty() {
            write!(writer, "-")?;
        } else {
            for element in self.structured_data() {
                write_sd_element(writer, element)?;
            }
        }
        write!(writer, " {}", self.message())?;
        Ok(())
    }
}

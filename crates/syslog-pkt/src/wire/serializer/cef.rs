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
    wire::serializer::{
        decimal_width, priority_width,
        rfc3164::{BSD_DATE_FORMAT, BSD_DATE_WIDTH},
        WritableMessage,
    },
    CefMessage,
};
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum CefWritingError {
    #[strum(to_string = "std io error: {0}")]
    StdIOError(String),
}

impl std::error::Error for CefWritingError {}

impl From<std::io::Error> for CefWritingError {
    fn from(err: std::io::Error) -> Self {
        Self::StdIOError(err.to_string())
    }
}

/// Header fields are pipe-delimited, so literal pipes go out as `\|`.
fn write_header_field<T: Write>(writer: &mut T, field: &str) -> Result<(), std::io::Error> {
    for c in field.chars() {
        if c == '|' {
            writer.write_all(b"\\")?;
        }
        write!(writer, "{c}")?;
    }
    writer.write_all(b"|")?;
    Ok(())
}

fn escaped_field_len(field: &str) -> usize {
    field.len() + field.bytes().filter(|b| *b == b'|').count()
}

impl WritableMessage for CefMessage {
    type Error = CefWritingError;

    fn len(&self) -> usize {
        let mut len = self.priority().map_or(0, priority_width);
        len += BSD_DATE_WIDTH + 1 + self.host().len() + 1;
        len += 4 + decimal_width(self.version() as usize) + 1;
        for field in [
            self.device_vendor(),
            self.device_product(),
            self.device_version(),
            self.device_event_class_id(),
            self.name(),
            self.severity(),
        ] {
            len += escaped_field_len(field) + 1;
        }
        let mut first = true;
        for (key, value) in self.extension() {
            if !first {
                len += 1;
            }
            len += key.len() + 1 + value.len();
            first = false;
        }
        len
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), Self::Error> {
        if let Some(priority) = self.priority() {
            write!(writer, "{priority}")?;
        }
        write!(
            writer,
            "{} {} CEF:{}|",
            self.timestamp().format(BSD_DATE_FORMAT),
            self.host(),
            self.version(),
        )?;
        write_header_field(writer, self.device_vendor())?;
        write_header_field(writer, self.device_product())?;
        write_header_field(writer, self.device_version())?;
        write_header_field(writer, self.device_event_class_id())?;
        write_header_field(writer, self.name())?;
        write_header_field(writer, self.severity())?;
        let mut first = true;
        for (key, value) in self.extension() {
            if !first {
                writer.write_all(b" ")?;
            }
            write!(writer, "{key}={value}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iana::Priority;
    use chrono::{TimeZone, Utc};
    use indexmap::IndexMap;

    #[test]
    fn test_write_classic() {
        let mut extension = IndexMap::new();
        extension.insert("src".to_string(), "10.0.0.1".to_string());
        extension.insert("spt".to_string(), "1232".to_string());
        let msg = CefMessage::new(
            Utc.with_ymd_and_hms(2019, 9, 29, 8, 26, 10).unwrap(),
            None,
            String::new(),
            Some(Priority::new(13)),
            0,
            "host".to_string(),
            "Security".to_string(),
            "threatmanager".to_string(),
            "1.0".to_string(),
            "100".to_string(),
            "worm successfully stopped".to_string(),
            "10".to_string(),
            extension,
        );
        assert_eq!(
            msg.encode().unwrap(),
            "<13>Sep 29 08:26:10 host CEF:0|Security|threatmanager|1.0|100|worm \
             successfully stopped|10|src=10.0.0.1 spt=1232"
        );
        assert_eq!(msg.len(), msg.encode().unwrap().len());
    }

    #[test]
    fn test_write_escapes_pipes_and_empty_extension() {
        let msg = CefMessage::new(
            Utc.with_ymd_and_hms(2019, 9, 29, 8, 26, 10).unwrap(),
            None,
            String::new(),
            None,
            1,
            "host".to_string(),
            "Vendor".to_string(),
            "Product".to_string(),
            "2.0".to_string(),
            "c".to_string(),
            "detected a | in message".to_string(),
            "5".to_string(),
            IndexMap::new(),
        );
        assert_eq!(
            msg.encode().unwrap(),
            "Sep 29 08:26:10 host CEF:1|Vendor|Product|2.0|c|detected a \\| in message|5|"
        );
        assert_eq!(msg.len(), msg.encode().unwrap().len());
    }
}

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
    wire::serializer::{priority_width, WritableMessage},
    Rfc3164Message,
};
use std::io::Write;

/// Timestamp layout of the BSD header. `%e` space-pads single-digit days,
/// matching the classic two-character day field.
pub(crate) const BSD_DATE_FORMAT: &str = "%b %e %H:%M:%S";

/// Rendered width of [`BSD_DATE_FORMAT`], fixed by its padding.
pub(crate) const BSD_DATE_WIDTH: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum Rfc3164WritingError {
    #[strum(to_string = "std io error: {0}")]
    StdIOError(String),
}

impl std::error::Error for Rfc3164WritingError {}

impl From<std::io::Error> for Rfc3164WritingError {
    fn from(err: std::io::Error) -> Self {
        Self::StdIOError(err.to_string())
    }
}

impl WritableMessage for Rfc3164Message {
    type Error = Rfc3164WritingError;

    fn len(&self) -> usize {
        let mut len = self.priority().map_or(0, priority_width);
        len += BSD_DATE_WIDTH + 1 + self.host().len();
        if let Some(tag) = self.tag() {
            len += 1 + tag.len();
            if let Some(process_id) = self.process_id() {
                len += 2 + process_id.len();
            }
            len += 1;
        }
        len + 1 + self.message().len()
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), Self::Error> {
        if let Some(priority) = self.priority() {
            write!(writer, "{priority}")?;
        }
        write!(
            writer,
            "{} {}",
            self.timestamp().format(BSD_DATE_FORMAT),
            self.host()
        )?;
        if let Some(tag) = self.tag() {
            write!(writer, " {tag}")?;
            if let Some(process_id) = self.process_id() {
                write!(writer, "[{process_id}]")?;
            }
            write!(writer, ":")?;
        }
        write!(writer, " {}", self.message())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iana::Priority;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_write_classic() {
        let msg = Rfc3164Message::new(
            Utc.with_ymd_and_hms(2019, 10, 11, 22, 14, 15).unwrap(),
            None,
            String::new(),
            Some(Priority::new(34)),
            "mymachine".to_string(),
            Some("su".to_string()),
            None,
            "'su root' failed for lonvick on /dev/pts/8".to_string(),
        );
        assert_eq!(
            msg.encode().unwrap(),
            "<34>Oct 11 22:14:15 mymachine su: 'su root' failed for lonvick on /dev/pts/8"
        );
    }

    #[test]
    fn test_write_with_process_id_and_padded_day() {
        let msg = Rfc3164Message::new(
            Utc.with_ymd_and_hms(2019, 3, 2, 1, 2, 3).unwrap(),
            None,
            String::new(),
            Some(Priority::new(13)),
            "host".to_string(),
            Some("sshd".to_string()),
            Some("4721".to_string()),
            "session opened".to_string(),
        );
        assert_eq!(
            msg.encode().unwrap(),
            "<13>Mar  2 01:02:03 host sshd[4721]: session opened"
        );
        assert_eq!(msg.len(), msg.encode().unwrap().len());
    }

    #[test]
    fn test_write_without_priority_or_tag() {
        let msg = Rfc3164Message::new(
            Utc.with_ymd_and_hms(2019, 10, 11, 22, 14, 15).unwrap(),
            None,
            String::new(),
            None,
            "host".to_string(),
            None,
            None,
            "free text".to_string(),
        );
        assert_eq!(msg.encode().unwrap(), "Oct 11 22:14:15 host free text");
        assert_eq!(msg.len(), msg.encode().unwrap().len());
    }
}

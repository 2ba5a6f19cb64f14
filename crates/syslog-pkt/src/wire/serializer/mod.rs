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

//! Serializer library for the syslog dialects. Each encoder emits the
//! canonical wire form of its typed message; an [`UnknownMessage`] round-trips
//! as its raw text.

pub mod cef;
pub mod rfc3164;
pub mod rfc5424;

use crate::{iana::Priority, SyslogMessage, UnknownMessage};
use std::io::Write;

pub use cef::CefWritingError;
pub use rfc3164::Rfc3164WritingError;
pub use rfc5424::Rfc5424WritingError;

/// Width of `value` rendered in decimal.
pub(crate) const fn decimal_width(mut value: usize) -> usize {
    let mut width = 1;
    while value >= 10 {
        value /= 10;
        width += 1;
    }
    width
}

/// Width of the `<N>` priority prefix.
pub(crate) const fn priority_width(priority: Priority) -> usize {
    2 + decimal_width(priority.raw() as usize)
}

/// Encoder seam shared by every dialect: write the canonical wire text of
/// `self` into an [`std::io::Write`] sink. `len` is the exact byte count
/// `write` will produce, computed without encoding.
pub trait WritableMessage {
    type Error;

    fn len(&self) -> usize;

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), Self::Error>;

    /// Canonical wire text as an owned string.
    fn encode(&self) -> Result<String, Self::Error>
    where
        Self::Error: From<std::io::Error>,
    {
        let mut buf = Vec::with_capacity(self.len());
        self.write(&mut buf)?;
        // Encoders only ever emit UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum SyslogMessageWritingError {
    #[strum(to_string = "std io error: {0}")]
    StdIOError(String),
    #[strum(to_string = "{0}")]
    Rfc3164Error(Rfc3164WritingError),
    #[strum(to_string = "{0}")]
    Rfc5424Error(Rfc5424WritingError),
    #[strum(to_string = "{0}")]
    CefError(CefWritingError),
}

impl std::error::Error for SyslogMessageWritingError {}

impl From<std::io::Error> for SyslogMessageWritingError {
    fn from(err: std::io::Error) -> Self {
        Self::StdIOError(err.to_string())
    }
}

impl From<Rfc3164WritingError> for SyslogMessageWritingError {
    fn from(err: Rfc3164WritingError) -> Self {
        Self::Rfc3164Error(err)
    }
}

impl From<Rfc5424WritingError> for SyslogMessageWritingError {
    fn from(err: Rfc5424WritingError) -> Self {
        Self::Rfc5424Error(err)
    }
}

impl From<CefWritingError> for SyslogMessageWritingError {
    fn from(err: CefWritingError) -> Self {
        Self::CefError(err)
    }
}

impl WritableMessage for UnknownMessage {
    type Error = SyslogMessageWritingError;

    fn len(&self) -> usize {
        self.raw_message().len()
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), Self::Error> {
        writer.write_all(self.raw_message().as_bytes())?;
        Ok(())
    }
}

impl WritableMessage for SyslogMessage {
    type Error = SyslogMessageWritingError;

    fn len(&self) -> usize {
        match self {
            Self::Rfc3164(msg) => msg.len(),
            Self::Rfc5424(msg) => msg.len(),
            Self::Cef(msg) => msg.len(),
            Self::Unknown(msg) => msg.len(),
        }
    }

    fn write<T: Write>(&self, writer: &mut T) -> Result<(), Self::Error> {
        match self {
            Self::Rfc3164(msg) => msg.write(writer)?,
            Self::Rfc5424(msg) => msg.write(writer)?,
            Self::Cef(msg) => msg.write(writer)?,
            Self::Unknown(msg) => msg.write(writer)?,
        }
        Ok(())
    }
}

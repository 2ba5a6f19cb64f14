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

//! Stream framing codecs for syslog over TCP
//! ([RFC 6587](https://datatracker.ietf.org/doc/html/rfc6587)).
//!
//! [`SyslogFrameCodec`] cuts the byte stream into message frames, preferring
//! octet counting (`LEN SP MSG`) and falling back to newline-terminated
//! non-transparent framing when no count prefix is present.
//! [`SyslogCodec`] stacks dialect classification on top, turning each frame
//! into a [`SyslogMessage`].

use crate::{
    wire::{
        deserializer::SyslogParser,
        serializer::{SyslogMessageWritingError, WritableMessage},
    },
    SyslogMessage, SyslogRequest,
};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::Utc;
use std::net::IpAddr;
use tokio_util::codec::{Decoder, Encoder};

/// Frames larger than this are treated as a protocol violation rather than
/// buffered indefinitely.
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 16 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum SyslogCodecError {
    #[strum(to_string = "std io error: {0}")]
    StdIOError(String),
    #[strum(to_string = "frame of {0} octets exceeds the configured maximum")]
    FrameTooLong(usize),
    #[strum(to_string = "octet count prefix '{0}' is not a valid length")]
    InvalidOctetCount(String),
    #[strum(to_string = "writing error: {0}")]
    WritingError(SyslogMessageWritingError),
}

impl std::error::Error for SyslogCodecError {}

impl From<std::io::Error> for SyslogCodecError {
    fn from(err: std::io::Error) -> Self {
        Self::StdIOError(err.to_string())
    }
}

impl From<SyslogMessageWritingError> for SyslogCodecError {
    fn from(err: SyslogMessageWritingError) -> Self {
        Self::WritingError(err)
    }
}

/// RFC 6587 frame splitter. A frame starting with a digit run followed by a
/// space is octet-counted; anything else is cut at the next `\n`, with a
/// trailing `\r` stripped. Inter-frame whitespace is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyslogFrameCodec {
    max_frame_length: usize,
}

impl Default for SyslogFrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LENGTH)
    }
}

impl SyslogFrameCodec {
    pub const fn new(max_frame_length: usize) -> Self {
        Self { max_frame_length }
    }

    pub const fn max_frame_length(&self) -> usize {
        self.max_frame_length
    }

    fn decode_line(&self, buf: &mut BytesMut) -> Result<Option<BytesMut>, SyslogCodecError> {
        match buf.iter().position(|&b| b == b'\n') {
            Some(newline) => {
                let mut frame = buf.split_to(newline);
                buf.advance(1);
                if frame.last() == Some(&b'\r') {
                    frame.truncate(frame.len() - 1);
                }
                Ok(Some(frame))
            }
            None => {
                if buf.len() > self.max_frame_length {
                    return Err(SyslogCodecError::FrameTooLong(buf.len()));
                }
                Ok(None)
            }
        }
    }
}

impl Decoder for SyslogFrameCodec {
    type Item = BytesMut;
    type Error = SyslogCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while buf.first().is_some_and(u8::is_ascii_whitespace) {
            buf.advance(1);
        }
        if buf.is_empty() {
            return Ok(None);
        }
        let digits = buf.iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return self.decode_line(buf);
        }
        if digits == buf.len() {
            // Count prefix may still be incomplete.
            return Ok(None);
        }
        if buf[digits] != b' ' {
            return self.decode_line(buf);
        }
        // The run is pure ASCII digits, so only overflow can fail here.
        let count: usize = {
            let prefix = String::from_utf8_lossy(&buf[..digits]);
            prefix
                .parse()
                .map_err(|_| SyslogCodecError::InvalidOctetCount(prefix.to_string()))?
        };
        if count > self.max_frame_length {
            return Err(SyslogCodecError::FrameTooLong(count));
        }
        if buf.len() < digits + 1 + count {
            buf.reserve(digits + 1 + count - buf.len());
            return Ok(None);
        }
        buf.advance(digits + 1);
        Ok(Some(buf.split_to(count)))
    }
}

impl Encoder<Bytes> for SyslogFrameCodec {
    type Error = SyslogCodecError;

    fn encode(&mut self, frame: Bytes, buf: &mut BytesMut) -> Result<(), Self::Error> {
        if frame.len() > self.max_frame_length {
            return Err(SyslogCodecError::FrameTooLong(frame.len()));
        }
        let prefix = frame.len().to_string();
        buf.reserve(prefix.len() + 1 + frame.len());
        buf.put_slice(prefix.as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(&frame);
        Ok(())
    }
}

/// Message-level codec: frames the stream, then classifies each frame.
/// Unclassifiable frames still decode, as [`SyslogMessage::Unknown`].
/// Encoded messages go out octet-counted.
#[derive(Debug, Default)]
pub struct SyslogCodec {
    frames: SyslogFrameCodec,
    parser: SyslogParser,
    remote_address: Option<IpAddr>,
}

impl SyslogCodec {
    pub fn new(frames: SyslogFrameCodec, parser: SyslogParser) -> Self {
        Self {
            frames,
            parser,
            remote_address: None,
        }
    }

    /// Stamp every decoded message with the peer address of the connection
    /// this codec serves.
    pub fn with_remote_address(mut self, remote_address: IpAddr) -> Self {
        self.remote_address = Some(remote_address);
        self
    }
}

impl Decoder for SyslogCodec {
    type Item = SyslogMessage;
    type Error = SyslogCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(frame) = self.frames.decode(buf)? else {
            return Ok(None);
        };
        // Lossy: a frame with broken UTF-8 still decodes, worst case as
        // an unknown message with replacement characters.
        let raw = String::from_utf8_lossy(&frame);
        let request = SyslogRequest::new(&raw, self.remote_address, Utc::now());
        Ok(Some(self.parser.parse(&request)))
    }
}

impl Encoder<SyslogMessage> for SyslogCodec {
    type Error = SyslogCodecError;

    fn encode(&mut self, message: SyslogMessage, buf: &mut BytesMut) -> Result<(), Self::Error> {
        let text = message.encode()?;
        self.frames.encode(Bytes::from(text), buf)
    }
}

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

//! Normalized representation of the syslog message family (BSD syslog
//! [RFC 3164](https://datatracker.ietf.org/doc/html/rfc3164), structured
//! syslog [RFC 5424](https://datatracker.ietf.org/doc/html/rfc5424), ArcSight
//! CEF and close vendor variants), together with wire-level serde for each
//! dialect and the
//! [RFC 6587](https://datatracker.ietf.org/doc/html/rfc6587) octet-counting
//! stream framing.
//!
//! A raw message plus its receipt envelope ([`SyslogRequest`]) goes through
//! [`wire::deserializer::SyslogParser`], which tries the dialect grammars in
//! a fixed precedence order and always yields a [`SyslogMessage`] — at worst
//! an [`UnknownMessage`] carrying the raw text. The inverse direction is
//! [`wire::serializer::WritableMessage`].

#[cfg(feature = "codec")]
pub mod codec;
pub mod iana;
pub mod timestamp;
pub mod wire;

use crate::iana::Priority;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Receipt envelope handed in by the transport layer: the already-decoded
/// message text plus where and when it arrived. The receipt instant doubles
/// as the fallback timestamp when the message carries no parseable date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyslogRequest<'a> {
    raw_message: &'a str,
    remote_address: Option<IpAddr>,
    received_at: DateTime<Utc>,
}

impl<'a> SyslogRequest<'a> {
    pub const fn new(
        raw_message: &'a str,
        remote_address: Option<IpAddr>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            raw_message,
            remote_address,
            received_at,
        }
    }

    /// Envelope for a message received just now from an unknown sender.
    pub fn local(raw_message: &'a str) -> Self {
        Self::new(raw_message, None, Utc::now())
    }

    pub const fn raw_message(&self) -> &'a str {
        self.raw_message
    }

    pub const fn remote_address(&self) -> Option<IpAddr> {
        self.remote_address
    }

    pub const fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }
}

/// One `[id key="value" ...]` group of an RFC 5424 structured-data section.
///
/// Parameter order is kept as written on the wire so re-encoding is
/// deterministic; equality is order-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDataElement {
    id: String,
    params: IndexMap<String, String>,
}

impl StructuredDataElement {
    pub const fn new(id: String, params: IndexMap<String, String>) -> Self {
        Self { id, params }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub const fn params(&self) -> &IndexMap<String, String> {
        &self.params
    }
}

/// BSD syslog message (RFC 3164), also produced by the looser vendor
/// grammars that share its shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rfc3164Message {
    timestamp: DateTime<Utc>,
    remote_address: Option<IpAddr>,
    raw_message: String,
    priority: Option<Priority>,
    host: String,
    tag: Option<String>,
    process_id: Option<String>,
    message: String,
}

impl Rfc3164Message {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        timestamp: DateTime<Utc>,
        remote_address: Option<IpAddr>,
        raw_message: String,
        priority: Option<Priority>,
        host: String,
        tag: Option<String>,
        process_id: Option<String>,
        message: String,
    ) -> Self {
        Self {
            timestamp,
            remote_address,
            raw_message,
            priority,
            host,
            tag,
            process_id,
            message,
        }
    }

    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub const fn remote_address(&self) -> Option<IpAddr> {
        self.remote_address
    }

    pub fn raw_message(&self) -> &str {
        &self.raw_message
    }

    pub const fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn process_id(&self) -> Option<&str> {
        self.process_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Structured syslog message (RFC 5424). Priority and version are mandatory
/// on this dialect's wire grammar; the `-` nil token of app-name, proc-id
/// and msg-id decodes to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rfc5424Message {
    timestamp: DateTime<Utc>,
    remote_address: Option<IpAddr>,
    raw_message: String,
    priority: Priority,
    version: u16,
    host: String,
    app_name: Option<String>,
    proc_id: Option<String>,
    message_id: Option<String>,
    structured_data: Vec<StructuredDataElement>,
    message: String,
}

impl Rfc5424Message {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        timestamp: DateTime<Utc>,
        remote_address: Option<IpAddr>,
        raw_message: String,
        priority: Priority,
        version: u16,
        host: String,
        app_name: Option<String>,
        proc_id: Option<String>,
        message_id: Option<String>,
        structured_data: Vec<StructuredDataElement>,
        message: String,
    ) -> Self {
        Self {
            timestamp,
            remote_address,
            raw_message,
            priority,
            version,
            host,
            app_name,
            proc_id,
            message_id,
            structured_data,
            message,
        }
    }

    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub const fn remote_address(&self) -> Option<IpAddr> {
        self.remote_address
    }

    pub fn raw_message(&self) -> &str {
        &self.raw_message
    }

    pub const fn priority(&self) -> Priority {
        self.priority
    }

    pub const fn version(&self) -> u16 {
        self.version
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    pub fn proc_id(&self) -> Option<&str> {
        self.proc_id.as_deref()
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    pub fn structured_data(&self) -> &[StructuredDataElement] {
        &self.structured_data
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// ArcSight Common Event Format message carried over syslog. The six header
/// tokens are mandatory once the `CEF:` marker matched; the extension keeps
/// wire order for deterministic re-encoding while comparing
/// order-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CefMessage {
    timestamp: DateTime<Utc>,
    remote_address: Option<IpAddr>,
    raw_message: String,
    priority: Option<Priority>,
    version: u16,
    host: String,
    device_vendor: String,
    device_product: String,
    device_version: String,
    device_event_class_id: String,
    name: String,
    severity: String,
    extension: IndexMap<String, String>,
}

impl CefMessage {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        timestamp: DateTime<Utc>,
        remote_address: Option<IpAddr>,
        raw_message: String,
        priority: Option<Priority>,
        version: u16,
        host: String,
        device_vendor: String,
        device_product: String,
        device_version: String,
        device_event_class_id: String,
        name: String,
        severity: String,
        extension: IndexMap<String, String>,
    ) -> Self {
        Self {
            timestamp,
            remote_address,
            raw_message,
            priority,
            version,
            host,
            device_vendor,
            device_product,
            device_version,
            device_event_class_id,
            name,
            severity,
            extension,
        }
    }

    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub const fn remote_address(&self) -> Option<IpAddr> {
        self.remote_address
    }

    pub fn raw_message(&self) -> &str {
        &self.raw_message
    }

    pub const fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub const fn version(&self) -> u16 {
        self.version
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn device_vendor(&self) -> &str {
        &self.device_vendor
    }

    pub fn device_product(&self) -> &str {
        &self.device_product
    }

    pub fn device_version(&self) -> &str {
        &self.device_version
    }

    pub fn device_event_class_id(&self) -> &str {
        &self.device_event_class_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn severity(&self) -> &str {
        &self.severity
    }

    pub const fn extension(&self) -> &IndexMap<String, String> {
        &self.extension
    }
}

/// Terminal state for input no dialect grammar could classify. Keeps the raw
/// text, the sender and the receipt time so an external logger can report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownMessage {
    timestamp: DateTime<Utc>,
    remote_address: Option<IpAddr>,
    raw_message: String,
}

impl UnknownMessage {
    pub const fn new(
        timestamp: DateTime<Utc>,
        remote_address: Option<IpAddr>,
        raw_message: String,
    ) -> Self {
        Self {
            timestamp,
            remote_address,
            raw_message,
        }
    }

    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub const fn remote_address(&self) -> Option<IpAddr> {
        self.remote_address
    }

    pub fn raw_message(&self) -> &str {
        &self.raw_message
    }
}

impl From<&SyslogRequest<'_>> for UnknownMessage {
    fn from(request: &SyslogRequest<'_>) -> Self {
        Self::new(
            request.received_at(),
            request.remote_address(),
            request.raw_message().to_string(),
        )
    }
}

/// Normalized result of one parse. Exactly one dialect tag is set; fields
/// other dialects carry simply don't exist on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum SyslogMessage {
    Rfc3164(Rfc3164Message),
    Rfc5424(Rfc5424Message),
    Cef(CefMessage),
    Unknown(UnknownMessage),
}

impl SyslogMessage {
    /// The dialect grammar behind this variant; `None` for the unknown
    /// fallback. Cisco-style messages normalize into the BSD shape and
    /// report as such.
    pub const fn dialect(&self) -> Option<wire::deserializer::SyslogDialect> {
        match self {
            Self::Rfc3164(_) => Some(wire::deserializer::SyslogDialect::Rfc3164),
            Self::Rfc5424(_) => Some(wire::deserializer::SyslogDialect::Rfc5424),
            Self::Cef(_) => Some(wire::deserializer::SyslogDialect::Cef),
            Self::Unknown(_) => None,
        }
    }

    /// Parsed message date, or the receipt time when the input carried none.
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Rfc3164(msg) => msg.timestamp(),
            Self::Rfc5424(msg) => msg.timestamp(),
            Self::Cef(msg) => msg.timestamp(),
            Self::Unknown(msg) => msg.timestamp(),
        }
    }

    pub const fn remote_address(&self) -> Option<IpAddr> {
        match self {
            Self::Rfc3164(msg) => msg.remote_address(),
            Self::Rfc5424(msg) => msg.remote_address(),
            Self::Cef(msg) => msg.remote_address(),
            Self::Unknown(msg) => msg.remote_address(),
        }
    }

    pub fn raw_message(&self) -> &str {
        match self {
            Self::Rfc3164(msg) => msg.raw_message(),
            Self::Rfc5424(msg) => msg.raw_message(),
            Self::Cef(msg) => msg.raw_message(),
            Self::Unknown(msg) => msg.raw_message(),
        }
    }

    /// Combined facility/level value, present only when the wire encoding
    /// carried a `<N>` prefix.
    pub const fn priority(&self) -> Option<Priority> {
        match self {
            Self::Rfc3164(msg) => msg.priority(),
            Self::Rfc5424(msg) => Some(msg.priority()),
            Self::Cef(msg) => msg.priority(),
            Self::Unknown(_) => None,
        }
    }
}

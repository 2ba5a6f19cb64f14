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

//! Syslog protocol numbers registered by IANA: the facility and severity
//! codes packed into the wire `<priority>` value, and the bit arithmetic
//! tying the three together.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The combined facility/level value from the `<N>` wire prefix.
///
/// The arithmetic is deliberately unchecked: the valid range on the wire is
/// `0..=191`, but callers that hand in out-of-range values simply get
/// out-of-range facilities back. [`Priority::facility`] and
/// [`Priority::severity`] are the checked views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Priority(u16);

impl Priority {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn from_parts(facility: u16, level: u16) -> Self {
        Self(facility * 8 + level)
    }

    pub const fn raw(&self) -> u16 {
        self.0
    }

    pub const fn facility_raw(&self) -> u16 {
        self.0 >> 3
    }

    pub const fn severity_raw(&self) -> u16 {
        self.0 - (self.facility_raw() << 3)
    }

    pub fn facility(&self) -> Result<Facility, UndefinedFacility> {
        Facility::try_from(self.facility_raw())
    }

    pub fn severity(&self) -> Result<Severity, UndefinedSeverity> {
        Severity::try_from(self.severity_raw())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// Error type for values not assigned a facility keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndefinedFacility(pub u16);

impl fmt::Display for UndefinedFacility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "undefined syslog facility code: {}", self.0)
    }
}

impl std::error::Error for UndefinedFacility {}

/// Error type for values not assigned a severity keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndefinedSeverity(pub u16);

impl fmt::Display for UndefinedSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "undefined syslog severity code: {}", self.0)
    }
}

impl std::error::Error for UndefinedSeverity {}

/// Facility codes `0..=23` with their conventional keywords.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[repr(u8)]
pub enum Facility {
    #[strum(to_string = "kern")]
    Kern = 0,
    #[strum(to_string = "user")]
    User = 1,
    #[strum(to_string = "mail")]
    Mail = 2,
    #[strum(to_string = "daemon")]
    Daemon = 3,
    #[strum(to_string = "auth")]
    Auth = 4,
    #[strum(to_string = "syslog")]
    Syslog = 5,
    #[strum(to_string = "lpr")]
    Lpr = 6,
    #[strum(to_string = "news")]
    News = 7,
    #[strum(to_string = "uucp")]
    Uucp = 8,
    #[strum(to_string = "cron")]
    Cron = 9,
    #[strum(to_string = "authpriv")]
    AuthPriv = 10,
    #[strum(to_string = "ftp")]
    Ftp = 11,
    #[strum(to_string = "ntp")]
    Ntp = 12,
    #[strum(to_string = "audit")]
    Audit = 13,
    #[strum(to_string = "alert")]
    Alert = 14,
    #[strum(to_string = "clock")]
    Clock = 15,
    #[strum(to_string = "local0")]
    Local0 = 16,
    #[strum(to_string = "local1")]
    Local1 = 17,
    #[strum(to_string = "local2")]
    Local2 = 18,
    #[strum(to_string = "local3")]
    Local3 = 19,
    #[strum(to_string = "local4")]
    Local4 = 20,
    #[strum(to_string = "local5")]
    Local5 = 21,
    #[strum(to_string = "local6")]
    Local6 = 22,
    #[strum(to_string = "local7")]
    Local7 = 23,
}

impl From<Facility> for u16 {
    fn from(value: Facility) -> Self {
        value as u16
    }
}

impl TryFrom<u16> for Facility {
    type Error = UndefinedFacility;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Kern),
            1 => Ok(Self::User),
            2 => Ok(Self::Mail),
            3 => Ok(Self::Daemon),
            4 => Ok(Self::Auth),
            5 => Ok(Self::Syslog),
            6 => Ok(Self::Lpr),
            7 => Ok(Self::News),
            8 => Ok(Self::Uucp),
            9 => Ok(Self::Cron),
            10 => Ok(Self::AuthPriv),
            11 => Ok(Self::Ftp),
            12 => Ok(Self::Ntp),
            13 => Ok(Self::Audit),
            14 => Ok(Self::Alert),
            15 => Ok(Self::Clock),
            16 => Ok(Self::Local0),
            17 => Ok(Self::Local1),
            18 => Ok(Self::Local2),
            19 => Ok(Self::Local3),
            20 => Ok(Self::Local4),
            21 => Ok(Self::Local5),
            22 => Ok(Self::Local6),
            23 => Ok(Self::Local7),
            value => Err(UndefinedFacility(value)),
        }
    }
}

/// Severity codes `0..=7` with their conventional keywords.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[repr(u8)]
pub enum Severity {
    #[strum(to_string = "emerg")]
    Emergency = 0,
    #[strum(to_string = "alert")]
    Alert = 1,
    #[strum(to_string = "crit")]
    Critical = 2,
    #[strum(to_string = "err")]
    Error = 3,
    #[strum(to_string = "warning")]
    Warning = 4,
    #[strum(to_string = "notice")]
    Notice = 5,
    #[strum(to_string = "info")]
    Informational = 6,
    #[strum(to_string = "debug")]
    Debug = 7,
}

impl From<Severity> for u16 {
    fn from(value: Severity) -> Self {
        value as u16
    }
}

impl TryFrom<u16> for Severity {
    type Error = UndefinedSeverity;

    fn try_from(value: u16) -> Result<Self, <Self as TryFrom<u16>>::Error> {
        match value {
            0 => Ok(Self::Emergency),
            1 => Ok(Self::Alert),
            2 => Ok(Self::Critical),
            3 => Ok(Self::Error),
            4 => Ok(Self::Warning),
            5 => Ok(Self::Notice),
            6 => Ok(Self::Informational),
            7 => Ok(Self::Debug),
            value => Err(UndefinedSeverity(value)),
        }
    }
}

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
    wire::{
        deserializer::{SyslogDialect, SyslogParser, DEFAULT_DIALECT_ORDER},
        serializer::WritableMessage,
    },
    SyslogMessage, SyslogRequest,
};
use chrono::{TimeZone, Utc};
use rstest::rstest;
use std::net::{IpAddr, Ipv4Addr};

fn request(raw: &str) -> SyslogRequest<'_> {
    SyslogRequest::new(
        raw,
        Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7))),
        Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap(),
    )
}

#[rstest]
#[case::cef(
    "<13>Sep 29 08:26:10 host CEF:0|Security|threatmanager|1.0|100|worm stopped|10|src=10.0.0.1",
    SyslogDialect::Cef
)]
#[case::rfc5424(
    "<34>1 2019-10-11T22:14:15.003Z mymachine.example.com su - ID47 - BOM'su root' failed",
    SyslogDialect::Rfc5424
)]
#[case::cisco(
    "Mar 29 2019 03:15:34: %SEC-6-IPACCESSLOGP: list 120 denied tcp 10.0.0.1(1027)",
    SyslogDialect::Cisco
)]
#[case::rfc3164(
    "<34>Oct 11 22:14:15 mymachine su: 'su root' failed for lonvick on /dev/pts/8",
    SyslogDialect::Rfc3164
)]
fn test_classification(#[case] raw: &str, #[case] expected: SyslogDialect) {
    let parser = SyslogParser::default();
    let message = parser.parse(&request(raw));
    let classified = match &message {
        SyslogMessage::Cef(_) => Some(SyslogDialect::Cef),
        SyslogMessage::Rfc5424(_) => Some(SyslogDialect::Rfc5424),
        SyslogMessage::Rfc3164(msg) if msg.tag().is_none() && msg.priority().is_none() => {
            Some(SyslogDialect::Cisco)
        }
        SyslogMessage::Rfc3164(_) => Some(SyslogDialect::Rfc3164),
        SyslogMessage::Unknown(_) => None,
    };
    assert_eq!(classified, Some(expected), "input: {raw}");
}

#[test]
fn test_dispatch_order_is_deterministic() {
    // This line satisfies both the CEF grammar and the looser BSD grammar;
    // the default precedence must settle it as CEF every time.
    let raw = "<13>Sep 29 08:26:10 host CEF:0|V|P|1.0|c|n|5|src=10.0.0.1";
    let parser = SyslogParser::default();
    for _ in 0..8 {
        assert!(matches!(
            parser.parse(&request(raw)),
            SyslogMessage::Cef(_)
        ));
    }
    assert_eq!(parser.dialect_order(), DEFAULT_DIALECT_ORDER.as_slice());
}

#[test]
fn test_unclassifiable_input_becomes_unknown() {
    let parser = SyslogParser::default();
    let req = request("complete garbage, no grammar wants this");
    let message = parser.parse(&req);
    let SyslogMessage::Unknown(msg) = &message else {
        panic!("expected the unknown fallback");
    };
    assert_eq!(msg.raw_message(), req.raw_message());
    assert_eq!(msg.timestamp(), req.received_at());
    assert_eq!(msg.remote_address(), req.remote_address());

    let empty = request("");
    let message = parser.parse(&empty);
    let SyslogMessage::Unknown(msg) = &message else {
        panic!("expected the unknown fallback");
    };
    assert_eq!(msg.raw_message(), "");
    assert_eq!(msg.timestamp(), empty.received_at());
}

#[test]
fn test_remote_address_flows_through_every_dialect() {
    let parser = SyslogParser::default();
    for raw in [
        "<34>Oct 11 22:14:15 mymachine su: body",
        "<34>1 2019-10-11T22:14:15Z host app - - - body",
        "<13>Sep 29 08:26:10 host CEF:0|V|P|1.0|c|n|5|",
        "not syslog at all",
    ] {
        let message = parser.parse(&request(raw));
        assert_eq!(
            message.remote_address(),
            Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7))),
            "input: {raw}"
        );
    }
}

#[rstest]
#[case::rfc3164("<34>Oct 11 22:14:15 mymachine su: 'su root' failed for lonvick on /dev/pts/8")]
#[case::rfc3164_pid("<13>Mar  2 01:02:03 host sshd[4721]: session opened")]
#[case::rfc5424(
    "<165>1 2003-10-11T22:14:15.003000Z mymachine.example.com evntslog - ID47 \
     [exampleSDID@32473 iut=\"3\" eventSource=\"Application\"] An application event log entry"
)]
#[case::cef(
    "<13>Sep 29 08:26:10 host CEF:0|Security|threatmanager|1.0|100|worm stopped|10|src=10.0.0.1 spt=1232"
)]
fn test_canonical_text_round_trips(#[case] raw: &str) {
    let parser = SyslogParser::default();
    let message = parser.parse(&request(raw));
    assert!(!matches!(message, SyslogMessage::Unknown(_)), "input: {raw}");
    assert_eq!(message.encode().unwrap(), raw);
    assert_eq!(message.len(), raw.len());
}

#[test]
fn test_model_survives_serde_json() {
    let parser = SyslogParser::default();
    for raw in [
        "<34>Oct 11 22:14:15 mymachine su: body",
        "<165>1 2019-10-11T22:14:15.003Z host evntslog - ID47 [id k=\"v\"] body",
        "<13>Sep 29 08:26:10 host CEF:0|V|P|1.0|c|n|5|src=10.0.0.1",
        "free text",
    ] {
        let message = parser.parse(&request(raw));
        let json = serde_json::to_string(&message).unwrap();
        let back: SyslogMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message, "input: {raw}");
    }
}

#[test]
fn test_dialect_accessor() {
    let parser = SyslogParser::default();
    assert_eq!(
        parser
            .parse(&request("<34>Oct 11 22:14:15 host su: body"))
            .dialect(),
        Some(SyslogDialect::Rfc3164)
    );
    assert_eq!(
        parser
            .parse(&request("<13>Sep 29 08:26:10 host CEF:0|V|P|1.0|c|n|5|"))
            .dialect(),
        Some(SyslogDialect::Cef)
    );
    assert_eq!(parser.parse(&request("garbage in")).dialect(), None);
}

#[test]
fn test_custom_dialect_order_is_honored() {
    // With the BSD grammar promoted to the front, a CEF line lands there
    // because the BSD grammar also matches it.
    let parser = SyslogParser::new(
        vec![SyslogDialect::Rfc3164, SyslogDialect::Cef],
        Default::default(),
    );
    let raw = "<13>Sep 29 08:26:10 host CEF:0|V|P|1.0|c|n|5|src=10.0.0.1";
    assert!(matches!(
        parser.parse(&request(raw)),
        SyslogMessage::Rfc3164(_)
    ));
}

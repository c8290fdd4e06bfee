//! DNS record check: compares live resolver answers against a configured
//! expectation set.
//!
//! The comparison is order-independent and value-unique: answers are
//! rendered to a canonical string form and deduplicated before they are held
//! against the expected set. An absent `expected_answer` list means "expect
//! an empty answer set".

use crate::check::{Check, ExecuteError, ProbeError};
use hickory_resolver::Resolver;
use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::{RData, RecordType};
use std::collections::BTreeSet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs};
use tracing::debug;
use vigil_config::CheckOptions;
use vigil_types::{Issue, ids};

const K_DNS_SERVER: &str = "dns_server";
const K_DNS_QUESTION: &str = "dns_question";
const K_DNS_QUESTION_TYPE: &str = "dns_question_type";
const K_EXPECTED_ANSWER: &str = "expected_answer";

const REQUIRED_KEYS: &[&str] = &[K_DNS_SERVER, K_DNS_QUESTION, K_DNS_QUESTION_TYPE];

const DEFAULT_DNS_PORT: u16 = 53;

/// The record types the check knows how to question and render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    A,
    Aaaa,
    Cname,
    Mx,
    Txt,
}

impl RecordKind {
    /// Case-insensitive parse of the configured question type.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "AAAA" => Some(Self::Aaaa),
            "CNAME" => Some(Self::Cname),
            "MX" => Some(Self::Mx),
            "TXT" => Some(Self::Txt),
            _ => None,
        }
    }

    fn record_type(self) -> RecordType {
        match self {
            Self::A => RecordType::A,
            Self::Aaaa => RecordType::AAAA,
            Self::Cname => RecordType::CNAME,
            Self::Mx => RecordType::MX,
            Self::Txt => RecordType::TXT,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Txt => "TXT",
        };
        f.write_str(name)
    }
}

/// One answer record, before canonical rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Cname(String),
    Mx(String),
    Txt(String),
}

impl RecordData {
    /// Canonical string form used for comparison: numeric addresses, target
    /// names without the trailing dot, TXT payloads with one wrapping quote
    /// pair stripped.
    pub fn canonical(&self) -> String {
        match self {
            Self::A(addr) => addr.to_string(),
            Self::Aaaa(addr) => addr.to_string(),
            Self::Cname(name) | Self::Mx(name) => name.trim_end_matches('.').to_string(),
            Self::Txt(text) => strip_wrapping_quotes(text).to_string(),
        }
    }
}

/// Structured result of one resolution query.
///
/// The two negative response classes are distinct outcomes, not errors: the
/// check decides whether either one is a compliance deviation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupOutcome {
    Records(Vec<RecordData>),
    /// The name does not exist at all (NXDOMAIN).
    NameNotFound,
    /// The name exists but has no records of the questioned type.
    NoRecordsOfType,
}

/// Seam between the check logic and the wire. Production uses
/// [`ResolverLookup`]; tests inject scripted outcomes.
pub trait DnsLookup: Send {
    fn lookup(
        &self,
        server: &str,
        name: &str,
        kind: RecordKind,
    ) -> Result<LookupOutcome, ProbeError>;
}

/// Compares one DNS answer set against the configured expectation.
pub struct DnsCheck {
    id: String,
    options: CheckOptions,
    lookup: Box<dyn DnsLookup>,
}

impl DnsCheck {
    pub fn new(id: String, options: CheckOptions) -> Self {
        Self::with_lookup(id, options, Box::new(ResolverLookup))
    }

    pub fn with_lookup(id: String, options: CheckOptions, lookup: Box<dyn DnsLookup>) -> Self {
        Self { id, options, lookup }
    }

    fn issue(&self, message: String) -> Issue {
        Issue::new(self.id.as_str(), ids::CHECK_TYPE_DNS, message)
    }

    fn compare(
        &self,
        question: &str,
        expected: &BTreeSet<String>,
        found: &BTreeSet<String>,
    ) -> Vec<Issue> {
        if expected.is_empty() && !found.is_empty() {
            return vec![self.issue(format!(
                "expected no DNS records for '{question}' but found {}: [{}]",
                found.len(),
                join(found)
            ))];
        }

        if expected.len() != found.len() {
            return vec![self.issue(format!(
                "expected {} DNS records for '{question}' but found {}: found [{}], expected [{}]",
                expected.len(),
                found.len(),
                join(found),
                join(expected)
            ))];
        }

        for value in expected {
            if !found.contains(value) {
                return vec![self.issue(format!(
                    "expected DNS records [{}] for '{question}' but found [{}]",
                    join(expected),
                    join(found)
                ))];
            }
        }

        Vec::new()
    }
}

impl Check for DnsCheck {
    fn check_id(&self) -> &str {
        &self.id
    }

    fn type_identifier(&self) -> &'static str {
        ids::CHECK_TYPE_DNS
    }

    fn required_keys(&self) -> &'static [&'static str] {
        REQUIRED_KEYS
    }

    fn options(&self) -> &CheckOptions {
        &self.options
    }

    fn execute(&self) -> Result<Vec<Issue>, ExecuteError> {
        let server = self.options.require_str(K_DNS_SERVER)?;
        let question = self.options.require_str(K_DNS_QUESTION)?;
        let raw_kind = self.options.require_str(K_DNS_QUESTION_TYPE)?;
        let kind = RecordKind::parse(&raw_kind).ok_or_else(|| {
            ExecuteError::UnsupportedValue(format!(
                "unsupported DNS question type '{raw_kind}'"
            ))
        })?;
        let expected: BTreeSet<String> = self
            .options
            .string_list(K_EXPECTED_ANSWER)?
            .into_iter()
            .collect();

        match self.lookup.lookup(&server, &question, kind)? {
            LookupOutcome::NameNotFound => Ok(vec![
                self.issue(format!("DNS name '{question}' does not exist")),
            ]),
            LookupOutcome::NoRecordsOfType if expected.is_empty() => {
                debug!(
                    check_id = %self.id,
                    question = %question,
                    "no records of the questioned type and none expected"
                );
                Ok(Vec::new())
            }
            LookupOutcome::NoRecordsOfType => Ok(vec![self.issue(format!(
                "expected {kind} records for '{question}' but none were found"
            ))]),
            LookupOutcome::Records(records) => {
                let found: BTreeSet<String> =
                    records.iter().map(RecordData::canonical).collect();
                Ok(self.compare(&question, &expected, &found))
            }
        }
    }
}

/// Production lookup against the configured server only, via
/// `hickory-resolver`. Negative responses are classified by structured
/// response codes, not error-message text.
pub struct ResolverLookup;

impl DnsLookup for ResolverLookup {
    fn lookup(
        &self,
        server: &str,
        name: &str,
        kind: RecordKind,
    ) -> Result<LookupOutcome, ProbeError> {
        let socket_addr = resolve_server_addr(server)?;

        let mut config = ResolverConfig::new();
        config.add_name_server(NameServerConfig::new(socket_addr, Protocol::Udp));
        let mut opts = ResolverOpts::default();
        opts.use_hosts_file = false;

        let resolver = Resolver::new(config, opts)
            .map_err(|err| ProbeError(format!("failed to construct resolver: {err}")))?;

        match resolver.lookup(name, kind.record_type()) {
            Ok(lookup) => {
                let mut records = Vec::new();
                for rdata in lookup.iter() {
                    records.push(convert_rdata(rdata)?);
                }
                Ok(LookupOutcome::Records(records))
            }
            Err(err) => match err.kind() {
                ResolveErrorKind::NoRecordsFound { response_code, .. }
                    if *response_code == ResponseCode::NXDomain =>
                {
                    Ok(LookupOutcome::NameNotFound)
                }
                ResolveErrorKind::NoRecordsFound { .. } => Ok(LookupOutcome::NoRecordsOfType),
                _ => Err(ProbeError(format!("dns lookup failed: {err}"))),
            },
        }
    }
}

fn convert_rdata(rdata: &RData) -> Result<RecordData, ProbeError> {
    match rdata {
        RData::A(a) => Ok(RecordData::A(a.0)),
        RData::AAAA(aaaa) => Ok(RecordData::Aaaa(aaaa.0)),
        RData::CNAME(cname) => Ok(RecordData::Cname(cname.0.to_utf8())),
        RData::MX(mx) => Ok(RecordData::Mx(mx.exchange().to_utf8())),
        RData::TXT(txt) => {
            let text: String = txt
                .txt_data()
                .iter()
                .map(|part| String::from_utf8_lossy(part).into_owned())
                .collect();
            Ok(RecordData::Txt(text))
        }
        other => Err(ProbeError(format!(
            "unsupported record data in response: {other:?}"
        ))),
    }
}

fn resolve_server_addr(server: &str) -> Result<SocketAddr, ProbeError> {
    if let Ok(ip) = server.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_DNS_PORT));
    }
    if let Ok(addr) = server.parse::<SocketAddr>() {
        return Ok(addr);
    }
    (server, DEFAULT_DNS_PORT)
        .to_socket_addrs()
        .map_err(|err| ProbeError(format!("cannot resolve dns server '{server}': {err}")))?
        .next()
        .ok_or_else(|| ProbeError(format!("dns server '{server}' has no address")))
}

fn strip_wrapping_quotes(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

fn join(values: &BTreeSet<String>) -> String {
    values.iter().cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::Value as JsonValue;
    use serde_json::json;

    struct FakeLookup {
        outcome: Result<LookupOutcome, String>,
    }

    impl FakeLookup {
        fn records(records: Vec<RecordData>) -> Box<Self> {
            Box::new(Self {
                outcome: Ok(LookupOutcome::Records(records)),
            })
        }

        fn outcome(outcome: LookupOutcome) -> Box<Self> {
            Box::new(Self { outcome: Ok(outcome) })
        }

        fn failing(cause: &str) -> Box<Self> {
            Box::new(Self {
                outcome: Err(cause.to_string()),
            })
        }
    }

    impl DnsLookup for FakeLookup {
        fn lookup(
            &self,
            _server: &str,
            _name: &str,
            _kind: RecordKind,
        ) -> Result<LookupOutcome, ProbeError> {
            match &self.outcome {
                Ok(outcome) => Ok(outcome.clone()),
                Err(cause) => Err(ProbeError(cause.clone())),
            }
        }
    }

    fn options(value: JsonValue) -> CheckOptions {
        let JsonValue::Object(map) = value else {
            panic!("test options must be an object");
        };
        CheckOptions::new(map.into_iter().collect())
    }

    fn dns_check(value: JsonValue, lookup: Box<dyn DnsLookup>) -> DnsCheck {
        DnsCheck::with_lookup("www".to_string(), options(value), lookup)
    }

    fn a_options(expected: JsonValue) -> JsonValue {
        json!({
            "dns_server": "9.9.9.9",
            "dns_question": "example.org",
            "dns_question_type": "a",
            "expected_answer": expected,
        })
    }

    fn a(addr: &str) -> RecordData {
        RecordData::A(addr.parse().expect("ipv4 literal"))
    }

    #[test]
    fn exact_match_produces_no_issues() {
        let check = dns_check(
            a_options(json!(["1.2.3.4"])),
            FakeLookup::records(vec![a("1.2.3.4")]),
        );
        assert_eq!(check.execute().unwrap(), Vec::new());
    }

    #[test]
    fn count_mismatch_names_both_lists() {
        let check = dns_check(
            a_options(json!(["1.2.3.4"])),
            FakeLookup::records(vec![a("1.2.3.4"), a("5.6.7.8")]),
        );
        let issues = check.execute().unwrap();
        assert_eq!(issues.len(), 1);
        let message = &issues[0].message;
        assert!(message.contains("expected 1 DNS records"), "{message}");
        assert!(message.contains("found 2"), "{message}");
        assert!(message.contains("1.2.3.4"), "{message}");
        assert!(message.contains("5.6.7.8"), "{message}");
    }

    #[test]
    fn duplicate_answers_collapse_before_comparison() {
        let check = dns_check(
            a_options(json!(["1.2.3.4"])),
            FakeLookup::records(vec![a("1.2.3.4"), a("1.2.3.4")]),
        );
        assert_eq!(check.execute().unwrap(), Vec::new());
    }

    #[test]
    fn value_mismatch_with_equal_counts_lists_both_sets() {
        let check = dns_check(
            a_options(json!(["1.2.3.4"])),
            FakeLookup::records(vec![a("5.6.7.8")]),
        );
        let issues = check.execute().unwrap();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("1.2.3.4"));
        assert!(issues[0].message.contains("5.6.7.8"));
    }

    #[test]
    fn unexpected_records_when_none_expected() {
        let check = dns_check(
            json!({
                "dns_server": "9.9.9.9",
                "dns_question": "example.org",
                "dns_question_type": "a",
            }),
            FakeLookup::records(vec![a("1.2.3.4")]),
        );
        let issues = check.execute().unwrap();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("expected no DNS records"));
        assert!(issues[0].message.contains("1.2.3.4"));
    }

    #[test]
    fn no_records_and_no_expectations_is_success() {
        let check = dns_check(
            json!({
                "dns_server": "9.9.9.9",
                "dns_question": "example.org",
                "dns_question_type": "mx",
            }),
            FakeLookup::outcome(LookupOutcome::NoRecordsOfType),
        );
        assert_eq!(check.execute().unwrap(), Vec::new());
    }

    #[test]
    fn no_records_with_expectations_is_one_issue() {
        let check = dns_check(
            a_options(json!(["1.2.3.4"])),
            FakeLookup::outcome(LookupOutcome::NoRecordsOfType),
        );
        let issues = check.execute().unwrap();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("none were found"));
    }

    #[test]
    fn name_not_found_is_one_issue_regardless_of_expectations() {
        for expected in [json!([]), json!(["1.2.3.4"])] {
            let check = dns_check(
                a_options(expected),
                FakeLookup::outcome(LookupOutcome::NameNotFound),
            );
            let issues = check.execute().unwrap();
            assert_eq!(issues.len(), 1);
            assert!(issues[0].message.contains("'example.org'"));
            assert!(issues[0].message.contains("does not exist"));
        }
    }

    #[test]
    fn probe_failure_is_an_execution_error_not_an_issue() {
        let check = dns_check(
            a_options(json!(["1.2.3.4"])),
            FakeLookup::failing("connection refused"),
        );
        let err = check.execute().expect_err("probe failure");
        assert!(matches!(err, ExecuteError::Probe(_)));
    }

    #[test]
    fn unsupported_question_type_is_an_execution_error() {
        let check = dns_check(
            json!({
                "dns_server": "9.9.9.9",
                "dns_question": "example.org",
                "dns_question_type": "srv",
            }),
            FakeLookup::records(Vec::new()),
        );
        let err = check.execute().expect_err("unsupported type");
        assert!(matches!(err, ExecuteError::UnsupportedValue(_)));
        assert!(err.to_string().contains("'srv'"));
    }

    #[test]
    fn question_type_is_case_insensitive() {
        let check = dns_check(
            json!({
                "dns_server": "9.9.9.9",
                "dns_question": "example.org",
                "dns_question_type": "Mx",
                "expected_answer": ["mail.example.org"],
            }),
            FakeLookup::records(vec![RecordData::Mx("mail.example.org.".to_string())]),
        );
        assert_eq!(check.execute().unwrap(), Vec::new());
    }

    #[test]
    fn txt_payload_loses_one_wrapping_quote_pair() {
        let check = dns_check(
            json!({
                "dns_server": "9.9.9.9",
                "dns_question": "example.org",
                "dns_question_type": "txt",
                "expected_answer": ["v=spf1 -all"],
            }),
            FakeLookup::records(vec![RecordData::Txt("\"v=spf1 -all\"".to_string())]),
        );
        assert_eq!(check.execute().unwrap(), Vec::new());
    }

    #[test]
    fn required_keys_gate_execution_via_completeness() {
        let check = dns_check(json!({ "dns_server": "9.9.9.9" }), FakeLookup::records(Vec::new()));
        assert!(!check.is_configuration_complete());
        assert_eq!(
            check.missing_keys(),
            vec!["dns_question".to_string(), "dns_question_type".to_string()]
        );
    }

    proptest! {
        /// Duplicated raw answers must never manufacture a count mismatch.
        #[test]
        fn duplicated_answers_never_mismatch(
            values in proptest::collection::btree_set("[a-z]{1,8}", 1..5),
            copies in 1usize..4,
        ) {
            let records: Vec<RecordData> = values
                .iter()
                .flat_map(|v| std::iter::repeat_n(RecordData::Txt(v.clone()), copies))
                .collect();
            let expected: Vec<String> = values.iter().cloned().collect();
            let check = dns_check(
                json!({
                    "dns_server": "9.9.9.9",
                    "dns_question": "example.org",
                    "dns_question_type": "txt",
                    "expected_answer": expected,
                }),
                FakeLookup::records(records),
            );
            prop_assert_eq!(check.execute().unwrap(), Vec::new());
        }
    }

    #[test]
    fn strip_wrapping_quotes_only_strips_one_full_pair() {
        assert_eq!(strip_wrapping_quotes("\"abc\""), "abc");
        assert_eq!(strip_wrapping_quotes("\"\"abc\"\""), "\"abc\"");
        assert_eq!(strip_wrapping_quotes("\"abc"), "\"abc");
        assert_eq!(strip_wrapping_quotes("abc"), "abc");
        assert_eq!(strip_wrapping_quotes("\""), "\"");
    }

    #[test]
    fn canonical_rendering_drops_trailing_dots() {
        assert_eq!(
            RecordData::Cname("alias.example.org.".to_string()).canonical(),
            "alias.example.org"
        );
        assert_eq!(RecordData::A("1.2.3.4".parse().unwrap()).canonical(), "1.2.3.4");
    }
}

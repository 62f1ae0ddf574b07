use super::{Error, LookupMx, MailExchanger, MxStatus, resolver};
use trust_dns_resolver::error::ResolveError;

type LookupResult = Result<Vec<MailExchanger>, ResolveError>;
type LookupFn = dyn Fn(&str) -> LookupResult + Send + Sync;

/// Resolver double answering from a closure.
pub(crate) struct StubResolver {
    pub on_lookup: Box<LookupFn>,
}

impl StubResolver {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> LookupResult + Send + Sync + 'static,
    {
        Self {
            on_lookup: Box::new(f),
        }
    }

    /// Always answers with `records`, whatever the domain.
    pub(crate) fn with_records(records: Vec<MailExchanger>) -> Self {
        Self::new(move |_| Ok(records.clone()))
    }
}

impl LookupMx for StubResolver {
    fn lookup_mx(&self, domain: &str) -> LookupResult {
        (self.on_lookup)(domain)
    }
}

#[test]
fn normalize_domain_rejects_empty() {
    let err = resolver::normalize_domain("  ").expect_err("empty domain should fail");
    assert!(matches!(err, Error::EmptyDomain));
}

#[test]
fn normalize_domain_converts_idn() {
    let ascii = resolver::normalize_domain("exämple.com").expect("idna");
    assert_eq!(ascii, "xn--exmple-cua.com");
}

#[test]
fn resolve_with_sorts_and_dedups_records() {
    let stub = StubResolver::new(|domain| {
        assert_eq!(domain, "example.com");
        Ok(vec![
            MailExchanger::new(20, "mx2.example.com"),
            MailExchanger::new(10, "mx1.example.com"),
            MailExchanger::new(10, "mx1.example.com"),
            MailExchanger::new(30, "mx3.example.com"),
        ])
    });

    let status = resolver::resolve_with(&stub, "example.com").expect("lookup succeeds");
    let records = match status {
        MxStatus::Records(records) => records,
        MxStatus::NoRecords => panic!("expected records"),
    };
    let priorities: Vec<u16> = records.iter().map(|r| r.priority).collect();
    assert_eq!(priorities, vec![10, 20, 30]);
    assert_eq!(records[0].host, "mx1.example.com");
}

#[test]
fn equal_priorities_are_ordered_by_host() {
    let stub = StubResolver::with_records(vec![
        MailExchanger::new(5, "b.example.com"),
        MailExchanger::new(5, "a.example.com"),
    ]);
    let status = resolver::resolve_with(&stub, "example.com").expect("lookup succeeds");
    assert_eq!(status.records()[0].host, "a.example.com");
    assert_eq!(status.records()[1].host, "b.example.com");
}

#[test]
fn resolve_with_handles_no_records() {
    let stub = StubResolver::with_records(Vec::new());
    let status = resolver::resolve_with(&stub, "example.com").expect("lookup succeeds");
    assert!(matches!(status, MxStatus::NoRecords));
    assert!(status.records().is_empty());
}

#[test]
fn resolve_with_reports_lookup_failure() {
    let stub = StubResolver::new(|_| Err(ResolveError::from("servfail")));
    let err = resolver::resolve_with(&stub, "example.com").expect_err("lookup fails");
    match err {
        Error::Lookup { domain, .. } => assert_eq!(domain, "example.com"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn normalize_exchange_trims_dot_and_lowercases() {
    let out = resolver::normalize_exchange("Mail.EXAMPLE.com.".to_string());
    assert_eq!(out, "mail.example.com");
}

//! Candidate parsing
//!
//! Scheme detection and list splitting for credential headers.

use std::fmt;

/// Header carrying bearer tokens or raw token lists
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Scheme prefix, matched case-insensitively
const BEARER_PREFIX: &str = "bearer ";

/// Prefix written back for bearer selections
const CANONICAL_BEARER: &str = "Bearer ";

/// Separator between candidates in one header value
const CANDIDATE_SEPARATOR: char = ',';

/// Credential family; selects which counter is used under per-scheme keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Authorization,
    ApiKey,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Authorization => "authorization",
            Scheme::ApiKey => "api-key",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which header produced a candidate list, and how to write it back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// `Authorization: Bearer <token>`
    BearerAuthorization,

    /// `Authorization: <token>` without a recognized prefix
    RawAuthorization,

    /// API key header, written back as-is
    ApiKey,
}

impl CredentialKind {
    pub fn scheme(&self) -> Scheme {
        match self {
            CredentialKind::BearerAuthorization | CredentialKind::RawAuthorization => {
                Scheme::Authorization
            }
            CredentialKind::ApiKey => Scheme::ApiKey,
        }
    }

    /// Header value to re-inject for `credential`
    pub fn header_value(&self, credential: &str) -> String {
        match self {
            CredentialKind::BearerAuthorization => format!("{}{}", CANONICAL_BEARER, credential),
            CredentialKind::RawAuthorization | CredentialKind::ApiKey => credential.to_string(),
        }
    }
}

/// Non-empty list of candidates parsed from one header value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateList<'a> {
    kind: CredentialKind,
    candidates: Vec<&'a str>,
}

impl<'a> CandidateList<'a> {
    pub fn kind(&self) -> CredentialKind {
        self.kind
    }

    pub fn candidates(&self) -> &[&'a str] {
        &self.candidates
    }

    /// Always at least 1
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidate for a stored position (taken modulo the count)
    pub fn pick(&self, position: u64) -> (usize, &'a str) {
        let idx = (position % self.candidates.len() as u64) as usize;
        (idx, self.candidates[idx])
    }
}

/// Parse an `Authorization` value
///
/// A leading `bearer ` (any case) selects the bearer scheme and the rest is
/// trimmed as a whole before splitting. Any other non-empty value is an
/// opaque token list. Returns `None` for an empty value or an empty list.
pub fn parse_authorization(raw: &str, trim_candidates: bool) -> Option<CandidateList<'_>> {
    let prefix_len = BEARER_PREFIX.len();
    let has_prefix = raw
        .get(..prefix_len)
        .is_some_and(|p| p.eq_ignore_ascii_case(BEARER_PREFIX));

    if has_prefix {
        let tokens = raw[prefix_len..].trim();
        build(CredentialKind::BearerAuthorization, tokens, trim_candidates)
    } else if !raw.is_empty() {
        build(CredentialKind::RawAuthorization, raw, trim_candidates)
    } else {
        None
    }
}

/// Parse an API key header value; `None` for an empty value or list
pub fn parse_api_key(raw: &str, trim_candidates: bool) -> Option<CandidateList<'_>> {
    if raw.is_empty() {
        return None;
    }
    build(CredentialKind::ApiKey, raw, trim_candidates)
}

fn build(kind: CredentialKind, list: &str, trim_candidates: bool) -> Option<CandidateList<'_>> {
    let candidates: Vec<&str> = if trim_candidates {
        list.split(CANDIDATE_SEPARATOR)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect()
    } else {
        list.split(CANDIDATE_SEPARATOR).collect()
    };

    if candidates.is_empty() {
        return None;
    }
    Some(CandidateList { kind, candidates })
}

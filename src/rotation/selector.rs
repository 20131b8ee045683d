//! Rotation selector
//!
//! Drives the index store for one request.

use std::borrow::Cow;
use std::sync::Arc;

use crate::config::KeyScope;
use crate::index::{IndexStore, Position};

use super::candidates::{
    parse_api_key, parse_authorization, CandidateList, CredentialKind, Scheme,
    AUTHORIZATION_HEADER,
};

/// Raw credential headers of one request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CredentialHeaders<'a> {
    pub authorization: Option<&'a str>,
    pub api_key: Option<&'a str>,
}

impl<'a> CredentialHeaders<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authorization(mut self, value: &'a str) -> Self {
        self.authorization = Some(value);
        self
    }

    pub fn api_key(mut self, value: &'a str) -> Self {
        self.api_key = Some(value);
        self
    }
}

/// A selected credential and how to write it back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Header/scheme the credential came from
    pub kind: CredentialKind,

    /// The chosen candidate, verbatim
    pub credential: String,

    /// Stored position this request consumed
    pub position: Position,

    /// `position % candidate_count`
    pub index: usize,

    /// Size of the candidate list
    pub candidate_count: usize,
}

impl Selection {
    fn from_list(list: &CandidateList<'_>, position: Position) -> Self {
        let (index, credential) = list.pick(position);
        Self {
            kind: list.kind(),
            credential: credential.to_string(),
            position,
            index,
            candidate_count: list.len(),
        }
    }

    /// Value to re-inject (prefixed for bearer tokens)
    pub fn header_value(&self) -> String {
        self.kind.header_value(&self.credential)
    }
}

/// Per-scheme outcome of rotating one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rotation {
    pub authorization: Option<Selection>,
    pub api_key: Option<Selection>,
}

impl Rotation {
    /// True if no header needs to be rewritten
    pub fn is_unchanged(&self) -> bool {
        self.authorization.is_none() && self.api_key.is_none()
    }

    /// `(header name, value)` pairs to set on the outgoing request
    pub fn header_updates<'h>(&self, api_key_header: &'h str) -> Vec<(&'h str, String)> {
        let mut updates = Vec::with_capacity(2);
        if let Some(selection) = &self.authorization {
            updates.push((AUTHORIZATION_HEADER, selection.header_value()));
        }
        if let Some(selection) = &self.api_key {
            updates.push((api_key_header, selection.header_value()));
        }
        updates
    }
}

/// Selects credentials round-robin per logical key
#[derive(Debug, Clone)]
pub struct Selector {
    index: Arc<IndexStore>,
    key_scope: KeyScope,
    trim_candidates: bool,
}

impl Selector {
    pub fn new(index: Arc<IndexStore>, key_scope: KeyScope, trim_candidates: bool) -> Self {
        Self {
            index,
            key_scope,
            trim_candidates,
        }
    }

    /// Key the index store is consulted with for `scheme`
    ///
    /// `Shared` uses the logical key itself; `PerScheme` prefixes it with the
    /// scheme name, e.g. `api-key::/v1/models`.
    pub fn index_key<'k>(&self, key: &'k str, scheme: Scheme) -> Cow<'k, str> {
        match self.key_scope {
            KeyScope::Shared => Cow::Borrowed(key),
            KeyScope::PerScheme => Cow::Owned(format!("{}::{}", scheme.as_str(), key)),
        }
    }

    /// Current position a scheme would use next for `key`
    pub fn peek(&self, key: &str, scheme: Scheme) -> Position {
        self.index.peek(&self.index_key(key, scheme))
    }

    /// Select from an already parsed list and advance its counter
    pub fn select(&self, key: &str, list: &CandidateList<'_>) -> Selection {
        let index_key = self.index_key(key, list.kind().scheme());
        let position = self.index.advance(&index_key, list.len());
        Selection::from_list(list, position)
    }

    /// Rotate an `Authorization` value; `None` leaves the header untouched
    pub fn select_authorization(&self, key: &str, raw: &str) -> Option<Selection> {
        parse_authorization(raw, self.trim_candidates).map(|list| self.select(key, &list))
    }

    /// Rotate an API key value; `None` leaves the header untouched
    pub fn select_api_key(&self, key: &str, raw: &str) -> Option<Selection> {
        parse_api_key(raw, self.trim_candidates).map(|list| self.select(key, &list))
    }

    /// Rotate every credential header of one request
    ///
    /// Under `Shared` both schemes pick with the position read at the start
    /// of the request, then the counter advances once per present scheme,
    /// all under one lock acquisition.
    pub fn rotate(&self, key: &str, headers: &CredentialHeaders<'_>) -> Rotation {
        let authorization = headers
            .authorization
            .and_then(|raw| parse_authorization(raw, self.trim_candidates));
        let api_key = headers
            .api_key
            .and_then(|raw| parse_api_key(raw, self.trim_candidates));

        match self.key_scope {
            KeyScope::PerScheme => Rotation {
                authorization: authorization.map(|list| self.select(key, &list)),
                api_key: api_key.map(|list| self.select(key, &list)),
            },
            KeyScope::Shared => {
                let counts: Vec<usize> = authorization
                    .iter()
                    .chain(api_key.iter())
                    .map(|list| list.len())
                    .collect();
                if counts.is_empty() {
                    return Rotation::default();
                }

                let position = self.index.advance_chain(key, &counts);
                Rotation {
                    authorization: authorization.map(|list| Selection::from_list(&list, position)),
                    api_key: api_key.map(|list| Selection::from_list(&list, position)),
                }
            }
        }
    }
}

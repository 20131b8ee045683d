//! Tests for candidate parsing and the Selector
//!
//! These tests verify:
//! - Bearer prefix detection and re-injection formatting
//! - Per-candidate trimming on and off
//! - Round-robin selection per logical key
//! - Shared vs per-scheme counters when both headers are present
//! - Empty input leaves headers and the index untouched

use std::sync::Arc;

use keyrotate::config::KeyScope;
use keyrotate::index::IndexStore;
use keyrotate::rotation::{
    parse_api_key, parse_authorization, CredentialHeaders, CredentialKind, Scheme, Selector,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn selector(scope: KeyScope) -> (Arc<IndexStore>, Selector) {
    let index = Arc::new(IndexStore::new());
    let selector = Selector::new(Arc::clone(&index), scope, true);
    (index, selector)
}

fn raw_selector() -> (Arc<IndexStore>, Selector) {
    let index = Arc::new(IndexStore::new());
    let selector = Selector::new(Arc::clone(&index), KeyScope::Shared, false);
    (index, selector)
}

// =============================================================================
// Parsing Tests
// =============================================================================

#[test]
fn test_parse_bearer_prefix_any_case() {
    for raw in ["Bearer a,b", "bearer a,b", "BEARER a,b", "bEaReR a,b"] {
        let list = parse_authorization(raw, true).unwrap();
        assert_eq!(list.kind(), CredentialKind::BearerAuthorization);
        assert_eq!(list.candidates(), &["a", "b"]);
    }
}

#[test]
fn test_parse_bearer_trims_whole_list() {
    let list = parse_authorization("Bearer    a,b   ", false).unwrap();

    assert_eq!(list.candidates(), &["a", "b"]);
}

#[test]
fn test_parse_bearer_keeps_inner_whitespace_when_raw() {
    let list = parse_authorization("Bearer key1, key2", false).unwrap();

    assert_eq!(list.candidates(), &["key1", " key2"]);
}

#[test]
fn test_parse_bearer_trims_each_candidate_by_default() {
    let list = parse_authorization("Bearer key1, key2 ,,key3", true).unwrap();

    assert_eq!(list.candidates(), &["key1", "key2", "key3"]);
}

#[test]
fn test_parse_raw_authorization() {
    let list = parse_authorization("tok1,tok2", true).unwrap();

    assert_eq!(list.kind(), CredentialKind::RawAuthorization);
    assert_eq!(list.candidates(), &["tok1", "tok2"]);
}

#[test]
fn test_parse_prefix_without_space_is_raw() {
    let list = parse_authorization("Bearerx,y", true).unwrap();

    assert_eq!(list.kind(), CredentialKind::RawAuthorization);
    assert_eq!(list.candidates(), &["Bearerx", "y"]);
}

#[test]
fn test_parse_short_or_multibyte_values() {
    let list = parse_authorization("abc", true).unwrap();
    assert_eq!(list.kind(), CredentialKind::RawAuthorization);

    // Byte 7 falls inside a multi-byte char; must not panic
    let list = parse_authorization("Bearer\u{00e9}a,b", true).unwrap();
    assert_eq!(list.kind(), CredentialKind::RawAuthorization);
}

#[test]
fn test_parse_empty_values() {
    assert!(parse_authorization("", true).is_none());
    assert!(parse_authorization("", false).is_none());
    assert!(parse_api_key("", true).is_none());
    assert!(parse_api_key("", false).is_none());
}

#[test]
fn test_parse_bare_prefix() {
    // Nothing after the prefix: no candidates once trimmed
    assert!(parse_authorization("Bearer ", true).is_none());
    assert!(parse_authorization("Bearer   ", true).is_none());

    // Raw split keeps the single empty candidate
    let list = parse_authorization("Bearer ", false).unwrap();
    assert_eq!(list.candidates(), &[""]);
}

#[test]
fn test_parse_only_separators() {
    assert!(parse_api_key(", ,", true).is_none());
    assert_eq!(parse_api_key(",", false).unwrap().len(), 2);
}

#[test]
fn test_parse_api_key_not_prefix_aware() {
    let list = parse_api_key("Bearer k1,k2", true).unwrap();

    assert_eq!(list.kind(), CredentialKind::ApiKey);
    assert_eq!(list.candidates(), &["Bearer k1", "k2"]);
}

#[test]
fn test_header_value_formatting() {
    assert_eq!(CredentialKind::BearerAuthorization.header_value("t"), "Bearer t");
    assert_eq!(CredentialKind::RawAuthorization.header_value("t"), "t");
    assert_eq!(CredentialKind::ApiKey.header_value("t"), "t");
}

// =============================================================================
// Selection Tests
// =============================================================================

#[test]
fn test_select_cycles_through_candidates() {
    let (index, selector) = selector(KeyScope::Shared);

    let expected = [("key1", 1), ("key2", 2), ("key3", 0), ("key1", 1)];
    for (credential, next_position) in expected {
        let selection = selector.select_api_key("/v1/models", "key1,key2,key3").unwrap();
        assert_eq!(selection.credential, credential);
        assert_eq!(index.peek("/v1/models"), next_position);
    }
}

#[test]
fn test_select_bearer_reinjects_prefix() {
    let (_index, selector) = selector(KeyScope::Shared);

    let first = selector.select_authorization("/k", "bearer a,b").unwrap();
    let second = selector.select_authorization("/k", "bearer a,b").unwrap();

    assert_eq!(first.header_value(), "Bearer a");
    assert_eq!(second.header_value(), "Bearer b");
    assert_eq!(second.index, 1);
    assert_eq!(second.candidate_count, 2);
}

#[test]
fn test_select_raw_authorization_without_prefix() {
    let (_index, selector) = selector(KeyScope::Shared);

    let selection = selector.select_authorization("/k", "tok1,tok2").unwrap();

    assert_eq!(selection.kind, CredentialKind::RawAuthorization);
    assert_eq!(selection.header_value(), "tok1");
}

#[test]
fn test_select_raw_candidates_keep_whitespace() {
    let (_index, selector) = raw_selector();

    let first = selector.select_authorization("/k", "Bearer key1, key2").unwrap();
    let second = selector.select_authorization("/k", "Bearer key1, key2").unwrap();

    assert_eq!(first.header_value(), "Bearer key1");
    assert_eq!(second.credential, " key2");
    assert_eq!(second.header_value(), "Bearer  key2");
}

#[test]
fn test_select_empty_input_does_not_advance() {
    let (index, selector) = selector(KeyScope::Shared);

    assert!(selector.select_authorization("/k", "").is_none());
    assert!(selector.select_api_key("/k", " , ").is_none());

    assert!(!index.is_dirty());
    assert!(index.is_empty());
}

#[test]
fn test_select_position_wraps_when_list_shrinks() {
    let (index, selector) = selector(KeyScope::Shared);

    for _ in 0..4 {
        selector.select_api_key("/k", "a,b,c,d,e");
    }
    assert_eq!(index.peek("/k"), 4);

    // 4 % 3 = 1
    let selection = selector.select_api_key("/k", "x,y,z").unwrap();
    assert_eq!(selection.position, 4);
    assert_eq!(selection.credential, "y");
    assert_eq!(index.peek("/k"), 2);
}

#[test]
fn test_select_keys_rotate_independently() {
    let (_index, selector) = selector(KeyScope::Shared);

    assert_eq!(selector.select_api_key("/a", "1,2").unwrap().credential, "1");
    assert_eq!(selector.select_api_key("/b", "1,2").unwrap().credential, "1");
    assert_eq!(selector.select_api_key("/a", "1,2").unwrap().credential, "2");
}

// =============================================================================
// Rotate (both headers) Tests
// =============================================================================

#[test]
fn test_rotate_no_headers_is_unchanged() {
    let (index, selector) = selector(KeyScope::Shared);

    let rotation = selector.rotate("/k", &CredentialHeaders::new());

    assert!(rotation.is_unchanged());
    assert!(rotation.header_updates("X-Goog-Api-Key").is_empty());
    assert!(!index.is_dirty());
}

#[test]
fn test_rotate_empty_authorization_and_missing_api_key() {
    let (index, selector) = selector(KeyScope::Shared);

    let rotation = selector.rotate("/k", &CredentialHeaders::new().authorization(""));

    assert!(rotation.is_unchanged());
    assert!(!index.is_dirty());
}

#[test]
fn test_rotate_shared_uses_same_position_for_both() {
    let (index, selector) = selector(KeyScope::Shared);
    let headers = CredentialHeaders::new()
        .authorization("Bearer a1,a2")
        .api_key("k1,k2,k3");

    let first = selector.rotate("/k", &headers);
    assert_eq!(first.authorization.as_ref().unwrap().credential, "a1");
    assert_eq!(first.api_key.as_ref().unwrap().credential, "k1");
    // 0 → (0+1)%2 = 1 → (1+1)%3 = 2
    assert_eq!(index.peek("/k"), 2);

    let second = selector.rotate("/k", &headers);
    assert_eq!(second.authorization.as_ref().unwrap().credential, "a1");
    assert_eq!(second.api_key.as_ref().unwrap().credential, "k3");
}

#[test]
fn test_rotate_per_scheme_counters_are_independent() {
    let (index, selector) = selector(KeyScope::PerScheme);
    let headers = CredentialHeaders::new()
        .authorization("Bearer a1,a2")
        .api_key("k1,k2,k3");

    let picks: Vec<(String, String)> = (0..3)
        .map(|_| {
            let rotation = selector.rotate("/k", &headers);
            (
                rotation.authorization.unwrap().credential,
                rotation.api_key.unwrap().credential,
            )
        })
        .collect();

    assert_eq!(
        picks,
        vec![
            ("a1".to_string(), "k1".to_string()),
            ("a2".to_string(), "k2".to_string()),
            ("a1".to_string(), "k3".to_string()),
        ]
    );
    assert_eq!(selector.peek("/k", Scheme::Authorization), 1);
    assert_eq!(selector.peek("/k", Scheme::ApiKey), 0);
    assert_eq!(index.peek("authorization::/k"), 1);
    assert_eq!(index.peek("/k"), 0);
}

#[test]
fn test_rotate_header_updates() {
    let (_index, selector) = selector(KeyScope::Shared);
    let headers = CredentialHeaders::new()
        .authorization("Bearer t1,t2")
        .api_key("k1");

    let rotation = selector.rotate("/k", &headers);

    assert_eq!(
        rotation.header_updates("X-Goog-Api-Key"),
        vec![
            ("Authorization", "Bearer t1".to_string()),
            ("X-Goog-Api-Key", "k1".to_string()),
        ]
    );
}

#[test]
fn test_index_key_by_scope() {
    let (_index, shared) = selector(KeyScope::Shared);
    let (_index, per_scheme) = selector(KeyScope::PerScheme);

    assert_eq!(shared.index_key("/k", Scheme::ApiKey), "/k");
    assert_eq!(per_scheme.index_key("/k", Scheme::ApiKey), "api-key::/k");
    assert_eq!(per_scheme.index_key("/k", Scheme::Authorization), "authorization::/k");
}

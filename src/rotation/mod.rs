//! Rotation Module
//!
//! Turns raw credential headers into a selected credential.
//!
//! ## Responsibilities
//! - Detect the bearer scheme and split comma-separated candidate lists
//! - Advance the index store and pick `candidates[position % count]`
//! - Tell the caller how to re-inject the selection
//!
//! ## Header Handling
//! ```text
//! Authorization: Bearer a,b,c   →  Authorization: Bearer <one of a,b,c>
//! Authorization: a,b,c          →  Authorization: <one of a,b,c>
//! X-Goog-Api-Key: k1,k2         →  X-Goog-Api-Key: <one of k1,k2>
//! ```
//! An absent or empty header is left alone and nothing is advanced.

mod candidates;
mod selector;

pub use candidates::{
    parse_api_key, parse_authorization, CandidateList, CredentialKind, Scheme,
    AUTHORIZATION_HEADER,
};
pub use selector::{CredentialHeaders, Rotation, Selection, Selector};

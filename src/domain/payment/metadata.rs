//! Metadata record carried through the payment lifecycle.
//!
//! The provider allows free-form key/value annotations on most of its
//! objects. This service uses two keys: `UserId` and `CreditGranted`,
//! attached at checkout time and propagated to charges by the ingestion
//! pipeline so that post-payment records (refunds, disputes) can be tied
//! back to an application user without extra lookups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata key for the application user identifier.
pub const KEY_USER_ID: &str = "UserId";

/// Metadata key for the number of credits granted by the purchase.
pub const KEY_CREDIT_GRANTED: &str = "CreditGranted";

/// Free-form key/value annotations attached to provider objects.
///
/// Legitimate metadata never changes after being set once, which is what
/// makes the pipeline's read-is-empty write-back guard safe under races.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, String>);

impl Metadata {
    /// Creates an empty metadata record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no keys are set.
    ///
    /// An empty record is the signal that a charge has not yet inherited
    /// its payment intent's metadata.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of keys set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Set a key, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// The application user identifier, if present.
    pub fn user_id(&self) -> Option<&str> {
        self.get(KEY_USER_ID)
    }

    /// The credit grant value, if present.
    pub fn credit_granted(&self) -> Option<&str> {
        self.get(KEY_CREDIT_GRANTED)
    }

    /// Iterate over key/value pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

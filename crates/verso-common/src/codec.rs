//! Config value codec
//!
//! Clients submit configuration data as an ordered list of key-value
//! fragments. The codec folds them into one flat [`ConfigData`] mapping and
//! turns that mapping into the canonical byte payload kept by the store.
//!
//! The stored payload is a JSON object whose keys are sorted, so two equal
//! mappings always encode to identical bytes no matter how they were built.
//! Update relies on that property to detect unchanged submissions.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VersoError};

/// Validated key-value payload of one configuration version.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigData(BTreeMap<String, String>);

impl ConfigData {
    /// Fold fragments left to right into one mapping.
    ///
    /// A key seen twice, either across fragments or inside one fragment,
    /// fails with [`VersoError::DuplicateKey`]; the last occurrence never
    /// silently wins.
    pub fn from_fragments<I>(fragments: I) -> Result<Self>
    where
        I: IntoIterator<Item = Fragment>,
    {
        let mut merged = BTreeMap::new();
        for fragment in fragments {
            for (key, value) in fragment.0 {
                if merged.contains_key(&key) {
                    return Err(VersoError::DuplicateKey(key));
                }
                merged.insert(key, value);
            }
        }
        Ok(Self(merged))
    }

    /// Decode the wire form `[{"a":"1"},{"b":"2"}]`.
    pub fn from_fragments_json(bytes: &[u8]) -> Result<Self> {
        let fragments: Vec<Fragment> = serde_json::from_slice(bytes)
            .map_err(|e| VersoError::InvalidPayload(e.to_string()))?;
        Self::from_fragments(fragments)
    }

    /// Canonical byte payload; keys are emitted in sorted order.
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.0).map_err(|e| VersoError::InvalidPayload(e.to_string()))
    }

    /// Decode a payload previously produced by [`ConfigData::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map(Self)
            .map_err(|e| VersoError::CorruptPayload(e.to_string()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, String>> for ConfigData {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

/// One client-submitted fragment.
///
/// Entries keep their wire order and repeated keys are preserved so that
/// [`ConfigData::from_fragments`] can reject them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fragment(Vec<(String, String)>);

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.0
    }
}

impl<K, V> FromIterator<(K, V)> for Fragment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'de> Deserialize<'de> for Fragment {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FragmentVisitor;

        impl<'de> Visitor<'de> for FragmentVisitor {
            type Value = Fragment;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of string keys to string values")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Fragment, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    entries.push((key, value));
                }
                Ok(Fragment(entries))
            }
        }

        deserializer.deserialize_map(FragmentVisitor)
    }
}

//! Design document model.
//!
//! The JSON shape matches what the server stores (`_id`, `_rev`, `language`,
//! `views`, `filters`). Unknown fields on documents read back from the
//! server are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Every design document id starts with this prefix.
pub const DESIGN_PREFIX: &str = "_design/";

/// Default language tag for newly constructed design documents.
pub const LANGUAGE_JAVASCRIPT: &str = "javascript";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Identity and revision of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentMeta {
    #[serde(rename = "_id")]
    pub id: String,
    /// Store-assigned revision; empty until the document has been written.
    #[serde(rename = "_rev", default, skip_serializing_if = "String::is_empty")]
    pub rev: String,
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// A map function with an optional reduce function.
///
/// An empty `"reduce"` reads as no reduce at all.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct View {
    pub map: String,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub reduce: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

impl View {
    /// A view with only a map function.
    pub fn map(source: impl Into<String>) -> Self {
        Self {
            map: source.into(),
            reduce: None,
        }
    }

    /// A view with both map and reduce functions. An empty reduce is dropped.
    pub fn map_reduce(map: impl Into<String>, reduce: impl Into<String>) -> Self {
        let reduce: String = reduce.into();
        Self {
            map: map.into(),
            reduce: (!reduce.is_empty()).then_some(reduce),
        }
    }
}

// ---------------------------------------------------------------------------
// DesignDocument
// ---------------------------------------------------------------------------

/// A named bundle of view and filter source code stored under `_design/`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DesignDocument {
    #[serde(flatten)]
    meta: DocumentMeta,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub language: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub views: BTreeMap<String, View>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, String>,
}

impl DesignDocument {
    /// New revision-less document `_design/<name>` in JavaScript.
    pub fn new(name: &str) -> Self {
        Self::from_id(format!("{DESIGN_PREFIX}{name}")).with_language(LANGUAGE_JAVASCRIPT)
    }

    /// New revision-less document with an explicit id. The id is taken as-is.
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            meta: DocumentMeta {
                id: id.into(),
                rev: String::new(),
            },
            ..Self::default()
        }
    }

    pub fn with_view(mut self, name: impl Into<String>, view: View) -> Self {
        self.views.insert(name.into(), view);
        self
    }

    pub fn with_filter(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.filters.insert(name.into(), source.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_rev(mut self, rev: impl Into<String>) -> Self {
        self.meta.rev = rev.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn rev(&self) -> &str {
        &self.meta.rev
    }

    pub fn set_rev(&mut self, rev: impl Into<String>) {
        self.meta.rev = rev.into();
    }

    /// Design document name without the `_design/` prefix.
    pub fn name(&self) -> &str {
        self.meta
            .id
            .strip_prefix(DESIGN_PREFIX)
            .unwrap_or(&self.meta.id)
    }

    /// Store-owned documents such as `_design/_auth`.
    pub fn is_internal(&self) -> bool {
        self.name().starts_with('_')
    }

    /// Equivalence used by the differ: views only.
    ///
    /// Revision, language and filters are not compared.
    pub fn views_match(&self, other: &DesignDocument) -> bool {
        self.views == other.views
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

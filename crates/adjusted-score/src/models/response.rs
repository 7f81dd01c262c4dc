//! DBLP search API response schema.
//!
//! Shape: `{ result: { hits: { @total, hit: [ { info: { venue, pages, year, authors } } ] } } }`.

use serde::{Deserialize, Deserializer, Serialize};

/// Top-level search response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub result: SearchResult,
}

/// The `result` object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub hits: Hits,
}

/// The `hits` object. DBLP reports `@total` as a string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hits {
    /// Total matches on the server side, not just the ones returned.
    #[serde(rename = "@total", default, deserialize_with = "count_from_scalar")]
    pub total: Option<u64>,

    /// Returned records. Absent when the query matched nothing.
    #[serde(default)]
    pub hit: Vec<Hit>,
}

/// A single search record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hit {
    #[serde(default)]
    pub info: HitInfo,
}

/// Record metadata. Only the fields scoring and profile lookup need.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HitInfo {
    #[serde(default)]
    pub venue: Option<Venue>,

    #[serde(default, deserialize_with = "string_from_scalar")]
    pub pages: Option<String>,

    #[serde(default, deserialize_with = "string_from_scalar")]
    pub year: Option<String>,

    #[serde(default)]
    pub authors: Option<Authors>,

    /// Profile URL on author-search hits.
    #[serde(default)]
    pub url: Option<String>,
}

/// Venue is usually a string but DBLP sends an array for joint events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Venue {
    Name(String),
    Names(Vec<String>),
}

impl Venue {
    /// Single venue string; arrays are joined with ", ".
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Names(names) => names.join(", "),
        }
    }
}

/// The `authors` object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Authors {
    #[serde(default)]
    pub author: AuthorList,
}

/// DBLP collapses a one-element author array into a bare object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorList {
    Many(Vec<serde_json::Value>),
    One(serde_json::Value),
}

impl Default for AuthorList {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl AuthorList {
    /// Number of listed authors.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Many(authors) => authors.len(),
            Self::One(serde_json::Value::Null) => 0,
            Self::One(_) => 1,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A publication record reduced to what scoring consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationHit {
    pub venue: Option<String>,
    pub pages: Option<String>,
    pub author_count: usize,
    pub year: String,
}

impl From<&HitInfo> for PublicationHit {
    fn from(info: &HitInfo) -> Self {
        Self {
            venue: info.venue.as_ref().map(Venue::name),
            pages: info.pages.clone(),
            author_count: info.authors.as_ref().map_or(0, |a| a.author.len()),
            year: info.year.clone().unwrap_or_else(|| "0".to_string()),
        }
    }
}

impl SearchResponse {
    /// Records in this response, as publication hits.
    pub fn publications(&self) -> impl Iterator<Item = PublicationHit> + '_ {
        self.result.hits.hit.iter().map(|hit| PublicationHit::from(&hit.info))
    }

    /// Server-side total, falling back to the number of returned records.
    #[must_use]
    pub fn total_hits(&self) -> u64 {
        self.result.hits.total.unwrap_or(self.result.hits.hit.len() as u64)
    }

    /// Profile URL of the first hit of an author search.
    #[must_use]
    pub fn first_profile_url(&self) -> Option<&str> {
        self.result.hits.hit.first()?.info.url.as_deref()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Int(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
        }
    }
}

fn string_from_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}

fn count_from_scalar<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.and_then(|s| match s {
        Scalar::Int(n) => u64::try_from(n).ok(),
        Scalar::Text(s) => s.trim().parse().ok(),
        Scalar::Float(_) => None,
    }))
}

//! Data models for DBLP responses and the per-institution score tree.
//!
//! Response models use `#[serde(default)]` throughout because DBLP omits
//! empty fields and is loose about scalar types.

mod area;
mod missed;
mod response;
mod result;

pub use area::Area;
pub use missed::{MissedLookup, MissedLookups};
pub use response::{AuthorList, Authors, Hit, HitInfo, Hits, PublicationHit, SearchResponse, Venue};
pub use result::{AreaDetail, AuthorRecord, InstitutionResult, Rankings, YearBucket};

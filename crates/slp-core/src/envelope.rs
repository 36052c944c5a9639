//! # Response Envelopes
//!
//! Every list endpoint answers with the same [`ResponseEnvelope`] shape,
//! whether its rows came from an offset query ([`OffsetPage`]) or from the
//! search engine ([`SearchResult`]). The paging flags are computed with the
//! exact formulas existing UI clients rely on, including the asymmetric
//! upper bound of `has_prev_page`; do not "fix" them.

use serde::{Deserialize, Serialize};

use crate::fields::FieldDescriptor;
use crate::pagination::PaginationDescriptor;

/// Externally visible list envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope<T> {
    pub data: Vec<T>,
    pub fields: Vec<FieldDescriptor>,
    pub total_docs: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub page: u64,
    pub paging_counter: u64,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_page: u64,
    pub next_page: u64,
}

/// One page of an offset-paginated query.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetPage<T> {
    pub data: Vec<T>,
    pub fields: Vec<FieldDescriptor>,
    pub page: u64,
    pub per_page: u64,
    pub total_docs: u64,
}

impl<T> OffsetPage<T> {
    pub fn from_descriptor(
        data: Vec<T>,
        fields: Vec<FieldDescriptor>,
        paging: &PaginationDescriptor,
    ) -> Self {
        Self {
            data,
            fields,
            page: paging.page,
            per_page: paging.per_page,
            total_docs: paging.total_docs,
        }
    }

    /// The whole result set as a single page.
    pub fn single(data: Vec<T>, fields: Vec<FieldDescriptor>) -> Self {
        let total_docs = data.len() as u64;
        Self {
            data,
            fields,
            page: 1,
            per_page: total_docs.max(1),
            total_docs,
        }
    }
}

/// A search engine hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit<T> {
    pub document: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequestParams {
    #[serde(alias = "perPage")]
    pub per_page: u64,
}

/// Raw search engine result, as returned by the documents search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult<T> {
    pub found: u64,
    pub hits: Vec<SearchHit<T>>,
    pub page: u64,
    pub request_params: SearchRequestParams,
}

/// `ceil(total / per_page)`, treating a zero page size as one.
fn pages_for(total: u64, per_page: u64) -> u64 {
    total.div_ceil(per_page.max(1))
}

struct Flags {
    has_prev_page: bool,
    has_next_page: bool,
    prev_page: u64,
    next_page: u64,
}

fn flags(page: u64, total_pages: u64) -> Flags {
    let prev_page = if page > total_pages {
        total_pages
    } else {
        page.saturating_sub(1).max(1)
    };
    let next_page = if total_pages > page {
        page + 1
    } else {
        total_pages
    };

    Flags {
        has_next_page: 1 <= page && page < total_pages,
        has_prev_page: 1 < page && page <= total_pages + 1,
        prev_page,
        next_page,
    }
}

impl<T> ResponseEnvelope<T> {
    /// Build the envelope from an offset-paginated page.
    pub fn from_offset(page: OffsetPage<T>) -> Self {
        let total_pages = pages_for(page.total_docs, page.per_page);
        let f = flags(page.page, total_pages);

        Self {
            paging_counter: page.data.len() as u64,
            data: page.data,
            fields: page.fields,
            total_docs: page.total_docs,
            limit: page.per_page,
            total_pages,
            page: page.page,
            has_prev_page: f.has_prev_page,
            has_next_page: f.has_next_page,
            prev_page: f.prev_page,
            next_page: f.next_page,
        }
    }

    /// Build the envelope from a search engine result.
    pub fn from_search(result: SearchResult<T>, fields: Vec<FieldDescriptor>) -> Self {
        let per_page = result.request_params.per_page;
        let total_pages = pages_for(result.found, per_page);
        let f = flags(result.page, total_pages);
        let paging_counter = result.hits.len() as u64;

        Self {
            data: result.hits.into_iter().map(|hit| hit.document).collect(),
            fields,
            total_docs: result.found,
            limit: per_page,
            total_pages,
            page: result.page,
            paging_counter,
            has_prev_page: f.has_prev_page,
            has_next_page: f.has_next_page,
            prev_page: f.prev_page,
            next_page: f.next_page,
        }
    }
}

/// A single record with its descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldDescriptor>>,
}

impl<T> Record<T> {
    pub fn new(data: T) -> Self {
        Self { data, fields: None }
    }

    pub fn with_fields(data: T, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            data,
            fields: Some(fields),
        }
    }
}

/// Envelope carrying aggregate totals next to the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalsEnvelope<T, Totals> {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope<T>,
    pub total: Totals,
}

/// Route aggregate: totals plus the assigned courier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourierEnvelope<T, Totals, Courier> {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope<T>,
    pub total: Totals,
    pub courier: Courier,
}

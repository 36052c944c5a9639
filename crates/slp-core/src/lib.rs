//! # slp-core: Response Shaping for the SLP Gateway
//!
//! The gateway owns no entities of record. What it does own is the way rows
//! and RPC results are reshaped before they reach the table-rendering UI, and
//! that logic lives here, free of any I/O:
//!
//! - [`pagination`]: normalized paging descriptors from a live count.
//! - [`fields`]: UI-facing column descriptors built from catalog metadata.
//! - [`flatten`]: dot-path flattening of nested row trees.
//! - [`envelope`]: the list envelope, fed either by an offset query or by
//!   a search-engine hit list.
//! - [`rpc`]: the `{data, hasError, status, statusText}` contract returned
//!   by every backend service.
//! - [`aggregate`]: route/pool totals, leg chaining and action types.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `slp-*` crates.
//! - No `.unwrap()` outside tests.

pub mod aggregate;
pub mod envelope;
pub mod fields;
pub mod flatten;
pub mod pagination;
pub mod rpc;

pub use aggregate::{ActionType, Dimension, LegPoint, RouteTotals};
pub use envelope::{
    CourierEnvelope, OffsetPage, Record, ResponseEnvelope, SearchHit, SearchResult, TotalsEnvelope,
};
pub use fields::{CatalogColumn, FieldDescriptor, FieldType};
pub use flatten::{camelize_columns, flatten, flatten_rows};
pub use pagination::{paginate, PaginationDescriptor};
pub use rpc::{RpcEnvelope, RpcFailure, RpcFailureKind};

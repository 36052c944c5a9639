//! Read services that compose several queries, or queries and a
//! collaborator call, into one response.

pub mod aggregate;
pub mod courier_board;
pub mod order_intake;
pub mod zone_map;

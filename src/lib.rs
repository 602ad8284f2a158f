//! bookreview - HTTP API for book reviews kept in a hosted table
//!
//! - `reviews`: list, create and ISBN-addressed update of reviews
//! - `table_store`: the remote table seam (Airtable client, in-memory store)
//! - `text`: stateless text transforms
//! - `http_server`: Axum routes over the above
//! - `cli`: configuration and process entry

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod reviews;
pub mod table_store;
pub mod text;

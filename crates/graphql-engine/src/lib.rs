//! A typed GraphQL schema model and query execution engine.
//!
//! A schema is a graph of type descriptors carrying field resolvers; the
//! engine takes a parsed executable document, external variable values and
//! a user context, and produces a JSON-shaped [`Response`].
//!
//! ```
//! use graphql_engine::schema::build::{field, obj};
//! use graphql_engine::schema::{FieldValue, Schema};
//!
//! let query = obj("Query", |_| {
//!     vec![field(
//!         "answer",
//!         graphql_engine::schema::build::int(),
//!         vec![],
//!         |_ctx: &(), _src, _args| Ok(FieldValue::value(42i64)),
//!     )]
//! });
//! let schema = Schema::new(query);
//! # let _ = schema;
//! ```
//!
//! The engine never spawns tasks: sibling query fields are combined with
//! `join_all`, mutation root fields are sequenced, and any async runtime
//! (or none at all) may drive the returned futures.

pub mod execute;
mod introspection;
pub mod response;
pub mod schema;

pub use execute::{execute, execute_request, VariableValues};
pub use response::Response;

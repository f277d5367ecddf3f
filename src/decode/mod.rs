//! Response decoding
//!
//! Every JSON payload handed to callers passes through three hooks, in
//! order and exactly once per object:
//!
//! 1. numeric identifier fields are widened from strings to integers
//! 2. known timestamp fields are parsed into timezone-aware instants
//! 3. objects are wrapped into read-only [`Record`] views

mod decoders;
mod types;

pub use decoders::{decode_body, from_json, DecodeError, DATE_FIELDS, ID_FIELDS};
pub use types::{Record, Value};

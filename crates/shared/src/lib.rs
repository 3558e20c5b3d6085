//! Domain records and wire envelopes exchanged with the catalog service.

pub mod domain;
pub mod error;
pub mod protocol;

//! # Yatube Shared
//!
//! Wire types shared by the API server and its clients: JSON representations
//! of every resource, request bodies, and the error/pagination envelopes.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, Paginated};

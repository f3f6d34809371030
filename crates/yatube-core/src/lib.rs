//! # Yatube Core
//!
//! The domain layer of the Yatube API: entities, the error taxonomy, the
//! ports infrastructure implements, the author-only access rule and the
//! resource handlers that tie them together.
//! This crate performs no I/O of its own.

pub mod context;
pub mod domain;
pub mod error;
pub mod permissions;
pub mod ports;
pub mod services;

pub use context::{Action, Identity, RequestContext, Requester};
pub use error::{DomainError, DomainResult, RepoError, ValidationErrors};

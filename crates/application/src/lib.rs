//! Application layer for the subscription service.
//!
//! Commands and queries are plain request structs. Each is handled by one
//! registered [`Handler`]; the [`Mediator`] dispatches to it. Commands answer
//! with an [`Outcome`](common::Outcome): business rule violations become
//! failure outcomes, while store errors and broken invariants surface as
//! [`AppError`].

pub mod commands;
pub mod dto;
pub mod error;
pub mod mediator;
pub mod queries;
pub mod registry;
pub mod repositories;
pub mod validation;

pub use error::{AppError, Result};
pub use mediator::{Handler, Mediator, MediatorBuilder, Request};
pub use registry::build_mediator;
pub use repositories::Repositories;
pub use validation::TierInput;

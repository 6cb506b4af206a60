//! Request dispatch.
//!
//! Handlers are registered per request type when the application starts;
//! [`Mediator::send`] looks the handler up by the request's [`TypeId`].

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::Instrument;

use crate::error::{AppError, Result};

/// A command or query with its response type.
pub trait Request: Send + 'static {
    type Response: Send + 'static;
}

/// Handles one request type.
#[async_trait]
pub trait Handler<R: Request>: Send + Sync + 'static {
    async fn handle(&self, request: R) -> Result<R::Response>;
}

struct Registration {
    name: &'static str,
    /// Always an `Arc<dyn Handler<R>>` for the request type it is keyed by.
    handler: Box<dyn Any + Send + Sync>,
}

/// Collects handler registrations.
#[derive(Default)]
pub struct MediatorBuilder {
    handlers: HashMap<TypeId, Registration>,
    duplicates: Vec<&'static str>,
}

impl MediatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler for requests of type `R`.
    pub fn register<R, H>(mut self, handler: H) -> Self
    where
        R: Request,
        H: Handler<R>,
    {
        let name = request_name::<R>();
        let handler: Arc<dyn Handler<R>> = Arc::new(handler);
        let registration = Registration {
            name,
            handler: Box::new(handler),
        };
        if self
            .handlers
            .insert(TypeId::of::<R>(), registration)
            .is_some()
        {
            self.duplicates.push(name);
        }
        self
    }

    /// Finishes registration. Fails if any request type was registered twice.
    pub fn build(self) -> Result<Mediator> {
        if let Some(name) = self.duplicates.first() {
            return Err(AppError::DuplicateHandler(name));
        }
        tracing::debug!(handlers = self.handlers.len(), "mediator built");
        Ok(Mediator {
            handlers: Arc::new(self.handlers),
        })
    }
}

/// Dispatches requests to their registered handlers.
#[derive(Clone)]
pub struct Mediator {
    handlers: Arc<HashMap<TypeId, Registration>>,
}

impl Mediator {
    pub fn builder() -> MediatorBuilder {
        MediatorBuilder::new()
    }

    /// Returns true if a handler is registered for `R`.
    pub fn handles<R: Request>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<R>())
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Sends the request to its handler.
    pub async fn send<R: Request>(&self, request: R) -> Result<R::Response> {
        let registration = self
            .handlers
            .get(&TypeId::of::<R>())
            .ok_or(AppError::HandlerNotRegistered(request_name::<R>()))?;
        let name = registration.name;
        let handler = registration
            .handler
            .downcast_ref::<Arc<dyn Handler<R>>>()
            .cloned()
            .ok_or(AppError::HandlerNotRegistered(name))?;

        let started = Instant::now();
        let result = handler
            .handle(request)
            .instrument(tracing::info_span!("dispatch", request = name))
            .await;

        metrics::counter!("requests_dispatched_total", "request" => name).increment(1);
        metrics::histogram!("request_duration_seconds", "request" => name)
            .record(started.elapsed().as_secs_f64());
        if let Err(err) = &result {
            metrics::counter!("request_failures_total", "request" => name).increment(1);
            tracing::error!(request = name, error = %err, "request failed");
        }

        result
    }
}

/// The request type's name without its module path.
fn request_name<R: Request>() -> &'static str {
    let full = type_name::<R>();
    full.rsplit("::").next().unwrap_or(full)
}

//! Synchronous API client core for the Ondo Finance connector.
//!
//! # Overview
//! Exposes six CRUD resources (USDY token operations, OUSG fund management,
//! Global Markets records, token pricing and NAV, redemptions and
//! subscriptions, Flux Finance lending) through one generic request builder.
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern); the `Executor` drives a batch
//! of items through a `Transport`.
//!
//! # Design
//! - `Resource` is a table: collection path, default host, default page size.
//! - `ParameterResolver` turns the host's per-item parameters into a typed
//!   `OperationRequest`, applying defaults and rejecting bad values.
//! - `OndoClient` is stateless apart from the credentials and injects bearer
//!   authentication into every request.
//! - `Executor` runs items sequentially and maps each outcome to one
//!   `ResultRecord`, honoring the continue-on-fail switch.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod executor;
pub mod http;
pub mod params;
pub mod resource;
pub mod transport;
pub mod types;

pub use client::OndoClient;
pub use config::Settings;
pub use credentials::{CredentialStore, Credentials, Environment, StaticCredentials};
pub use error::{ApiError, ConfigError, ExecutionError, TransportError};
pub use executor::{Executor, PairedItem, ResultRecord, Transport};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use params::{JsonParameters, ParameterResolver, ParameterSource};
pub use resource::{Operation, Resource};
pub use transport::UreqTransport;
pub use types::{Action, CreatePayload, OperationRequest, Page, UpdatePayload};

//! The per-item execution loop.
//!
//! # Design
//! Items are processed strictly in order, one blocking round trip at a time:
//! resolve parameters, build the request, send it, parse the response. Each
//! item yields exactly one `ResultRecord` tagged with its index. In tolerant
//! mode a failure becomes an `{"error": message}` record; in strict mode the
//! first failure ends the run and no records are returned. Problems found
//! before the loop (unsupported resource, missing credentials) are never
//! tolerated.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info_span, warn};

use crate::client::OndoClient;
use crate::config::Settings;
use crate::credentials::{CredentialStore, CREDENTIAL_TYPE};
use crate::error::{ApiError, ExecutionError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::params::{ParameterResolver, ParameterSource};
use crate::resource::Resource;

/// Sends one request and returns whatever the server answered.
///
/// Implementations must return non-2xx responses as `Ok`; status handling
/// belongs to `OndoClient::parse`. No retries.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// Index of the input item a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedItem {
    pub item: usize,
}

/// One output record, in the host's `{json, pairedItem}` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub json: Value,
    pub paired_item: PairedItem,
    #[serde(skip)]
    failed: bool,
}

impl ResultRecord {
    pub fn success(item: usize, json: Value) -> Self {
        Self {
            json,
            paired_item: PairedItem { item },
            failed: false,
        }
    }

    pub fn error(item: usize, message: impl Into<String>) -> Self {
        Self {
            json: json!({ "error": message.into() }),
            paired_item: PairedItem { item },
            failed: true,
        }
    }

    /// Whether the record stands in for a tolerated failure.
    pub fn is_error(&self) -> bool {
        self.failed
    }
}

/// Runs one node execution over a batch of items.
pub struct Executor<'a, P: ?Sized, C: ?Sized, T> {
    parameters: &'a P,
    credentials: &'a C,
    transport: T,
    continue_on_fail: bool,
}

impl<'a, P, C, T> Executor<'a, P, C, T>
where
    P: ParameterSource + ?Sized,
    C: CredentialStore + ?Sized,
    T: Transport,
{
    /// Strict mode by default.
    pub fn new(parameters: &'a P, credentials: &'a C, transport: T) -> Self {
        Self {
            parameters,
            credentials,
            transport,
            continue_on_fail: false,
        }
    }

    pub fn continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }

    /// Process `item_count` input items and return one record per item.
    pub fn run(&self, item_count: usize) -> Result<Vec<ResultRecord>, ExecutionError> {
        let resource = ParameterResolver::new(self.parameters, 0)
            .resource()
            .map_err(ExecutionError::Setup)?;
        let span = info_span!("execute", %resource, items = item_count);
        let _guard = span.enter();

        let credentials = self
            .credentials
            .credentials(CREDENTIAL_TYPE)
            .map_err(ExecutionError::Setup)?;
        let client = OndoClient::new(credentials);

        let mut records = Vec::with_capacity(item_count);
        for item in 0..item_count {
            match self.process(&client, resource, item) {
                Ok(json) => records.push(ResultRecord::success(item, json)),
                Err(err) if self.continue_on_fail => {
                    warn!(item, error = %err, "item failed, continuing");
                    records.push(ResultRecord::error(item, err.to_string()));
                }
                Err(err) => {
                    warn!(item, error = %err, "item failed, aborting execution");
                    return Err(ExecutionError::Item { item, source: err });
                }
            }
        }
        Ok(records)
    }

    fn process(
        &self,
        client: &OndoClient,
        resource: Resource,
        item: usize,
    ) -> Result<Value, ApiError> {
        let resolver = ParameterResolver::new(self.parameters, item);
        let operation = resolver.operation()?;
        let request = resolver.resolve(resource, operation)?;
        let http_request = client.build(&request)?;

        debug!(
            item,
            %operation,
            method = %http_request.method,
            url = %http_request.full_url(),
            "dispatching request"
        );
        let response = self.transport.send(&http_request)?;
        debug!(item, status = response.status, "received response");

        client.parse(response)
    }
}

impl<'a, P, T> Executor<'a, P, Settings, T>
where
    P: ParameterSource + ?Sized,
    T: Transport,
{
    /// Credentials and the continue-on-fail switch both come from `settings`.
    pub fn from_settings(parameters: &'a P, settings: &'a Settings, transport: T) -> Self {
        Self::new(parameters, settings, transport)
            .continue_on_fail(settings.execution.continue_on_fail)
    }
}

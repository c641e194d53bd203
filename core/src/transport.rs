//! Blocking `Transport` backed by ureq.

use ureq::{Agent, RequestBuilder};

use crate::error::TransportError;
use crate::executor::Transport;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes `HttpRequest`s with a shared ureq agent.
///
/// ureq's status-code-as-error behavior is disabled so 4xx/5xx responses
/// come back as data and `OndoClient::parse` decides what they mean.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self::with_agent(agent)
    }

    /// Use a preconfigured agent. It must keep `http_status_as_error`
    /// disabled.
    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.full_url();
        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(&url), request).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&url), request).call(),
            HttpMethod::Post => {
                let builder = with_headers(self.agent.post(&url), request);
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = with_headers(self.agent.put(&url), request);
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| match e {
            ureq::Error::Timeout(_) => TransportError::new(format!("request timeout: {e}")),
            ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => {
                TransportError::new(format!("connection failed: {e}"))
            }
            other => TransportError::new(format!("request failed: {other}")),
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::new(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

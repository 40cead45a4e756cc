use std::time::Duration;

use anyhow::Result;

use super::http_trait::{Headers, HttpClient, HttpRequest, HttpResponse};

/// Minimal HTTP client implementation using ureq.
///
/// Blocking, no async runtime needed. Responses with a 4xx/5xx status are
/// passed back as regular responses so the caller decides what a failure is.
///
/// # Example
///
/// ```ignore
/// use service_proxy::{ServiceProxy, ServiceProxyOptions, UreqClient};
///
/// let http_client = UreqClient::with_timeout(5);
/// let proxy = ServiceProxy::with_client(options, http_client);
/// ```
#[derive(Clone)]
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    /// Create a new ureq HTTP client with default settings.
    pub fn new() -> Self {
        Self::with_timeout(30)
    }

    /// Create a new ureq HTTP client with a custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(timeout_secs))
                .build(),
        }
    }

    /// Wrap an already configured agent.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for UreqClient {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut req = self.agent.request(&request.method, &request.url);
        for (name, value) in request.headers.iter() {
            req = req.set(name, value);
        }

        let result = if request.body.is_empty() {
            req.call()
        } else {
            req.send_bytes(&request.body)
        };

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => return Err(transport.into()),
        };

        let headers: Headers = response
            .headers_names()
            .into_iter()
            .filter_map(|name| {
                let value = response.header(&name)?.to_string();
                Some((name, value))
            })
            .collect();

        Ok(HttpResponse::new(response.status(), response.into_reader()).with_headers(headers))
    }
}

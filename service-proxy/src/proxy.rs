use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Read;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::{Registry, ServiceApi};
use crate::body::{self, Body};
use crate::client::{HttpClient, HttpRequest, UreqClient};
use crate::error::{Error, Result};

/// Hook run on every outbound request right before it is sent.
///
/// Typical uses are signing requests or adding default headers. Any
/// `Fn(&mut HttpRequest)` closure is a preprocessor.
pub trait Preprocessor: Send + Sync {
    fn preprocess(&self, request: &mut HttpRequest);
}

impl<F> Preprocessor for F
where
    F: Fn(&mut HttpRequest) + Send + Sync,
{
    fn preprocess(&self, request: &mut HttpRequest) {
        self(request)
    }
}

/// Construction parameters for a [`ServiceProxy`].
///
/// Deserializable so the endpoint table can live in a config file; the
/// preprocessor has to be attached in code.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ServiceProxyOptions {
    pub scheme: String,
    pub host: String,
    #[serde(default)]
    pub apis: HashMap<String, ServiceApi>,
    #[serde(skip)]
    pub preprocessor: Option<Arc<dyn Preprocessor>>,
}

impl ServiceProxyOptions {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        ServiceProxyOptions {
            scheme: scheme.into(),
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn with_api(mut self, key: impl Into<String>, api: ServiceApi) -> Self {
        self.apis.insert(key.into(), api);
        self
    }

    pub fn with_preprocessor(mut self, preprocessor: impl Preprocessor + 'static) -> Self {
        self.preprocessor = Some(Arc::new(preprocessor));
        self
    }
}

impl fmt::Debug for ServiceProxyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProxyOptions")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("apis", &self.apis)
            .field("preprocessor", &self.preprocessor.is_some())
            .finish()
    }
}

/// Per-call parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOptions {
    pub api_key: String,
    pub query: BTreeMap<String, String>,
    pub body: Option<Body>,
    pub headers: BTreeMap<String, String>,
}

impl RequestOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        RequestOptions {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Client facade for a single HTTP service.
///
/// Maps API keys to registered endpoints on a fixed scheme and host. The
/// registry is a copy taken at construction and never changes afterwards, so
/// a proxy can be shared across threads and called concurrently.
///
/// Generic over the HTTP client implementation, allowing consumers to provide
/// their own HTTP client by implementing the `HttpClient` trait.
pub struct ServiceProxy<H: HttpClient = UreqClient> {
    scheme: String,
    host: String,
    preprocessor: Option<Arc<dyn Preprocessor>>,
    registry: Registry,
    http_client: H,
}

impl ServiceProxy<UreqClient> {
    /// Create a proxy backed by a default [`UreqClient`].
    pub fn new(options: ServiceProxyOptions) -> Self {
        Self::with_client(options, UreqClient::new())
    }
}

impl<H: HttpClient> ServiceProxy<H> {
    /// Create a proxy with a custom HTTP client implementation.
    pub fn with_client(options: ServiceProxyOptions, http_client: H) -> Self {
        ServiceProxy {
            registry: Registry::from_apis(&options.apis),
            scheme: options.scheme,
            host: options.host,
            preprocessor: options.preprocessor,
            http_client,
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn api(&self, key: &str) -> Option<&ServiceApi> {
        self.registry.get(key)
    }

    pub fn apis(&self) -> impl Iterator<Item = (&str, &ServiceApi)> {
        self.registry.iter()
    }

    pub fn http_client(&self) -> &H {
        &self.http_client
    }

    /// Absolute URL for `path` on this proxy's host.
    ///
    /// The path is appended as is (no templating, no slash cleanup), except
    /// that a missing leading `/` is added and `?`/`#` are percent-encoded so
    /// the path can never reach into the host, query or fragment. A
    /// non-empty `query` is urlencoded with keys in sorted order.
    pub fn build_url(&self, path: &str, query: &BTreeMap<String, String>) -> String {
        let mut url = format!("{}://{}", self.scheme, self.host);
        if !path.is_empty() && !path.starts_with('/') {
            url.push('/');
        }
        for c in path.chars() {
            match c {
                '?' => url.push_str("%3F"),
                '#' => url.push_str("%23"),
                c => url.push(c),
            }
        }
        if !query.is_empty() {
            url.push('?');
            url.push_str(&body::encode_pairs(query));
        }
        url
    }

    /// Turn `options` into a request ready to send. Nothing goes on the wire.
    pub fn assemble(&self, options: &RequestOptions) -> Result<HttpRequest> {
        let api = self
            .registry
            .get(&options.api_key)
            .ok_or_else(|| Error::InvalidApiKey(options.api_key.clone()))?;

        let url = self.build_url(&api.path, &options.query);
        if let Err(source) = Url::parse(&url) {
            return Err(Error::InvalidUrl { url, source });
        }

        let mut request = HttpRequest::new(api.method.clone(), url);
        for (name, value) in &options.headers {
            request.headers.set(name.clone(), value.clone());
        }

        if let Some(body) = &options.body {
            body.encode_into(&mut request)?;
        }

        Ok(request)
    }

    /// Run the preprocessor on `request`, send it, and return the body of a
    /// 2xx response.
    pub fn raw_request(&self, mut request: HttpRequest) -> Result<Vec<u8>> {
        if let Some(preprocessor) = &self.preprocessor {
            preprocessor.preprocess(&mut request);
        }

        log::debug!("{} {}", request.method, request.url);

        // the response (and its connection) is dropped on every return below
        let mut response = match self.http_client.execute(&request) {
            Ok(response) => response,
            Err(e) => {
                return Err(Error::Transport {
                    url: request.url,
                    source: e.into(),
                })
            }
        };

        if !response.is_success() {
            return Err(Error::UnexpectedStatus {
                url: request.url,
                code: response.status,
            });
        }

        let mut result = Vec::new();
        if let Err(source) = response.body.read_to_end(&mut result) {
            return Err(Error::ReadFailure {
                url: request.url,
                source,
            });
        }

        log::trace!(
            "{} {} -> {} ({} bytes)",
            request.method,
            request.url,
            response.status,
            result.len()
        );

        Ok(result)
    }

    /// Call the endpoint registered under `options.api_key` and return the
    /// raw response body.
    pub fn request(&self, options: &RequestOptions) -> Result<Vec<u8>> {
        let request = self.assemble(options)?;
        self.raw_request(request)
    }

    /// Like [`request`](Self::request), decoding the body as JSON.
    pub fn json<T: DeserializeOwned>(&self, options: &RequestOptions) -> Result<T> {
        let data = self.request(options)?;
        serde_json::from_slice(&data).map_err(Error::Decode)
    }
}

impl<H: HttpClient> fmt::Debug for ServiceProxy<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProxy")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("apis", &self.registry.len())
            .field("preprocessor", &self.preprocessor.is_some())
            .finish_non_exhaustive()
    }
}

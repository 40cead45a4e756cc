//! Configurable HTTP client facade.
//!
//! A [`ServiceProxy`] is bound to one scheme and host and knows a fixed set of
//! endpoints, each registered under an API key. Calls name the key and supply
//! query parameters, headers and an optional [`Body`]; the proxy builds the
//! request, runs the optional [`Preprocessor`], sends it and hands back the
//! raw body of a 2xx response (or decodes it as JSON).
//!
//! ```ignore
//! use service_proxy::{RequestOptions, ServiceApi, ServiceProxy, ServiceProxyOptions};
//!
//! let proxy = ServiceProxy::new(
//!     ServiceProxyOptions::new("https", "api.example.com")
//!         .with_api("getUser", ServiceApi::get("/users/42"))
//!         .with_preprocessor(|req: &mut service_proxy::HttpRequest| {
//!             req.headers.set("Authorization", "Bearer token");
//!         }),
//! );
//! let user: User = proxy.json(&RequestOptions::new("getUser"))?;
//! ```
mod api;
mod body;
mod client;
mod error;
mod proxy;

pub use api::ServiceApi;
pub use body::{Body, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE};
pub use client::{Headers, HttpClient, HttpRequest, HttpResponse, UreqClient};
pub use error::{Error, Result};
pub use proxy::{Preprocessor, RequestOptions, ServiceProxy, ServiceProxyOptions};

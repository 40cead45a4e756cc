mod http_trait;
mod ureq_impl;

pub use http_trait::{Headers, HttpClient, HttpRequest, HttpResponse};

pub use ureq_impl::UreqClient;

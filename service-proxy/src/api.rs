use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A registered endpoint: the HTTP method and the path it is served on.
///
/// Neither field is validated on registration. The path is used verbatim,
/// dynamic segments must already be rendered into it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceApi {
    pub method: String,
    pub path: String,
}

impl ServiceApi {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        ServiceApi {
            method: method.into(),
            path: path.into(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new("POST", path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new("PUT", path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new("DELETE", path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new("PATCH", path)
    }
}

/// Read-only snapshot of the API table a proxy was built with.
#[derive(Clone, Debug, Default)]
pub(crate) struct Registry {
    apis: HashMap<String, ServiceApi>,
}

impl Registry {
    pub(crate) fn from_apis(apis: &HashMap<String, ServiceApi>) -> Self {
        Registry { apis: apis.clone() }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&ServiceApi> {
        self.apis.get(key)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &ServiceApi)> {
        self.apis.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn len(&self) -> usize {
        self.apis.len()
    }
}

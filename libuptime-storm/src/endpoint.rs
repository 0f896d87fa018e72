use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method,
};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported scheme {scheme:?} in {url:?}, expected http or https")]
    UnsupportedScheme { url: String, scheme: String },
    #[error("URL {0:?} has no host to derive a domain from")]
    MissingHost(String),
    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),
    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read endpoint file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse endpoint file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("endpoint #{index} in {} is invalid: {source}", path.display())]
    InvalidEndpoint {
        path: PathBuf,
        index: usize,
        #[source]
        source: EndpointError,
    },
    #[error("endpoint file {} lists no endpoints", path.display())]
    Empty { path: PathBuf },
}

#[derive(Debug, Deserialize)]
struct RawEndpoint {
    url: String,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    body: Option<serde_json::Value>,
}

/// One polled target. Validated on construction, so checks never see a bad URL.
#[derive(Debug, Clone)]
pub struct EndpointSpec {
    url: Url,
    domain: String,
    method: Method,
    headers: HeaderMap,
    body: Option<serde_json::Value>,
}

impl EndpointSpec {
    pub fn parse(url: &str) -> Result<Self, EndpointError> {
        let parsed = Url::parse(url).map_err(|source| EndpointError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(EndpointError::UnsupportedScheme {
                url: url.to_string(),
                scheme: parsed.scheme().to_string(),
            });
        }

        let domain = extract_domain(&parsed)
            .ok_or_else(|| EndpointError::MissingHost(url.to_string()))?;

        Ok(Self {
            url: parsed,
            domain,
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        })
    }

    pub fn with_method(mut self, method: &str) -> Result<Self, EndpointError> {
        self.method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| EndpointError::InvalidMethod(method.to_string()))?;
        Ok(self)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, EndpointError> {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| EndpointError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| EndpointError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

impl TryFrom<RawEndpoint> for EndpointSpec {
    type Error = EndpointError;

    fn try_from(raw: RawEndpoint) -> Result<Self, Self::Error> {
        let mut spec = EndpointSpec::parse(&raw.url)?;
        if let Some(method) = raw.method {
            spec = spec.with_method(&method)?;
        }
        for (name, value) in raw.headers.unwrap_or_default() {
            spec = spec.with_header(&name, &value)?;
        }
        if let Some(body) = raw.body {
            spec = spec.with_body(body);
        }
        Ok(spec)
    }
}

/// Host component of the URL. Userinfo and port are not part of the domain.
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|host| !host.is_empty())
        .map(|host| host.to_lowercase())
}

pub fn load_endpoints(path: impl AsRef<Path>) -> Result<Vec<EndpointSpec>, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_endpoints(&content, path)
}

/// Parses a YAML sequence of endpoint mappings. `origin` is only used in errors.
pub fn parse_endpoints(content: &str, origin: &Path) -> Result<Vec<EndpointSpec>, ConfigError> {
    if content.trim().is_empty() {
        return Err(ConfigError::Empty {
            path: origin.to_path_buf(),
        });
    }

    let raw: Option<Vec<RawEndpoint>> =
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

    let raw = raw.unwrap_or_default();
    if raw.is_empty() {
        return Err(ConfigError::Empty {
            path: origin.to_path_buf(),
        });
    }

    raw.into_iter()
        .enumerate()
        .map(|(i, entry)| {
            EndpointSpec::try_from(entry).map_err(|source| ConfigError::InvalidEndpoint {
                path: origin.to_path_buf(),
                index: i + 1,
                source,
            })
        })
        .collect()
}

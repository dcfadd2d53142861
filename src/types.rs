//! Core request/response types shared by the classifier, strategies, and
//! the worker lifecycle.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{Result, VordrError};

pub use reqwest::Url;

/// HTTP method of an intercepted request.
///
/// Only GET requests are ever served from cache; everything else passes
/// through the engine untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Options,
    Patch,
}

impl Method {
    /// Whether this method is cache-eligible.
    pub fn is_get(&self) -> bool {
        matches!(self, Method::Get)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
        };
        f.write_str(s)
    }
}

/// What the requesting context intends to do with the response.
///
/// Only [`Destination::Document`] influences behaviour: navigations get the
/// cached shell page as a last-resort offline fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    /// A top-level navigation.
    Document,
    Script,
    Style,
    Image,
    Font,
    #[default]
    Other,
}

/// An intercepted request as handed to the worker by the host platform.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    pub destination: Destination,
}

impl FetchRequest {
    /// Build a request from an absolute URL string.
    pub fn new(method: Method, url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| VordrError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            method,
            url,
            destination: Destination::Other,
        })
    }

    /// A plain GET subresource request.
    pub fn get(url: &str) -> Result<Self> {
        Self::new(Method::Get, url)
    }

    /// A top-level navigation request (GET, destination document).
    pub fn navigate(url: &str) -> Result<Self> {
        Ok(Self::get(url)?.destination(Destination::Document))
    }

    /// Set the request destination.
    pub fn destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }
}

/// Cache-entry identity: method plus absolute URL, query included.
///
/// Two requests are cache-equivalent iff their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    /// Derive the key for a request.
    pub fn of(request: &FetchRequest) -> Self {
        Self {
            method: request.method.to_string(),
            url: request.url.to_string(),
        }
    }

    /// Key for a GET of the given URL.
    pub fn get(url: &Url) -> Self {
        Self {
            method: Method::Get.to_string(),
            url: url.to_string(),
        }
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// An immutable capture of a response at the time it was cached — status,
/// headers, and fully-buffered body — sufficient to be replayed later
/// without re-fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl ResponseSnapshot {
    /// Whether the captured status is in the 2xx range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The fixed ordered list of paths that must be present in the static
/// generation after install completes.
///
/// Owned by the deployment process; this crate only validates shape (every
/// path absolute) and preserves order.
#[derive(Debug, Clone)]
pub struct AssetManifest {
    paths: Vec<String>,
}

impl AssetManifest {
    /// Build a manifest, rejecting non-absolute paths.
    pub fn new<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        for path in &paths {
            if !path.starts_with('/') {
                return Err(VordrError::Configuration(format!(
                    "manifest path must be absolute: {path}"
                )));
            }
        }
        Ok(Self { paths })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_key_includes_query() {
        let a = FetchRequest::get("https://example.app/search?q=one").unwrap();
        let b = FetchRequest::get("https://example.app/search?q=two").unwrap();
        assert_ne!(RequestKey::of(&a), RequestKey::of(&b));
    }

    #[test]
    fn request_key_includes_method() {
        let get = FetchRequest::get("https://example.app/data").unwrap();
        let post = FetchRequest::new(Method::Post, "https://example.app/data").unwrap();
        assert_ne!(RequestKey::of(&get), RequestKey::of(&post));
    }

    #[test]
    fn request_key_display() {
        let req = FetchRequest::get("https://example.app/a.css").unwrap();
        assert_eq!(
            RequestKey::of(&req).to_string(),
            "GET https://example.app/a.css"
        );
    }

    #[test]
    fn snapshot_ok_range() {
        let snap = ResponseSnapshot {
            status: 204,
            headers: vec![],
            body: Bytes::new(),
        };
        assert!(snap.ok());

        let snap = ResponseSnapshot {
            status: 404,
            headers: vec![],
            body: Bytes::new(),
        };
        assert!(!snap.ok());
    }

    #[test]
    fn snapshot_header_lookup_is_case_insensitive() {
        let snap = ResponseSnapshot {
            status: 200,
            headers: vec![("Content-Type".into(), "text/html".into())],
            body: Bytes::new(),
        };
        assert_eq!(snap.header("content-type"), Some("text/html"));
        assert_eq!(snap.header("etag"), None);
    }

    #[test]
    fn manifest_rejects_relative_paths() {
        assert!(AssetManifest::new(["/index.html", "styles.css"]).is_err());
    }

    #[test]
    fn manifest_preserves_order() {
        let manifest = AssetManifest::new(["/shell.html", "/app.css"]).unwrap();
        let paths: Vec<_> = manifest.iter().collect();
        assert_eq!(paths, vec!["/shell.html", "/app.css"]);
        assert!(manifest.contains("/app.css"));
        assert!(!manifest.contains("/other.css"));
    }

    #[test]
    fn invalid_url_is_rejected() {
        assert!(FetchRequest::get("not a url").is_err());
    }
}

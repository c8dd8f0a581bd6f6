//! # HTTP Request Model
//!
//! Value types produced by the `.http` parser: the request itself, its body and
//! the closed sets of methods and body kinds. A `Request` is built up line by
//! line while parsing and is never modified once it has been pushed into the
//! result list.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Version used when the request line carries none
pub const DEFAULT_HTTP_VERSION: &str = "1.1";

/// HTTP methods understood by the `.http` format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Put,
    Post,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
    Connect,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
        }
    }

    /// GET and DELETE blocks end at the header block and never carry a body
    pub fn is_bodyless(&self) -> bool {
        matches!(self, Method::Get | Method::Delete)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a method token is not one of the known methods
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "PUT" => Ok(Method::Put),
            "POST" => Ok(Method::Post),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            "TRACE" => Ok(Method::Trace),
            "CONNECT" => Ok(Method::Connect),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// Kind of request body, derived from the `Content-Type` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BodyKind {
    PlainText,
    Json,
    FormUrlEncoded,
    MultipartFormData,
}

impl BodyKind {
    /// Resolve a `Content-Type` value into a body kind.
    ///
    /// The media type is compared case-insensitively with any parameters
    /// stripped. Multipart is matched by substring since its value always
    /// carries a `boundary=` parameter.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let lowered = content_type.to_ascii_lowercase();
        if lowered.contains("multipart/form-data") {
            return Some(BodyKind::MultipartFormData);
        }

        let media_type = lowered.split(';').next().unwrap_or_default().trim();
        match media_type {
            "text/plain" => Some(BodyKind::PlainText),
            "application/json" => Some(BodyKind::Json),
            "application/x-www-form-urlencoded" => Some(BodyKind::FormUrlEncoded),
            _ => None,
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            BodyKind::PlainText => "text/plain",
            BodyKind::Json => "application/json",
            BodyKind::FormUrlEncoded => "application/x-www-form-urlencoded",
            BodyKind::MultipartFormData => "multipart/form-data",
        }
    }
}

/// Extract the `boundary=` parameter of a multipart `Content-Type` value
pub fn boundary_of(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("boundary") {
            let value = value.trim().trim_matches('"');
            (!value.is_empty()).then(|| value.to_string())
        } else {
            None
        }
    })
}

/// Request body with its validated content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Body {
    pub kind: BodyKind,
    pub content: String,
}

impl Body {
    pub fn new(kind: BodyKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// Ordered header mapping.
///
/// Keys keep the case they were written with and their first insertion
/// position; inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HttpHeaders(Vec<(String, String)>);

impl HttpHeaders {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Case-insensitive lookup, used for protocol headers like `Content-Type`
    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HttpHeaders {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = HttpHeaders::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

/// A single request definition from a `.http` file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    pub name: Option<String>,
    pub method: Method,
    pub target: String,
    pub host: Option<String>,
    pub http_version: String,
    pub headers: HttpHeaders,
    pub body: Option<Body>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prescript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postscript: Option<String>,
}

impl Request {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            name: None,
            method,
            target: target.into(),
            host: None,
            http_version: DEFAULT_HTTP_VERSION.to_string(),
            headers: HttpHeaders::new(),
            body: None,
            prescript: None,
            postscript: None,
        }
    }

    /// Short label for the request list
    pub fn title(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{} {}", self.method, self.target),
        }
    }

    /// Render the request back into `.http` source form.
    ///
    /// Parsing the returned text yields a request equal to `self`.
    pub fn to_http_text(&self) -> String {
        let mut text = String::new();

        if let Some(script) = &self.prescript {
            text.push_str(&format!("@prescript={script}\n"));
        }
        if let Some(script) = &self.postscript {
            text.push_str(&format!("@postscript={script}\n"));
        }
        if let Some(name) = &self.name {
            text.push_str(&format!("&{name}\n"));
        }

        text.push_str(&format!(
            "{} {} HTTP/{}\n",
            self.method, self.target, self.http_version
        ));

        if let Some(host) = &self.host {
            text.push_str(&format!("Host: {host}\n"));
        }

        for (key, value) in self.headers.iter() {
            text.push_str(&format!("{key}: {value}\n"));
        }

        if let Some(body) = &self.body {
            text.push('\n');
            text.push_str(&body.content);
            text.push('\n');
        }

        text
    }
}

/// Entry shown in the request list: a display label plus the request it names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub label: String,
    pub request: Request,
}

impl ListEntry {
    pub fn new(label: impl Into<String>, request: Request) -> Self {
        Self {
            label: label.into(),
            request,
        }
    }

    /// Entries for requests loaded from a single file
    pub fn from_requests(requests: Vec<Request>) -> Vec<Self> {
        requests
            .into_iter()
            .map(|request| Self::new(request.title(), request))
            .collect()
    }

    /// Entries for a directory load, prefixed with the file they came from
    pub fn from_file_requests(file_name: &str, requests: Vec<Request>) -> Vec<Self> {
        requests
            .into_iter()
            .enumerate()
            .map(|(index, request)| {
                let title = match &request.name {
                    Some(name) => name.clone(),
                    None => format!("#{}", index + 1),
                };
                Self::new(format!("{file_name} › {title}"), request)
            })
            .collect()
    }
}

//! # `.http` File Parser
//!
//! Turns the text of a `.http` file into an ordered list of [`Request`]s.
//!
//! The parser is a small line-oriented state machine:
//!
//! ```text
//!              request line              Host: line / header
//!  Metadata ───────────────────▶ Host ──────────────────────▶ Headers
//!     ▲                           │ blank                        │ blank
//!     │        GET / DELETE       ▼                              ▼
//!     ├─────────────────────── (end of headers) ◀────────────────┘
//!     │                           │ other methods (Content-Type required)
//!     │        blank / boundary   ▼
//!     └─────────────────────────Body
//! ```
//!
//! Comment lines (`#`, `//`) are ignored in every state. `@name=value` lines
//! are only accepted between requests. Every other line has its `{{name}}`
//! placeholders substituted before it is interpreted.

use crate::repl::models::{
    boundary_of, Body, BodyKind, ListEntry, Method, Request, DEFAULT_HTTP_VERSION,
};
use crate::repl::utils::variables::{Assignment, MissingVariable, VariableTable};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension of files picked up by the loaders
pub const HTTP_FILE_EXTENSION: &str = "http";

/// Reasons a `.http` source is rejected. Every variant carries the 1-based
/// line the problem was detected on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: variable '{name}' is not defined")]
    UndefinedVariable { line: usize, name: String },

    #[error("line {line}: variables must precede a request")]
    VariableOutOfPlace { line: usize },

    #[error("line {line}: malformed variable definition, expected '@name=value'")]
    MalformedVariable { line: usize },

    #[error("line {line}: malformed request line '{text}', expected 'METHOD target [version]'")]
    MalformedRequestLine { line: usize, text: String },

    #[error("line {line}: unknown HTTP method '{method}'")]
    UnknownMethod { line: usize, method: String },

    #[error("line {line}: invalid HTTP version '{version}'")]
    InvalidVersion { line: usize, version: String },

    #[error("line {line}: expected 'Host: <value>' after the request line")]
    MissingHost { line: usize },

    #[error("line {line}: malformed header '{text}', expected 'Key: Value'")]
    MalformedHeader { line: usize, text: String },

    #[error("line {line}: {method} request requires a Content-Type header")]
    MissingContentType { line: usize, method: Method },

    #[error("line {line}: unsupported Content-Type '{content_type}'")]
    UnsupportedContentType { line: usize, content_type: String },

    #[error("line {line}: multipart Content-Type has no boundary parameter")]
    MissingBoundary { line: usize },

    #[error("line {line}: invalid JSON body: {reason}")]
    InvalidJson { line: usize, reason: String },

    #[error("line {line}: malformed form field '{segment}', expected 'key=value'")]
    InvalidFormField { line: usize, segment: String },

    #[error("line {line}: multipart body is missing its closing boundary '--{boundary}--'")]
    UnterminatedMultipart { line: usize, boundary: String },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::UndefinedVariable { line, .. }
            | ParseError::VariableOutOfPlace { line }
            | ParseError::MalformedVariable { line }
            | ParseError::MalformedRequestLine { line, .. }
            | ParseError::UnknownMethod { line, .. }
            | ParseError::InvalidVersion { line, .. }
            | ParseError::MissingHost { line }
            | ParseError::MalformedHeader { line, .. }
            | ParseError::MissingContentType { line, .. }
            | ParseError::UnsupportedContentType { line, .. }
            | ParseError::MissingBoundary { line }
            | ParseError::InvalidJson { line, .. }
            | ParseError::InvalidFormField { line, .. }
            | ParseError::UnterminatedMultipart { line, .. } => *line,
        }
    }
}

/// Failures of the file and directory loaders
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{}: not a .http file", path.display())]
    NotHttpFile { path: PathBuf },

    #[error("failed to read {}: {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {}", path.display(), source)]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// Format variants accepted by the parser
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Demand a `Host:` line directly after every request line
    pub require_host: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Metadata,
    Host,
    Headers,
    Body,
}

/// What has been collected for the next request before its request line
#[derive(Debug, Default)]
struct PendingRequest {
    name: Option<String>,
    prescript: Option<String>,
    postscript: Option<String>,
    request: Option<Request>,
}

impl PendingRequest {
    fn is_started(&self) -> bool {
        self.name.is_some() || self.request.is_some()
    }
}

#[derive(Debug)]
struct BodyBlock {
    kind: BodyKind,
    boundary: Option<String>,
    start_line: usize,
    lines: Vec<String>,
}

struct HttpFileParser {
    options: ParserOptions,
    state: ParserState,
    variables: VariableTable,
    pending: PendingRequest,
    body: Option<BodyBlock>,
    requests: Vec<Request>,
}

/// Parse `.http` source text with the default options
pub fn parse(text: &str) -> Result<Vec<Request>, ParseError> {
    parse_with(text, ParserOptions::default())
}

/// Parse `.http` source text
pub fn parse_with(text: &str, options: ParserOptions) -> Result<Vec<Request>, ParseError> {
    let mut parser = HttpFileParser::new(options);
    let mut line_count = 0;
    for (index, line) in text.lines().enumerate() {
        line_count = index + 1;
        parser.consume(line_count, line)?;
    }
    parser.finish(line_count.max(1))
}

/// Parse a single `.http` file
pub fn parse_file(path: &Path, options: ParserOptions) -> Result<Vec<Request>, LoadError> {
    if !has_http_extension(path) {
        return Err(LoadError::NotHttpFile {
            path: path.to_path_buf(),
        });
    }

    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Parsing {}", path.display());
    parse_with(&text, options).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse every `.http` file in `dir`, keyed by file name.
///
/// Files are visited in name order and the first failure aborts the whole
/// load; no partial result is returned.
pub fn parse_dir(
    dir: &Path,
    options: ParserOptions,
) -> Result<BTreeMap<String, Vec<Request>>, LoadError> {
    let io_error = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && has_http_extension(&path) {
            files.push(path);
        }
    }
    files.sort();

    let mut parsed = BTreeMap::new();
    for path in files {
        let requests = parse_file(&path, options)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        parsed.insert(file_name, requests);
    }

    tracing::info!("Loaded {} .http files from {}", parsed.len(), dir.display());
    Ok(parsed)
}

/// Load list entries from a file or, in directory mode, from every file in it
pub fn load_entries(path: &Path, options: ParserOptions) -> Result<Vec<ListEntry>, LoadError> {
    if path.is_dir() {
        let files = parse_dir(path, options)?;
        Ok(files
            .into_iter()
            .flat_map(|(file_name, requests)| ListEntry::from_file_requests(&file_name, requests))
            .collect())
    } else {
        Ok(ListEntry::from_requests(parse_file(path, options)?))
    }
}

fn has_http_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(HTTP_FILE_EXTENSION))
        .unwrap_or(false)
}

fn is_comment(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with('#') || line.starts_with("//")
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

impl HttpFileParser {
    fn new(options: ParserOptions) -> Self {
        Self {
            options,
            state: ParserState::Metadata,
            variables: VariableTable::new(),
            pending: PendingRequest::default(),
            body: None,
            requests: Vec::new(),
        }
    }

    fn consume(&mut self, line_no: usize, line: &str) -> Result<(), ParseError> {
        if is_comment(line) {
            return Ok(());
        }

        if line.starts_with('@') {
            return self.assign(line_no, line);
        }

        match self.state {
            ParserState::Metadata => {
                if is_blank(line) {
                    return Ok(());
                }
                if let Some(name) = line.strip_prefix('&') {
                    let name = self.substitute(line_no, name)?;
                    self.pending.name = Some(name.trim().to_string());
                    return Ok(());
                }
                let line = self.substitute(line_no, line)?;
                self.start_request(line_no, &line)?;
                self.state = ParserState::Host;
            }
            ParserState::Host => {
                if is_blank(line) {
                    if self.options.require_host {
                        return Err(ParseError::MissingHost { line: line_no });
                    }
                    return self.end_headers(line_no);
                }
                let line = self.substitute(line_no, line)?;
                self.state = ParserState::Headers;
                match host_value(&line) {
                    Some(host) => {
                        if let Some(request) = self.pending.request.as_mut() {
                            request.host = Some(host);
                        }
                    }
                    None if self.options.require_host => {
                        return Err(ParseError::MissingHost { line: line_no });
                    }
                    None => self.add_header(line_no, &line)?,
                }
            }
            ParserState::Headers => {
                if is_blank(line) {
                    return self.end_headers(line_no);
                }
                let line = self.substitute(line_no, line)?;
                self.add_header(line_no, &line)?;
            }
            ParserState::Body => {
                let line = self.substitute(line_no, line)?;
                let Some(body) = self.body.as_mut() else {
                    self.state = ParserState::Metadata;
                    return Ok(());
                };

                match &body.boundary {
                    Some(boundary) => {
                        let closes = line.contains(&format!("--{boundary}--"));
                        body.lines.push(line);
                        if closes {
                            self.finish_body()?;
                        }
                    }
                    None if is_blank(&line) => self.finish_body()?,
                    None => body.lines.push(line),
                }
            }
        }

        Ok(())
    }

    fn assign(&mut self, line_no: usize, line: &str) -> Result<(), ParseError> {
        if self.state != ParserState::Metadata || self.pending.is_started() {
            return Err(ParseError::VariableOutOfPlace { line: line_no });
        }

        let assignment =
            Assignment::parse(line).ok_or(ParseError::MalformedVariable { line: line_no })?;

        if assignment.is_prescript() {
            self.pending.prescript = Some(assignment.value);
        } else if assignment.is_postscript() {
            self.pending.postscript = Some(assignment.value);
        } else {
            tracing::trace!("Defining variable '{}'", assignment.name);
            self.variables.define(assignment.name, assignment.value);
        }

        Ok(())
    }

    fn substitute(&self, line_no: usize, line: &str) -> Result<String, ParseError> {
        self.variables
            .substitute(line)
            .map_err(|MissingVariable(name)| ParseError::UndefinedVariable {
                line: line_no,
                name,
            })
    }

    fn start_request(&mut self, line_no: usize, line: &str) -> Result<(), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(ParseError::MalformedRequestLine {
                line: line_no,
                text: line.trim().to_string(),
            });
        }

        let method: Method = parts[0]
            .parse()
            .map_err(|_| ParseError::UnknownMethod {
                line: line_no,
                method: parts[0].to_string(),
            })?;

        let http_version = match parts.get(2) {
            Some(token) => parse_version(token).ok_or_else(|| ParseError::InvalidVersion {
                line: line_no,
                version: token.to_string(),
            })?,
            None => DEFAULT_HTTP_VERSION.to_string(),
        };

        let mut request = Request::new(method, parts[1]);
        request.http_version = http_version;
        request.name = self.pending.name.take();
        request.prescript = self.pending.prescript.take();
        request.postscript = self.pending.postscript.take();
        self.pending.request = Some(request);

        Ok(())
    }

    fn add_header(&mut self, line_no: usize, line: &str) -> Result<(), ParseError> {
        let (key, value) = line
            .split_once(':')
            .map(|(k, v)| (k.trim(), v.trim()))
            .filter(|(k, _)| !k.is_empty())
            .ok_or_else(|| ParseError::MalformedHeader {
                line: line_no,
                text: line.trim().to_string(),
            })?;

        if let Some(request) = self.pending.request.as_mut() {
            request.headers.insert(key, value);
        }
        Ok(())
    }

    /// Blank line after the header block: either the request is complete or
    /// a body follows, depending on the method.
    fn end_headers(&mut self, line_no: usize) -> Result<(), ParseError> {
        let Some(request) = self.pending.request.as_ref() else {
            self.state = ParserState::Metadata;
            return Ok(());
        };

        if request.method.is_bodyless() {
            self.finalize();
            return Ok(());
        }

        let content_type = request
            .headers
            .get_ignore_case("Content-Type")
            .ok_or(ParseError::MissingContentType {
                line: line_no,
                method: request.method,
            })?;

        let kind = BodyKind::from_content_type(content_type).ok_or_else(|| {
            ParseError::UnsupportedContentType {
                line: line_no,
                content_type: content_type.to_string(),
            }
        })?;

        let boundary = match kind {
            BodyKind::MultipartFormData => Some(
                boundary_of(content_type).ok_or(ParseError::MissingBoundary { line: line_no })?,
            ),
            _ => None,
        };

        self.body = Some(BodyBlock {
            kind,
            boundary,
            start_line: line_no + 1,
            lines: Vec::new(),
        });
        self.state = ParserState::Body;
        Ok(())
    }

    fn finish_body(&mut self) -> Result<(), ParseError> {
        if let Some(block) = self.body.take() {
            let body = build_body(block)?;
            if let Some(request) = self.pending.request.as_mut() {
                request.body = body;
            }
        }
        self.finalize();
        Ok(())
    }

    fn finalize(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        if let Some(request) = pending.request {
            tracing::trace!("Parsed request {} {}", request.method, request.target);
            self.requests.push(request);
        }
        self.state = ParserState::Metadata;
    }

    fn finish(mut self, last_line: usize) -> Result<Vec<Request>, ParseError> {
        match self.state {
            ParserState::Body => {
                if let Some(BodyBlock {
                    boundary: Some(boundary),
                    start_line,
                    ..
                }) = &self.body
                {
                    return Err(ParseError::UnterminatedMultipart {
                        line: (*start_line).min(last_line),
                        boundary: boundary.clone(),
                    });
                }
                self.finish_body()?;
            }
            ParserState::Host if self.options.require_host => {
                return Err(ParseError::MissingHost { line: last_line });
            }
            ParserState::Host | ParserState::Headers => {
                let has_target = self
                    .pending
                    .request
                    .as_ref()
                    .map(|r| !r.target.trim().is_empty())
                    .unwrap_or(false);
                if has_target {
                    self.finalize();
                }
            }
            ParserState::Metadata => {}
        }

        Ok(self.requests)
    }
}

/// Value of a `Host: <value>` line, if that is what the line is
fn host_value(line: &str) -> Option<String> {
    let (key, value) = line.split_once(':')?;
    if key.trim().eq_ignore_ascii_case("host") && !value.trim().is_empty() {
        Some(value.trim().to_string())
    } else {
        None
    }
}

/// Accepts `1.1`, `2` or `HTTP/1.1` forms and returns the bare number
fn parse_version(token: &str) -> Option<String> {
    let number = match token.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("HTTP/") => &token[5..],
        _ => token,
    };

    let mut chars = number.chars();
    let starts_with_digit = chars.next().map(|c| c.is_ascii_digit()).unwrap_or(false);
    let valid = starts_with_digit
        && !number.ends_with('.')
        && number.chars().all(|c| c.is_ascii_digit() || c == '.')
        && number.matches('.').count() <= 1;

    valid.then(|| number.to_string())
}

fn build_body(block: BodyBlock) -> Result<Option<Body>, ParseError> {
    let content = block.lines.join("\n");
    if block.kind != BodyKind::MultipartFormData && content.trim().is_empty() {
        return Ok(None);
    }

    let content = match block.kind {
        BodyKind::PlainText | BodyKind::MultipartFormData => content,
        BodyKind::Json => {
            let value: serde_json::Value =
                serde_json::from_str(&content).map_err(|e| ParseError::InvalidJson {
                    line: block.start_line,
                    reason: e.to_string(),
                })?;
            canonical_json(&value).map_err(|e| ParseError::InvalidJson {
                line: block.start_line,
                reason: e.to_string(),
            })?
        }
        BodyKind::FormUrlEncoded => {
            let trimmed = content.trim();
            if let Some(segment) = trimmed.split('&').find(|segment| !segment.contains('=')) {
                return Err(ParseError::InvalidFormField {
                    line: block.start_line,
                    segment: segment.to_string(),
                });
            }
            trimmed.to_string()
        }
    };

    Ok(Some(Body::new(block.kind, content)))
}

/// JSON separators used for the canonical form: `", "` and `": "`
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Single-line JSON with key order preserved, e.g. `{"a": 1, "b": [1, 2]}`
pub fn canonical_json(value: &serde_json::Value) -> serde_json::Result<String> {
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, SpacedFormatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

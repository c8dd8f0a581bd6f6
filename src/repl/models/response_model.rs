//! Response model
//!
//! Holds what the request executor brings back from the network: the status,
//! the headers in received order and the decoded body text. Formatting for the
//! response pane lives here too so the view model only deals in lines.

/// HTTP response status information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseStatus {
    pub code: u16,
    pub reason: String,
}

impl ResponseStatus {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Check if the status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// Check if the status indicates client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.code)
    }

    /// Check if the status indicates server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.code)
    }

    /// Get status as string (e.g., "200 OK")
    pub fn as_string(&self) -> String {
        if self.reason.is_empty() {
            self.code.to_string()
        } else {
            format!("{} {}", self.code, self.reason)
        }
    }
}

/// A completed HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: ResponseStatus,
    pub version: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub duration_ms: Option<u64>,
}

impl Response {
    pub fn new(status: ResponseStatus, body: impl Into<String>) -> Self {
        Self {
            status,
            version: "HTTP/1.1".to_string(),
            headers: Vec::new(),
            body: body.into(),
            duration_ms: None,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn is_json(&self) -> bool {
        self.header("content-type")
            .map(|ct| {
                let ct = ct.to_ascii_lowercase();
                ct.contains("application/json") || ct.contains("+json")
            })
            .unwrap_or(false)
    }

    /// Body as shown to the user; JSON is pretty-printed when it parses
    pub fn display_body(&self) -> String {
        if self.is_json() {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&self.body) {
                if let Ok(pretty) = serde_json::to_string_pretty(&value) {
                    return pretty;
                }
            }
        }
        self.body.clone()
    }

    /// Full text for the response pane: status line, headers, blank line, body
    pub fn to_display_text(&self) -> String {
        let mut text = format!("{} {}\n", self.version, self.status.as_string());
        for (key, value) in &self.headers {
            text.push_str(&format!("{key}: {value}\n"));
        }
        text.push('\n');
        text.push_str(&self.display_body());
        text
    }
}

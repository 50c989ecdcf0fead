//! Minimal STOMP 1.2 text-frame codec.
//!
//! ```text
//! COMMAND\n
//! header:value\n
//! ...\n
//! \n
//! body\0
//! ```

use crate::transport::TransportError;

/// One STOMP frame. Header order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StompFrame {
    pub command: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl StompFrame {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// `CONNECT` negotiating STOMP 1.1 or 1.2.
    pub fn connect(host: &str) -> Self {
        Self::new("CONNECT")
            .with_header("accept-version", "1.1,1.2")
            .with_header("host", host)
    }

    pub fn subscribe(id: &str, destination: &str) -> Self {
        Self::new("SUBSCRIBE")
            .with_header("id", id)
            .with_header("destination", destination)
    }

    /// `SEND` with a JSON body; `content-length` counts UTF-8 bytes.
    pub fn send_json(destination: &str, body: String) -> Self {
        let len = body.len().to_string();
        Self::new("SEND")
            .with_header("destination", destination)
            .with_header("content-type", "application/json;charset=UTF-8")
            .with_header("content-length", len)
            .with_body(body)
    }

    pub fn disconnect() -> Self {
        Self::new("DISCONNECT")
    }

    /// First value of a header.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.command.len() + self.body.len() + 64);
        out.push_str(&self.command);
        out.push('\n');
        for (key, value) in &self.headers {
            out.push_str(key);
            out.push(':');
            out.push_str(value);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Decode one frame. Heartbeats (bare newlines) decode to `None`.
    pub fn decode(raw: &str) -> Result<Option<Self>, TransportError> {
        let raw = raw.trim_start_matches(['\r', '\n']);
        let raw = match raw.find('\0') {
            Some(end) => &raw[..end],
            None => raw,
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }

        let (head, body) = match raw.find("\n\n") {
            Some(split) => (&raw[..split], &raw[split + 2..]),
            None => match raw.find("\r\n\r\n") {
                Some(split) => (&raw[..split], &raw[split + 4..]),
                None => (raw, ""),
            },
        };

        let mut lines = head.lines();
        let command = lines
            .next()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| TransportError::MalformedFrame("missing command".into()))?
            .to_string();

        let mut headers = Vec::new();
        for line in lines {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let (key, value) = line.split_once(':').ok_or_else(|| {
                TransportError::MalformedFrame(format!("header without ':' in {command}: {line}"))
            })?;
            headers.push((key.to_string(), value.to_string()));
        }

        Ok(Some(Self {
            command,
            headers,
            body: body.to_string(),
        }))
    }
}

use std::collections::HashMap;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::endpoints::HttpMethod;
use crate::endpoints::HttpRequest;
use crate::error::RemoteError;

/// Empty `api_type=json` envelope, what the service answers to a bare POST.
pub const EMPTY_ENVELOPE: &str = r#"{"json": {"errors": [], "data": {"things": []}}}"#;

/// Transport to the remote comment service. Returns the raw response body.
pub trait CommentService {
    fn name(&self) -> &'static str;

    fn send(&mut self, request: &HttpRequest) -> Result<String, RemoteError>;
}

/// Answers from a queue of canned responses per endpoint and remembers what was sent.
#[derive(Debug, Default)]
pub struct ScriptedCommentService {
    responses: HashMap<String, VecDeque<Result<String, RemoteError>>>,
    sent: Vec<HttpRequest>,
}

impl ScriptedCommentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `response` for the next request whose [`HttpRequest::endpoint`] is `endpoint`.
    pub fn script(
        &mut self,
        endpoint: impl Into<String>,
        response: Result<String, RemoteError>,
    ) -> &mut Self {
        self.responses
            .entry(endpoint.into())
            .or_default()
            .push_back(response);
        self
    }

    pub fn sent(&self) -> &[HttpRequest] {
        &self.sent
    }
}

impl CommentService for ScriptedCommentService {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn send(&mut self, request: &HttpRequest) -> Result<String, RemoteError> {
        self.sent.push(request.clone());
        let endpoint = request.endpoint().to_string();
        match self
            .responses
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front)
        {
            Some(response) => response,
            None if request.method == HttpMethod::Post => Ok(EMPTY_ENVELOPE.to_string()),
            None => Err(RemoteError::Unscripted(endpoint)),
        }
    }
}

/// Serves responses from JSON files in a directory.
///
/// A thread fetch for `abc` reads `abc.json`; a missing file answers 404. A POST to an
/// endpoint reads `<endpoint>.json` (e.g. `morechildren.json`) when present and otherwise
/// answers with an empty envelope.
#[derive(Debug, Clone)]
pub struct FixtureCommentService {
    root: PathBuf,
}

impl FixtureCommentService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, path: PathBuf) -> Result<Option<String>, RemoteError> {
        match fs::read_to_string(&path) {
            Ok(body) => Ok(Some(body)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(RemoteError::Io { path, source }),
        }
    }
}

impl CommentService for FixtureCommentService {
    fn name(&self) -> &'static str {
        "fixture"
    }

    fn send(&mut self, request: &HttpRequest) -> Result<String, RemoteError> {
        let path = self.root.join(format!("{}.json", request.endpoint()));
        log::debug!("{:?} {} -> {}", request.method, request.url, path.display());
        let body = self.read(path)?;
        match (request.method, body) {
            (_, Some(body)) => Ok(body),
            (HttpMethod::Get, None) => Err(RemoteError::status(404)),
            (HttpMethod::Post, None) => Ok(EMPTY_ENVELOPE.to_string()),
        }
    }
}

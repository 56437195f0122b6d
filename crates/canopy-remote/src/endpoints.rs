//! Mapping from engine requests to the remote service's HTTP endpoints.

use canopy_core::RemoteRequest;

pub const API_ROOT: &str = "https://api.reddit.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    /// Builds the wire request. Every POST carries the viewer's modhash as `uh` when one
    /// is configured.
    pub fn for_request(request: &RemoteRequest, user_hash: Option<&str>) -> Self {
        let (endpoint, mut form): (&str, Vec<(&str, String)>) = match request {
            RemoteRequest::FetchThread { thread_id } => {
                return Self {
                    method: HttpMethod::Get,
                    url: format!("{API_ROOT}/comments/{thread_id}.json"),
                    form: Vec::new(),
                };
            }
            RemoteRequest::Vote { id, dir } => {
                ("vote", vec![("id", id.to_string()), ("dir", dir.to_string())])
            }
            RemoteRequest::Save { id } => ("save", vec![("id", id.to_string())]),
            RemoteRequest::Unsave { id } => ("unsave", vec![("id", id.to_string())]),
            RemoteRequest::Delete { id } => ("del", vec![("id", id.to_string())]),
            RemoteRequest::Report { id } => ("report", vec![("thing_id", id.to_string())]),
            RemoteRequest::Edit { id, text } => (
                "editusertext",
                vec![
                    ("api_type", "json".to_string()),
                    ("thing_id", id.to_string()),
                    ("text", text.clone()),
                ],
            ),
            RemoteRequest::Reply { parent, text } => (
                "comment",
                vec![
                    ("api_type", "json".to_string()),
                    ("parent", parent.to_string()),
                    ("text", text.clone()),
                ],
            ),
            RemoteRequest::MoreChildren { link, children } => (
                "morechildren",
                vec![
                    ("api_type", "json".to_string()),
                    ("link_id", link.to_string()),
                    ("children", children.join(",")),
                ],
            ),
        };
        if let Some(hash) = user_hash.filter(|hash| !hash.is_empty()) {
            form.insert(0, ("uh", hash.to_string()));
        }
        Self {
            method: HttpMethod::Post,
            url: format!("{API_ROOT}/api/{endpoint}"),
            form: form
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        }
    }

    /// Last path segment without a `.json` suffix, e.g. `vote` or the thread id.
    pub fn endpoint(&self) -> &str {
        let last = self.url.rsplit('/').next().unwrap_or_default();
        last.strip_suffix(".json").unwrap_or(last)
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use canopy_core::Fullname;
    use canopy_core::ThreadId;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn votes_post_the_direction_and_modhash() {
        let request = HttpRequest::for_request(
            &RemoteRequest::Vote {
                id: Fullname::comment("c1"),
                dir: -1,
            },
            Some("hash"),
        );
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://api.reddit.com/api/vote");
        assert_eq!(
            request.form,
            vec![
                ("uh".to_string(), "hash".to_string()),
                ("id".to_string(), "t1_c1".to_string()),
                ("dir".to_string(), "-1".to_string()),
            ]
        );
    }

    #[test]
    fn save_and_unsave_use_their_own_endpoints() {
        let id = Fullname::comment("c1");
        let save = HttpRequest::for_request(&RemoteRequest::Save { id: id.clone() }, None);
        let unsave = HttpRequest::for_request(&RemoteRequest::Unsave { id }, None);
        assert_eq!(save.endpoint(), "save");
        assert_eq!(unsave.endpoint(), "unsave");
        assert_eq!(save.field("uh"), None);
    }

    #[test]
    fn thread_fetch_is_a_plain_get() {
        let request = HttpRequest::for_request(
            &RemoteRequest::FetchThread {
                thread_id: ThreadId::new("abc"),
            },
            Some("hash"),
        );
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "https://api.reddit.com/comments/abc.json");
        assert_eq!(request.endpoint(), "abc");
        assert!(request.form.is_empty());
    }

    #[test]
    fn more_children_joins_the_ids() {
        let request = HttpRequest::for_request(
            &RemoteRequest::MoreChildren {
                link: Fullname::link("abc"),
                children: vec!["d".to_string(), "e".to_string()],
            },
            None,
        );
        assert_eq!(request.field("link_id"), Some("t3_abc"));
        assert_eq!(request.field("children"), Some("d,e"));
    }
}

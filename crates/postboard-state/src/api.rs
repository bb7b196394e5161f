//! Remote post source: the endpoint catalogue, response decoding and the
//! transport seam that front-ends implement.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::model::{Comment, Post};
use crate::store::Operation;

pub const DEFAULT_API_BASE: &str = "https://dummyjson.com";

/// Characters escaped in a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{0}")]
    Network(String),
    #[error("request failed with HTTP status {0}")]
    Status(u16),
    #[error("failed to decode response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    AllPosts,
    Post(u64),
    Comments(u64),
    Search(String),
    Tag(String),
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Self::AllPosts => "/posts".to_string(),
            Self::Post(id) => format!("/posts/{id}"),
            Self::Comments(id) => format!("/posts/{id}/comments"),
            Self::Search(_) => "/posts/search".to_string(),
            Self::Tag(tag) => format!("/posts/tag/{}", utf8_percent_encode(tag, PATH_SEGMENT)),
        }
    }

    /// Query pair for endpoints that take one. Transports encode it.
    pub fn query(&self) -> Option<(&'static str, &str)> {
        match self {
            Self::Search(term) => Some(("q", term.as_str())),
            _ => None,
        }
    }

    pub fn url(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.path())
    }
}

/// Transport used by the store operations. `get` returns the body of a
/// success response.
#[allow(async_fn_in_trait)]
pub trait PostSource {
    async fn get(&self, endpoint: &Endpoint) -> Result<String, FetchError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Posts(Vec<Post>),
    Post(Post),
    Comments(Vec<Comment>),
}

#[derive(Deserialize)]
struct PostsEnvelope {
    #[serde(default)]
    posts: Vec<Post>,
}

#[derive(Deserialize)]
struct CommentsEnvelope {
    #[serde(default)]
    comments: Vec<Comment>,
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))
}

pub fn decode_posts(body: &str) -> Result<Vec<Post>, FetchError> {
    decode::<PostsEnvelope>(body).map(|envelope| envelope.posts)
}

pub fn decode_post(body: &str) -> Result<Post, FetchError> {
    decode(body)
}

pub fn decode_comments(body: &str) -> Result<Vec<Comment>, FetchError> {
    decode::<CommentsEnvelope>(body).map(|envelope| envelope.comments)
}

/// Issues the request behind `op` and decodes the response into the payload
/// the store expects for it.
pub async fn fetch<S: PostSource>(source: &S, op: &Operation) -> Result<Payload, FetchError> {
    let endpoint = op.endpoint();
    debug!(path = %endpoint.path(), kind = ?op.kind(), "fetching");
    let body = source.get(&endpoint).await?;

    match op {
        Operation::FetchAll | Operation::Search(_) | Operation::FilterByTag(_) => {
            decode_posts(&body).map(Payload::Posts)
        }
        Operation::FetchById(_) => decode_post(&body).map(Payload::Post),
        Operation::FetchComments(_) => decode_comments(&body).map(Payload::Comments),
    }
}

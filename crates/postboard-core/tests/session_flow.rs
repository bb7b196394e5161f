use std::cell::RefCell;

use postboard_core::cli::Command;
use postboard_core::commands::Session;
use postboard_core::config::Config;
use postboard_core::render::Renderer;
use postboard_core::storage::FileStore;
use postboard_state::detail::load_local_comments;
use postboard_state::{Endpoint, FetchError, PostSource};
use tempfile::tempdir;

struct FakeSource {
    requested: RefCell<Vec<String>>,
}

impl FakeSource {
    fn new() -> Self {
        Self {
            requested: RefCell::new(vec![]),
        }
    }
}

impl PostSource for FakeSource {
    async fn get(&self, endpoint: &Endpoint) -> Result<String, FetchError> {
        let path = endpoint.path();
        self.requested.borrow_mut().push(path.clone());
        match endpoint {
            Endpoint::AllPosts => Ok(r#"{"posts":[{"id":1,"title":"Hello","body":"world","tags":["a","b"]},{"id":2,"title":"Again","body":"more","tags":["c"]}]}"#.to_string()),
            Endpoint::Post(1) => Ok(r#"{"id":1,"title":"Hello","body":"world","tags":["a","b"]}"#.to_string()),
            Endpoint::Comments(1) => Ok(r#"{"comments":[]}"#.to_string()),
            Endpoint::Post(2) => Ok(r#"{"id":2,"title":"Again","body":"more","tags":["c"]}"#.to_string()),
            Endpoint::Post(_) => Err(FetchError::Status(404)),
            _ => Err(FetchError::Network("unreachable host".to_string())),
        }
    }
}

fn renderer() -> Renderer {
    let mut cfg = Config::defaults();
    cfg.apply_overrides(vec![("color".to_string(), "off".to_string())]);
    Renderer::new(&cfg).expect("renderer")
}

#[tokio::test(flavor = "current_thread")]
async fn comment_then_show_keeps_local_comment() {
    let temp = tempdir().expect("tempdir");
    let storage = FileStore::open(temp.path()).expect("open store");
    let source = FakeSource::new();
    let mut renderer = renderer();
    let mut session = Session::new(&source, &storage, &mut renderer);

    session
        .run(Command::Comment {
            post: 1,
            text: vec!["first".into(), "thoughts".into()],
        })
        .await
        .expect("comment");
    session
        .run(Command::Show { post: "/blog/1".into() })
        .await
        .expect("show");

    let local = load_local_comments(&storage, 1).expect("load");
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].body, "first thoughts");
    assert_eq!(local[0].author(), "You");
    assert!(session.store.selected().is_none());
    assert_eq!(
        *source.requested.borrow(),
        vec!["/posts/1".to_string(), "/posts/1/comments".to_string()]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn short_search_is_held_locally() {
    let temp = tempdir().expect("tempdir");
    let storage = FileStore::open(temp.path()).expect("open store");
    let source = FakeSource::new();
    let mut renderer = renderer();
    let mut session = Session::new(&source, &storage, &mut renderer);

    session
        .run(Command::Search { term: "abc".into() })
        .await
        .expect("held search is not an error");
    assert!(source.requested.borrow().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn failures_surface_the_store_error() {
    let temp = tempdir().expect("tempdir");
    let storage = FileStore::open(temp.path()).expect("open store");
    let source = FakeSource::new();
    let mut renderer = renderer();
    let mut session = Session::new(&source, &storage, &mut renderer);

    let err = session
        .run(Command::Tag { tag: "history".into() })
        .await
        .expect_err("tag request fails");
    assert_eq!(err.to_string(), "Error: unreachable host");

    let err = session
        .run(Command::Show { post: "99".into() })
        .await
        .expect_err("missing post");
    assert!(err.to_string().contains("404"));
}

#[tokio::test(flavor = "current_thread")]
async fn open_routes_paths_to_views() {
    let temp = tempdir().expect("tempdir");
    let storage = FileStore::open(temp.path()).expect("open store");
    let source = FakeSource::new();
    let mut renderer = renderer();
    let mut session = Session::new(&source, &storage, &mut renderer);

    session
        .run(Command::Open { path: "/home".into() })
        .await
        .expect("home");
    assert_eq!(session.store.posts().len(), 2);

    assert!(session
        .run(Command::Open { path: "/settings".into() })
        .await
        .is_err());
}

#[tokio::test(flavor = "current_thread")]
async fn show_still_prints_post_when_comments_fail() {
    let temp = tempdir().expect("tempdir");
    let storage = FileStore::open(temp.path()).expect("open store");
    let source = FakeSource::new();
    let mut renderer = renderer();
    let mut session = Session::new(&source, &storage, &mut renderer);

    session
        .run(Command::Show { post: "2".into() })
        .await
        .expect("post shown without comments");
    assert_eq!(
        *source.requested.borrow(),
        vec!["/posts/2".to_string(), "/posts/2/comments".to_string()]
    );
}

use std::cell::RefCell;
use std::collections::HashMap;

use postboard_state::api::{self, Endpoint, FetchError, PostSource};
use postboard_state::detail::{DetailState, MemoryStore};
use postboard_state::list::{ListState, tag_universe};
use postboard_state::router::{NavEvent, Route, Router};
use postboard_state::{OpKind, Operation, Outcome, PostStore, RequestStatus, dispatch};

#[derive(Default)]
struct ScriptedSource {
    responses: HashMap<String, Result<String, FetchError>>,
    requested: RefCell<Vec<String>>,
}

impl ScriptedSource {
    fn respond(mut self, endpoint: Endpoint, body: &str) -> Self {
        self.responses.insert(key(&endpoint), Ok(body.to_string()));
        self
    }

    fn fail(mut self, endpoint: Endpoint, err: FetchError) -> Self {
        self.responses.insert(key(&endpoint), Err(err));
        self
    }

    fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

fn key(endpoint: &Endpoint) -> String {
    match endpoint.query() {
        Some((name, value)) => format!("{}?{name}={value}", endpoint.path()),
        None => endpoint.path(),
    }
}

impl PostSource for ScriptedSource {
    async fn get(&self, endpoint: &Endpoint) -> Result<String, FetchError> {
        let key = key(endpoint);
        self.requested.borrow_mut().push(key.clone());
        self.responses
            .get(&key)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }
}

const TWO_POSTS: &str = r#"{"posts":[
    {"id":1,"title":"First","body":"one","tags":["a","b"],"reactions":{"likes":2,"dislikes":0}},
    {"id":2,"title":"Second","body":"two","tags":["b","c"],"reactions":5}
],"total":2,"skip":0,"limit":30}"#;

#[tokio::test(flavor = "current_thread")]
async fn list_view_scenario_over_remote_source() {
    let source = ScriptedSource::default().respond(Endpoint::AllPosts, TWO_POSTS);
    let mut store = PostStore::new();
    let mut list = ListState::new();

    assert!(ListState::needs_initial_fetch(&store));
    assert_eq!(dispatch(&mut store, &source, Operation::FetchAll).await, Outcome::Applied);

    let universe: Vec<String> = tag_universe(store.posts()).into_iter().collect();
    assert_eq!(universe, vec!["a", "b", "c"]);

    list.toggle_tag("a");
    let ids: Vec<u64> = list.visible_posts(store.posts()).iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1]);

    list.toggle_tag("c");
    let ids: Vec<u64> = list.visible_posts(store.posts()).iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2]);

    list.toggle_tag("a");
    let op = list.toggle_tag("c").expect("empty selection refetches");
    assert_eq!(dispatch(&mut store, &source, op).await, Outcome::Applied);
    assert_eq!(list.visible_posts(store.posts()).len(), 2);
    assert_eq!(source.requested(), vec!["/posts", "/posts"]);
}

#[tokio::test(flavor = "current_thread")]
async fn short_search_terms_never_reach_the_source() {
    let source = ScriptedSource::default()
        .respond(Endpoint::AllPosts, TWO_POSTS)
        .respond(Endpoint::Search("love".into()), r#"{"posts":[{"id":9,"title":"love","body":""}]}"#);
    let mut store = PostStore::new();
    let mut list = ListState::new();

    for text in ["l", "lo", "lov"] {
        assert_eq!(list.on_search_input(text), None);
    }
    assert!(source.requested().is_empty());

    let op = list.on_search_input("love").expect("search issued");
    dispatch(&mut store, &source, op).await;
    assert_eq!(store.posts()[0].id, 9);

    let op = list.on_search_input("").expect("cleared box refetches");
    dispatch(&mut store, &source, op).await;
    assert_eq!(store.posts().len(), 2);
    assert_eq!(source.requested(), vec!["/posts/search?q=love", "/posts"]);
}

#[tokio::test(flavor = "current_thread")]
async fn detail_mount_fetches_post_comments_and_local_history() {
    let source = ScriptedSource::default()
        .respond(Endpoint::Post(1), r#"{"id":1,"title":"First","body":"one","tags":["a"]}"#)
        .respond(
            Endpoint::Comments(1),
            r#"{"comments":[{"id":11,"body":"api says hi","postId":1,"user":{"id":3,"username":"kim"}}]}"#,
        );
    let storage = MemoryStore::new();
    let mut store = PostStore::new();

    let (mut detail, ops) = DetailState::mount(1, &storage).expect("mount");
    for op in ops {
        assert_eq!(dispatch(&mut store, &source, op).await, Outcome::Applied);
    }

    detail.draft = "local reply".into();
    detail.submit(&storage, chrono::Utc::now()).expect("submit");
    store.clear_selected();

    let (detail, ops) = DetailState::mount(1, &storage).expect("remount");
    for op in ops {
        dispatch(&mut store, &source, op).await;
    }
    let api_comments = store.selected().map(|p| p.comments.clone()).unwrap_or_default();
    let authors: Vec<String> = detail
        .displayed_comments(&api_comments)
        .iter()
        .map(|c| c.author().to_string())
        .collect();
    assert_eq!(authors, vec!["kim", "You"]);
}

#[tokio::test(flavor = "current_thread")]
async fn failed_comments_leave_post_intact() {
    let source = ScriptedSource::default()
        .respond(Endpoint::Post(4), r#"{"id":4,"title":"t","body":"b"}"#)
        .fail(Endpoint::Comments(4), FetchError::Network("connection reset".into()));
    let mut store = PostStore::new();

    dispatch(&mut store, &source, Operation::FetchById(4)).await;
    assert_eq!(dispatch(&mut store, &source, Operation::FetchComments(4)).await, Outcome::Failed);

    assert_eq!(store.detail_status().status, RequestStatus::Succeeded);
    assert_eq!(
        store.slot(OpKind::FetchComments).error.as_deref(),
        Some("connection reset")
    );
    assert_eq!(store.selected().map(|p| p.id), Some(4));
}

#[tokio::test(flavor = "current_thread")]
async fn response_for_a_post_left_behind_is_dropped() {
    let source = ScriptedSource::default()
        .respond(Endpoint::Post(1), r#"{"id":1,"title":"old","body":""}"#)
        .respond(Endpoint::Post(2), r#"{"id":2,"title":"new","body":""}"#);
    let mut store = PostStore::new();
    let mut router = Router::new("/blog/1");

    let slow = store.begin(Operation::FetchById(1));
    let slow_result = api::fetch(&source, slow.operation()).await;

    router.handle(NavEvent::LinkActivated("/blog/2".into()));
    assert_eq!(router.route(), Route::Post(2));
    store.clear_selected();
    dispatch(&mut store, &source, Operation::FetchById(2)).await;

    assert_eq!(store.complete(slow, slow_result), Outcome::Stale);
    assert_eq!(store.selected().map(|p| p.title.as_str()), Some("new"));
}

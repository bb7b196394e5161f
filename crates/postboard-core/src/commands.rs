use std::collections::BTreeSet;

use anyhow::{Context, anyhow, bail};
use chrono::Utc;
use postboard_state::detail::{DetailState, KeyValueStore};
use postboard_state::list::{ListState, SearchIntent, tag_universe};
use postboard_state::router::{Route, path_of};
use postboard_state::{OpKind, Operation, Outcome, PostSource, PostStore, RequestStatus, dispatch};
use tracing::{debug, info, warn};

use crate::cli::Command;
use crate::render::Renderer;

pub struct Session<'a, S, K: ?Sized> {
    pub store: PostStore,
    pub source: &'a S,
    pub storage: &'a K,
    pub renderer: &'a mut Renderer,
}

impl<'a, S, K> Session<'a, S, K>
where
    S: PostSource,
    K: KeyValueStore + ?Sized,
{
    pub fn new(source: &'a S, storage: &'a K, renderer: &'a mut Renderer) -> Self {
        Self {
            store: PostStore::new(),
            source,
            storage,
            renderer,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn run(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::List { tags } => self.list(tags).await,
            Command::Search { term } => self.search(&term).await,
            Command::Tag { tag } => self.tag(&tag).await,
            Command::Tags => self.tags().await,
            Command::Show { post } => {
                let id = parse_post_ref(&post)?;
                self.show(id).await
            }
            Command::Comment { post, text } => self.comment(post, &text.join(" ")),
            Command::Open { path } => match Route::parse(path_of(&path)) {
                Some(Route::Home) => self.list(vec![]).await,
                Some(Route::Post(id)) => self.show(id).await,
                None => bail!("no view for path: {path}"),
            },
        }
    }

    async fn list(&mut self, tags: Vec<String>) -> anyhow::Result<()> {
        self.load(Operation::FetchAll).await?;

        let mut state = ListState::new();
        for tag in tags {
            state.toggle_tag(&tag);
        }
        let visible = state.visible_posts(self.store.posts());
        info!(loaded = self.store.posts().len(), visible = visible.len(), "listing posts");
        self.renderer.print_post_table(&visible)
    }

    async fn search(&mut self, term: &str) -> anyhow::Result<()> {
        let Some(op) = SearchIntent::from_input(term).into_operation() else {
            return self
                .renderer
                .print_notice("search terms need more than three characters");
        };
        self.load(op).await?;
        self.renderer.print_post_table(self.store.posts())
    }

    async fn tag(&mut self, tag: &str) -> anyhow::Result<()> {
        self.load(Operation::FilterByTag(tag.to_string())).await?;
        self.renderer.print_post_table(self.store.posts())
    }

    async fn tags(&mut self) -> anyhow::Result<()> {
        self.load(Operation::FetchAll).await?;
        let universe: BTreeSet<String> = tag_universe(self.store.posts());
        self.renderer.print_tags(&universe)
    }

    async fn show(&mut self, id: u64) -> anyhow::Result<()> {
        let (detail, ops) = DetailState::mount(id, self.storage)
            .with_context(|| format!("failed to load local comments for post {id}"))?;
        let [post_op, comments_op] = ops;
        self.load(post_op).await?;
        if let Err(error) = self.load(comments_op).await {
            warn!(post_id = id, %error, "comments unavailable");
            self.renderer
                .print_notice(&format!("comments unavailable: {error}"))?;
        }

        let Some(post) = self.store.selected() else {
            bail!("Post not found");
        };
        let comments = detail.displayed_comments(&post.comments);
        let post = post.clone();
        self.store.clear_selected();
        self.renderer.print_post_detail(&post, &comments)
    }

    fn comment(&mut self, id: u64, text: &str) -> anyhow::Result<()> {
        let (mut detail, _) = DetailState::mount(id, self.storage)
            .with_context(|| format!("failed to load local comments for post {id}"))?;
        detail.draft = text.to_string();

        match detail
            .submit(self.storage, Utc::now())
            .with_context(|| format!("failed to store comment for post {id}"))?
        {
            Some(comment) => self.renderer.print_comment(&comment),
            None => self.renderer.print_notice("empty comment ignored"),
        }
    }

    async fn load(&mut self, op: Operation) -> anyhow::Result<()> {
        let kind = op.kind();
        let outcome = dispatch(&mut self.store, self.source, op).await;
        debug!(?kind, ?outcome, "operation finished");

        let slot = self.store.slot(kind);
        match (outcome, slot.status) {
            (Outcome::Failed, _) | (_, RequestStatus::Failed) => Err(anyhow!(
                "Error: {}",
                slot.error.unwrap_or_else(|| "request failed".to_string())
            )),
            _ if kind == OpKind::FetchById && self.store.selected().is_none() => {
                Err(anyhow!("Post not found"))
            }
            _ => Ok(()),
        }
    }
}

/// Accepts a bare id or a detail path such as `/blog/12`.
pub fn parse_post_ref(raw: &str) -> anyhow::Result<u64> {
    if let Ok(id) = raw.trim().parse::<u64>() {
        return Ok(id);
    }
    match Route::parse(path_of(raw)) {
        Some(Route::Post(id)) => Ok(id),
        _ => Err(anyhow!("expected a post id or /blog/<id>, got: {raw}")),
    }
}

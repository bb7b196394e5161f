//! The post store: the loaded post list, the selected post, and one
//! request slot per operation kind.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::api::{Endpoint, FetchError, Payload};
use crate::model::{Comment, Post};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpKind {
    FetchAll,
    FetchById,
    FetchComments,
    Search,
    FilterByTag,
}

impl OpKind {
    pub const ALL: [OpKind; 5] = [
        OpKind::FetchAll,
        OpKind::FetchById,
        OpKind::FetchComments,
        OpKind::Search,
        OpKind::FilterByTag,
    ];

    pub fn target(self) -> Target {
        match self {
            OpKind::FetchAll | OpKind::Search | OpKind::FilterByTag => Target::Posts,
            OpKind::FetchById => Target::Selected,
            OpKind::FetchComments => Target::Comments,
        }
    }
}

/// The piece of store state an operation overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Target {
    Posts,
    Selected,
    Comments,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    FetchAll,
    FetchById(u64),
    FetchComments(u64),
    Search(String),
    FilterByTag(String),
}

impl Operation {
    pub fn kind(&self) -> OpKind {
        match self {
            Operation::FetchAll => OpKind::FetchAll,
            Operation::FetchById(_) => OpKind::FetchById,
            Operation::FetchComments(_) => OpKind::FetchComments,
            Operation::Search(_) => OpKind::Search,
            Operation::FilterByTag(_) => OpKind::FilterByTag,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            Operation::FetchAll => Endpoint::AllPosts,
            Operation::FetchById(id) => Endpoint::Post(*id),
            Operation::FetchComments(id) => Endpoint::Comments(*id),
            Operation::Search(term) => Endpoint::Search(term.clone()),
            Operation::FilterByTag(tag) => Endpoint::Tag(tag.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpSlot {
    pub status: RequestStatus,
    pub error: Option<String>,
}

/// Handed out by [`PostStore::begin`]; must be passed back to
/// [`PostStore::complete`] with the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    op: Operation,
    generation: u64,
}

impl Ticket {
    pub fn operation(&self) -> &Operation {
        &self.op
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Failed,
    /// A newer request for the same target was issued after this one.
    Stale,
    /// Comments arrived for a post that is no longer selected.
    Discarded,
}

#[derive(Debug, Clone, Default)]
pub struct PostStore {
    posts: Vec<Post>,
    selected: Option<Post>,
    slots: BTreeMap<OpKind, OpSlot>,
    generations: BTreeMap<Target, u64>,
    last_list_op: Option<OpKind>,
    loading_post: Option<u64>,
    early_comments: Option<(u64, Vec<Comment>)>,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn selected(&self) -> Option<&Post> {
        self.selected.as_ref()
    }

    pub fn slot(&self, kind: OpKind) -> OpSlot {
        self.slots.get(&kind).cloned().unwrap_or_default()
    }

    pub fn status(&self, kind: OpKind) -> RequestStatus {
        self.slot(kind).status
    }

    /// Slot of whichever list operation was begun last.
    pub fn list_status(&self) -> OpSlot {
        self.slot(self.last_list_op.unwrap_or(OpKind::FetchAll))
    }

    pub fn detail_status(&self) -> OpSlot {
        self.slot(OpKind::FetchById)
    }

    pub fn generation(&self, target: Target) -> u64 {
        self.generations.get(&target).copied().unwrap_or(0)
    }

    pub fn begin(&mut self, op: Operation) -> Ticket {
        let kind = op.kind();
        let target = kind.target();
        let generation = self.bump(target);

        let slot = self.slots.entry(kind).or_default();
        slot.status = RequestStatus::Loading;

        if target == Target::Posts {
            self.last_list_op = Some(kind);
        }
        if let Operation::FetchById(id) = op {
            self.loading_post = Some(id);
            self.early_comments = None;
        }

        trace!(?kind, generation, "request started");
        Ticket { op, generation }
    }

    pub fn complete(&mut self, ticket: Ticket, result: Result<Payload, FetchError>) -> Outcome {
        let kind = ticket.op.kind();
        let target = kind.target();

        if ticket.generation != self.generation(target) {
            debug!(
                ?kind,
                generation = ticket.generation,
                latest = self.generation(target),
                "dropping stale response"
            );
            return Outcome::Stale;
        }
        if kind == OpKind::FetchById {
            self.loading_post = None;
        }

        let payload = match result {
            Ok(payload) => payload,
            Err(err) => {
                debug!(?kind, error = %err, "request failed");
                self.slots.insert(
                    kind,
                    OpSlot {
                        status: RequestStatus::Failed,
                        error: Some(err.to_string()),
                    },
                );
                return Outcome::Failed;
            }
        };

        let outcome = match (&ticket.op, payload) {
            (_, Payload::Posts(posts)) if target == Target::Posts => {
                self.posts = posts;
                Outcome::Applied
            }
            (Operation::FetchById(_), Payload::Post(mut post)) => {
                if let Some((id, comments)) = self.early_comments.take()
                    && id == post.id
                {
                    post.comments = comments;
                }
                self.selected = Some(post);
                Outcome::Applied
            }
            (Operation::FetchComments(id), Payload::Comments(comments)) => {
                match self.selected.as_mut() {
                    Some(post) if post.id == *id => {
                        post.comments = comments;
                        Outcome::Applied
                    }
                    // The post itself is still on its way.
                    _ if self.loading_post == Some(*id) => {
                        self.early_comments = Some((*id, comments));
                        Outcome::Applied
                    }
                    _ => Outcome::Discarded,
                }
            }
            (op, payload) => {
                let err = FetchError::Parse(format!(
                    "unexpected payload for {:?}: {}",
                    op.kind(),
                    payload_name(&payload)
                ));
                self.slots.insert(
                    kind,
                    OpSlot {
                        status: RequestStatus::Failed,
                        error: Some(err.to_string()),
                    },
                );
                return Outcome::Failed;
            }
        };

        self.slots.insert(
            kind,
            OpSlot {
                status: RequestStatus::Succeeded,
                error: None,
            },
        );
        trace!(?kind, ?outcome, "request completed");
        outcome
    }

    /// Drops the selected post and resets the detail slots to idle. In-flight
    /// detail and comment responses become stale.
    pub fn clear_selected(&mut self) {
        self.selected = None;
        self.slots.remove(&OpKind::FetchById);
        self.slots.remove(&OpKind::FetchComments);
        self.loading_post = None;
        self.early_comments = None;
        self.bump(Target::Selected);
        self.bump(Target::Comments);
    }

    fn bump(&mut self, target: Target) -> u64 {
        let generation = self.generations.entry(target).or_insert(0);
        *generation += 1;
        *generation
    }
}

fn payload_name(payload: &Payload) -> &'static str {
    match payload {
        Payload::Posts(_) => "post list",
        Payload::Post(_) => "post",
        Payload::Comments(_) => "comment list",
    }
}

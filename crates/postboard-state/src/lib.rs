pub mod api;
pub mod detail;
pub mod list;
pub mod model;
pub mod router;
pub mod store;

pub use api::{DEFAULT_API_BASE, Endpoint, FetchError, Payload, PostSource};
pub use model::{Comment, Post, Reactions};
pub use store::{OpKind, Operation, Outcome, PostStore, RequestStatus};

/// Runs `op` against `source` and folds the response into `store`.
pub async fn dispatch<S: PostSource>(store: &mut PostStore, source: &S, op: Operation) -> Outcome {
    let ticket = store.begin(op);
    let result = api::fetch(source, ticket.operation()).await;
    store.complete(ticket, result)
}

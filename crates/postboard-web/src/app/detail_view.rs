use chrono::Utc;
use postboard_state::detail::DetailState;
use postboard_state::router::NavEvent;
use postboard_state::{OpKind, RequestStatus};
use web_sys::HtmlTextAreaElement;
use yew::{
    Callback, Html, InputEvent, MouseEvent, Properties, TargetCast, function_component, html,
    use_effect_with, use_state,
};

use super::StoreHandle;
use crate::components::{CommentItem, ReactionsView, TagBadges};
use crate::storage::BrowserStore;

#[derive(Properties, PartialEq)]
pub struct DetailViewProps {
    pub id: u64,
    pub store: StoreHandle,
    pub on_navigate: Callback<NavEvent>,
}

#[function_component(DetailView)]
pub fn detail_view(props: &DetailViewProps) -> Html {
    let detail = use_state(|| DetailState::new(props.id));
    let submit_error = use_state(|| None::<String>);

    {
        let store = props.store.clone();
        let detail = detail.clone();
        use_effect_with(props.id, move |id| {
            let id = *id;
            let ops = match DetailState::mount(id, &BrowserStore) {
                Ok((state, ops)) => {
                    detail.set(state);
                    ops
                }
                Err(error) => {
                    tracing::error!(%error, post_id = id, "failed loading local comments");
                    DetailState::requests(id)
                }
            };
            for op in ops {
                store.dispatch(op);
            }

            move || store.clear_selected()
        });
    }

    let on_back = {
        let on_navigate = props.on_navigate.clone();
        Callback::from(move |_: MouseEvent| {
            on_navigate.emit(NavEvent::LinkActivated("/".to_string()));
        })
    };

    let on_draft = {
        let detail = detail.clone();
        Callback::from(move |e: InputEvent| {
            let mut next = (*detail).clone();
            next.draft = e.target_unchecked_into::<HtmlTextAreaElement>().value();
            detail.set(next);
        })
    };

    let on_submit = {
        let detail = detail.clone();
        let submit_error = submit_error.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = (*detail).clone();
            match next.submit(&BrowserStore, Utc::now()) {
                Ok(Some(comment)) => {
                    tracing::info!(comment_id = comment.id, "comment saved locally");
                    detail.set(next);
                    submit_error.set(None);
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::error!(%error, "failed saving comment");
                    submit_error.set(Some(error.to_string()));
                }
            }
        })
    };

    let store = props.store.read();
    let slot = store.detail_status();

    let body = match (slot.status, store.selected()) {
        (RequestStatus::Idle | RequestStatus::Loading, _) => {
            html! { <div class="loading">{ "Loading post..." }</div> }
        }
        (RequestStatus::Failed, _) => {
            html! { <div class="error">{ format!("Error: {}", slot.error.unwrap_or_default()) }</div> }
        }
        (RequestStatus::Succeeded, None) => html! { <div>{ "Post not found" }</div> },
        (RequestStatus::Succeeded, Some(post)) => {
            let comments = detail.displayed_comments(&post.comments);
            let comments_slot = store.slot(OpKind::FetchComments);

            html! {
                <>
                    <div class="card detail">
                        <h1>{ &post.title }</h1>
                        <div class="detail-meta">
                            <TagBadges tags={post.tags.clone()} />
                            <ReactionsView reactions={post.reactions} />
                        </div>
                        <div class="post-content">
                            <p>{ &post.body }</p>
                        </div>
                    </div>

                    <div class="card">
                        <h3>{ "💬 Comments" }</h3>
                        {
                            if let Some(error) = comments_slot.error {
                                html! { <p class="error">{ format!("Error: {error}") }</p> }
                            } else {
                                html! {}
                            }
                        }
                        {
                            if comments.is_empty() {
                                html! { <p>{ "No comments yet." }</p> }
                            } else {
                                html! {
                                    <div class="comments-list">
                                        {
                                            for comments.into_iter().map(|comment| {
                                                let key = comment.id.to_string();
                                                html! { <CommentItem {key} {comment} /> }
                                            })
                                        }
                                    </div>
                                }
                            }
                        }
                    </div>

                    <div class="card">
                        <h4>{ "Add a Comment" }</h4>
                        <textarea
                            rows="3"
                            placeholder="Write your comment here..."
                            value={detail.draft.clone()}
                            oninput={on_draft}
                        />
                        {
                            match &*submit_error {
                                Some(error) => html! { <p class="error">{ error }</p> },
                                None => html! {},
                            }
                        }
                        <button class="btn primary" onclick={on_submit}>{ "Submit Comment" }</button>
                    </div>
                </>
            }
        }
    };

    html! {
        <div class="blog-post-container">
            <button class="btn small" onclick={on_back}>{ "Back" }</button>
            { body }
        </div>
    }
}

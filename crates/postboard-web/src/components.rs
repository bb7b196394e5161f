use std::collections::BTreeSet;

use postboard_state::model::{Comment, Post, Reactions, placeholder_image};
use web_sys::HtmlImageElement;
use yew::{Callback, Html, Properties, TargetCast, classes, function_component, html};

const CARD_TITLE_CHARS: usize = 30;
const CARD_BODY_CHARS: usize = 50;

#[derive(Properties, PartialEq)]
pub struct ReactionsProps {
    pub reactions: Reactions,
}

#[function_component(ReactionsView)]
pub fn reactions_view(props: &ReactionsProps) -> Html {
    html! {
        <div class="reactions">
            <span class="likes">{ format!("👍 {}", props.reactions.likes()) }</span>
            {
                match props.reactions.dislikes() {
                    Some(dislikes) => html! { <span class="dislikes">{ format!("👎 {dislikes}") }</span> },
                    None => html! {},
                }
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct TagBadgesProps {
    pub tags: Vec<String>,
}

#[function_component(TagBadges)]
pub fn tag_badges(props: &TagBadgesProps) -> Html {
    if props.tags.is_empty() {
        return html! {};
    }

    html! {
        <div class="tags">
            { for props.tags.iter().map(|tag| html! { <span class="badge">{ tag }</span> }) }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct PostCardProps {
    pub post: Post,
}

#[function_component(PostCard)]
pub fn post_card(props: &PostCardProps) -> Html {
    let post = &props.post;
    let fallback = placeholder_image(post.id);
    let onerror = Callback::from(move |e: yew::Event| {
        let img: HtmlImageElement = e.target_unchecked_into();
        if img.src() != fallback {
            img.set_src(&fallback);
        }
    });
    let alt = if post.title.is_empty() {
        "Blog post thumbnail".to_string()
    } else {
        post.title.clone()
    };

    html! {
        <div class="card">
            <TagBadges tags={post.tags.clone()} />
            <h4>{ post.title_excerpt(CARD_TITLE_CHARS) }</h4>
            <img src={post.image_url()} alt={alt} height="150" {onerror} />
            <p>{ post.body_excerpt(CARD_BODY_CHARS) }</p>
            <ReactionsView reactions={post.reactions} />
            <div class="card-footer">
                <a class="btn primary" href={format!("/blog/{}", post.id)}>{ "Read More" }</a>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct FilterDropdownProps {
    pub all_tags: BTreeSet<String>,
    pub selected: BTreeSet<String>,
    pub on_toggle: Callback<String>,
    pub on_close: Callback<()>,
    pub on_apply: Callback<()>,
}

#[function_component(FilterDropdown)]
pub fn filter_dropdown(props: &FilterDropdownProps) -> Html {
    let on_close = props.on_close.reform(|_: yew::MouseEvent| ());
    let on_apply = props.on_apply.reform(|_: yew::MouseEvent| ());

    html! {
        <div class="filter-dropdown">
            <div class="filter-header">
                <h6>{ "Filter by Tags" }</h6>
                <span class="icon close" onclick={on_close}>{ "✕" }</span>
            </div>
            <div class="tag-container">
                {
                    if props.all_tags.is_empty() {
                        html! { <p class="muted">{ "No tags available" }</p> }
                    } else {
                        html! {
                            <div class="tag-grid">
                                {
                                    for props.all_tags.iter().map(|tag| {
                                        let selected = props.selected.contains(tag);
                                        let on_toggle = props.on_toggle.clone();
                                        let value = tag.clone();
                                        html! {
                                            <div
                                                class={classes!("badge", "filter-tag", selected.then_some("selected"))}
                                                onclick={move |_| on_toggle.emit(value.clone())}
                                            >
                                                { tag }
                                            </div>
                                        }
                                    })
                                }
                            </div>
                        }
                    }
                }
            </div>
            {
                if props.selected.is_empty() {
                    html! {}
                } else {
                    html! {
                        <div class="selected-tags">
                            <p>{ "Selected Tags:" }</p>
                            {
                                for props.selected.iter().map(|tag| {
                                    let on_toggle = props.on_toggle.clone();
                                    let value = tag.clone();
                                    html! {
                                        <span class="badge selected">
                                            { tag }
                                            <span class="remove" onclick={move |_| on_toggle.emit(value.clone())}>{ "×" }</span>
                                        </span>
                                    }
                                })
                            }
                        </div>
                    }
                }
            }
            <button class="btn primary wide" onclick={on_apply}>{ "Apply Filter" }</button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct CommentItemProps {
    pub comment: Comment,
}

#[function_component(CommentItem)]
pub fn comment_item(props: &CommentItemProps) -> Html {
    let comment = &props.comment;
    html! {
        <div class="comment">
            <div class="comment-author">
                <span class="icon">{ "👤" }</span>
                <strong>{ comment.author() }</strong>
            </div>
            <p>{ &comment.body }</p>
        </div>
    }
}

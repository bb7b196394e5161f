use std::rc::Rc;

use gloo::events::EventListener;
use postboard_state::list::{ListState, tag_universe};
use postboard_state::{Operation, RequestStatus};
use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, KeyboardEvent, Node};
use yew::{
    Callback, Html, InputEvent, Properties, TargetCast, classes, function_component, html,
    use_effect_with, use_node_ref, use_state,
};

use super::StoreHandle;
use crate::components::{FilterDropdown, PostCard};

#[derive(Properties, PartialEq)]
pub struct ListViewProps {
    pub store: StoreHandle,
}

#[function_component(ListView)]
pub fn list_view(props: &ListViewProps) -> Html {
    let list = use_state(ListState::new);
    let filter_ref = use_node_ref();

    {
        let store = props.store.clone();
        use_effect_with((), move |_| {
            let idle = ListState::needs_initial_fetch(&store.read());
            if idle {
                store.dispatch(Operation::FetchAll);
            }
            || ()
        });
    }

    {
        let list = list.clone();
        let filter_ref = filter_ref.clone();
        use_effect_with((*list).clone(), move |state| {
            let listener = state.popover.is_open().then(|| {
                let state = state.clone();
                EventListener::new(&gloo::utils::document(), "mousedown", move |event| {
                    let inside = match (filter_ref.get(), event.target()) {
                        (Some(container), Some(target)) => container.contains(target.dyn_ref::<Node>()),
                        _ => false,
                    };
                    let mut next = state.clone();
                    next.popover.on_pointer_down(inside);
                    if next != state {
                        list.set(next);
                    }
                })
            });
            move || drop(listener)
        });
    }

    // Applies a state transition and dispatches whatever it asks for.
    let update = {
        let list = list.clone();
        let store = props.store.clone();
        move |change: &dyn Fn(&mut ListState) -> Option<Operation>| {
            let mut next = (*list).clone();
            let op = change(&mut next);
            list.set(next);
            if let Some(op) = op {
                store.dispatch(op);
            }
        }
    };
    let update = Rc::new(update);

    let on_search = {
        let update = update.clone();
        Callback::from(move |e: InputEvent| {
            let value = e.target_unchecked_into::<HtmlInputElement>().value();
            update(&|state: &mut ListState| state.on_search_input(&value));
        })
    };

    let on_search_enter = {
        let update = update.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                let value = e.target_unchecked_into::<HtmlInputElement>().value();
                update(&|state: &mut ListState| state.on_search_input(&value));
            }
        })
    };

    let on_filter_toggle = {
        let update = update.clone();
        Callback::from(move |_: yew::MouseEvent| {
            update(&|state: &mut ListState| {
                state.popover.toggle();
                None
            });
        })
    };

    let on_close = {
        let update = update.clone();
        Callback::from(move |()| {
            update(&|state: &mut ListState| {
                state.popover.close();
                None
            });
        })
    };

    let on_toggle_tag = {
        let update = update.clone();
        Callback::from(move |tag: String| {
            update(&|state: &mut ListState| state.toggle_tag(&tag));
        })
    };

    let on_apply = {
        let update = update.clone();
        Callback::from(move |()| {
            update(&|state: &mut ListState| state.apply_filter());
        })
    };

    let store = props.store.read();
    let slot = store.list_status();
    let all_tags = tag_universe(store.posts());
    let visible = list.visible_posts(store.posts());

    if slot.status == RequestStatus::Failed {
        return html! {
            <div class="error">{ format!("Error: {}", slot.error.unwrap_or_default()) }</div>
        };
    }

    html! {
        <div class="container">
            <div class="toolbar">
                <h2>{ "Blog Posts" }</h2>
                <div class="toolbar-actions">
                    <input
                        type="text"
                        class="search"
                        placeholder="Search..."
                        value={list.search_text.clone()}
                        oninput={on_search}
                        onkeypress={on_search_enter}
                    />
                    <div class="filter-container" ref={filter_ref}>
                        <span
                            class={classes!("icon", "filter-icon", list.popover.is_open().then_some("active"))}
                            onclick={on_filter_toggle}
                        >
                            { "⛃" }
                        </span>
                        {
                            if list.popover.is_open() {
                                html! {
                                    <FilterDropdown
                                        all_tags={all_tags}
                                        selected={list.selected_tags.clone()}
                                        on_toggle={on_toggle_tag}
                                        on_close={on_close}
                                        on_apply={on_apply}
                                    />
                                }
                            } else {
                                html! {}
                            }
                        }
                    </div>
                </div>
            </div>
            <div class="grid">
                {
                    if slot.status == RequestStatus::Loading {
                        html! { <div class="spinner" /> }
                    } else if visible.is_empty() {
                        html! {
                            <div class="empty">
                                <h4>{ "No posts available" }</h4>
                                <p>{ "Try different search terms or filters" }</p>
                            </div>
                        }
                    } else {
                        html! {
                            <>
                                {
                                    for visible.into_iter().map(|post| {
                                        let key = post.id.to_string();
                                        html! { <PostCard {key} {post} /> }
                                    })
                                }
                            </>
                        }
                    }
                }
            </div>
        </div>
    }
}

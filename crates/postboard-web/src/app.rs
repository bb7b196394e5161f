mod detail_view;
mod list_view;

use std::cell::{
  Ref,
  RefCell
};
use std::rc::Rc;

use gloo::events::{
  EventListener,
  EventListenerOptions
};
use postboard_state::router::{
  NavEffect,
  NavEvent,
  Route,
  Router,
  path_of
};
use postboard_state::{
  Operation,
  Outcome,
  PostStore,
  api
};
use wasm_bindgen::{
  JsCast,
  JsValue
};
use web_sys::{
  Element,
  Event,
  MouseEvent
};
use yew::{
  Callback,
  Html,
  Reducible,
  UseReducerDispatcher,
  function_component,
  html,
  use_effect_with,
  use_force_update,
  use_memo,
  use_mut_ref,
  use_reducer
};

use crate::api::BrowserSource;
use detail_view::DetailView;
use list_view::ListView;

#[derive(Debug, Default, PartialEq)]
pub struct Revision(u64);

impl Reducible for Revision {
  type Action = ();

  fn reduce(
    self: Rc<Self>,
    _action: ()
  ) -> Rc<Self> {
    Rc::new(Self(self.0 + 1))
  }
}

/// Shared access to the post store.
/// Every mutation bumps the revision so
/// views holding a handle re-render.
#[derive(Clone)]
pub struct StoreHandle {
  store:    Rc<RefCell<PostStore>>,
  source:   Rc<BrowserSource>,
  revision: u64,
  bump:     UseReducerDispatcher<Revision>
}

impl PartialEq for StoreHandle {
  fn eq(
    &self,
    other: &Self
  ) -> bool {
    self.revision == other.revision
      && Rc::ptr_eq(
        &self.store,
        &other.store
      )
  }
}

impl StoreHandle {
  pub fn read(
    &self
  ) -> Ref<'_, PostStore> {
    self.store.borrow()
  }

  pub fn dispatch(&self, op: Operation) {
    let ticket =
      self.store.borrow_mut().begin(op);
    self.bump.dispatch(());

    let store = self.store.clone();
    let source = self.source.clone();
    let bump = self.bump.clone();

    wasm_bindgen_futures::spawn_local(
      async move {
        let kind =
          ticket.operation().kind();
        let result = api::fetch(
          source.as_ref(),
          ticket.operation()
        )
        .await;

        let outcome = store
          .borrow_mut()
          .complete(ticket, result);
        if outcome == Outcome::Stale {
          tracing::debug!(
            ?kind,
            "dropped stale response"
          );
        }
        bump.dispatch(());
      }
    );
  }

  pub fn clear_selected(&self) {
    self
      .store
      .borrow_mut()
      .clear_selected();
    self.bump.dispatch(());
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let store = use_mut_ref(PostStore::new);
  let source = use_memo((), |_| {
    BrowserSource::default()
  });
  let revision =
    use_reducer(Revision::default);
  let router = use_mut_ref(|| {
    Router::new(&current_path())
  });
  let force_update = use_force_update();

  let handle = StoreHandle {
    store:    store.clone(),
    source:   source.clone(),
    revision: revision.0,
    bump:     revision.dispatcher()
  };

  let navigate = {
    let router = router.clone();
    let force_update =
      force_update.clone();
    Callback::from(
      move |event: NavEvent| {
        let effect = router
          .borrow_mut()
          .handle(event);
        if let Some(
          NavEffect::PushHistory(path)
        ) = effect
        {
          push_history(&path);
        }
        force_update.force_update();
      }
    )
  };

  {
    let navigate = navigate.clone();
    use_effect_with((), move |_| {
      let listeners =
        listen_for_navigation(navigate);
      tracing::debug!(
        listeners = listeners.len(),
        "navigation listeners attached"
      );
      move || drop(listeners)
    });
  }

  let on_home = {
    let navigate = navigate.clone();
    Callback::from(move |_: MouseEvent| {
      navigate.emit(
        NavEvent::LinkActivated(
          "/".to_string()
        )
      )
    })
  };

  let route = router.borrow().route();

  html! {
    <div class="app">
      <header class="app-header">
        <h1 onclick={on_home}>{ "Blog App" }</h1>
      </header>
      <main>
        {
          match route {
            | Route::Home => html! {
              <ListView store={handle.clone()} />
            },
            | Route::Post(id) => html! {
              <DetailView
                key={id.to_string()}
                {id}
                store={handle.clone()}
                on_navigate={navigate.clone()}
              />
            }
          }
        }
      </main>
    </div>
  }
}

fn current_path() -> String {
  gloo::utils::window()
    .location()
    .pathname()
    .unwrap_or_else(|_| "/".to_string())
}

fn push_history(path: &str) {
  let pushed = gloo::utils::window()
    .history()
    .and_then(|history| {
      history.push_state_with_url(
        &JsValue::NULL,
        "",
        Some(path)
      )
    });
  if let Err(error) = pushed {
    tracing::error!(
      ?error,
      path,
      "failed to push history entry"
    );
  }
}

/// Link activation and history
/// navigation both feed `navigate`.
fn listen_for_navigation(
  navigate: Callback<NavEvent>
) -> Vec<EventListener> {
  let document =
    gloo::utils::document();
  let window = gloo::utils::window();

  let on_link = navigate.clone();
  let clicks =
    EventListener::new_with_options(
      &document,
      "click",
      EventListenerOptions::enable_prevent_default(),
      move |event| {
        let Some(href) =
          routable_href(event)
        else {
          return;
        };
        event.prevent_default();
        on_link.emit(
          NavEvent::LinkActivated(href)
        );
      }
    );

  let popstate = EventListener::new(
    &window,
    "popstate",
    move |_| {
      navigate.emit(
        NavEvent::HistoryPopped(
          current_path()
        )
      );
    }
  );

  vec![clicks, popstate]
}

/// The href of the anchor under a plain
/// left click, when it points at an
/// in-app view on this origin.
fn routable_href(
  event: &Event
) -> Option<String> {
  if let Some(mouse) =
    event.dyn_ref::<MouseEvent>()
    && (mouse.button() != 0
      || mouse.ctrl_key()
      || mouse.meta_key()
      || mouse.shift_key()
      || mouse.alt_key())
  {
    return None;
  }

  let target = event
    .target()?
    .dyn_into::<Element>()
    .ok()?;
  let anchor =
    target.closest("a").ok()??;
  let href =
    anchor.get_attribute("href")?;

  if href.contains("://") {
    let origin = gloo::utils::window()
      .location()
      .origin()
      .ok()?;
    if !href.starts_with(&origin) {
      return None;
    }
  }

  Route::parse(path_of(&href))?;
  Some(href)
}

//! Shared-directory browser panel.
//!
//! Holds the refresh control, the forest status line, the download failure
//! notice and the tree itself. All state lives in [`AppContext`]; the panel
//! re-renders from [`render_forest`] whenever the tree signal changes. A
//! failed refresh is rendered as an error and caught by the panel's
//! [`ErrorBoundary`].

mod tree;

use leptos::prelude::*;
use leptos_icons::Icon;
use wasm_bindgen_futures::spawn_local;

use filete_core::{
    EventOutcome, ForestStatus, ForestView, NodeEvent, NodeId, RefreshOutcome, render_forest,
};

use crate::app::AppContext;
use crate::components::icons as ic;
use tree::TreeView;

stylance::import_crate_style!(css, "src/components/browser/browser.module.css");

/// The last refresh could not list the shared directories.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Failed to load: {0}")]
pub struct ForestLoadError(pub String);

/// Run a node event in the background and surface download failures.
pub(crate) fn dispatch_event(ctx: AppContext, id: NodeId, event: NodeEvent) {
    spawn_local(async move {
        match ctx.browser().handle_event(id, event).await {
            Ok(EventOutcome::Downloaded(Err(err))) if !err.is_cancelled() => {
                ctx.show_notice(format!("Download failed: {err}"));
            }
            Ok(_) => {}
            Err(err) => log::warn!("Ignoring {:?} on {}: {}", event, id, err),
        }
    });
}

#[component]
pub fn Browser() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let tree = ctx.tree.0;

    let forest = Memo::new(move |_| tree.with(render_forest));
    let refreshing = Signal::derive(move || forest.with(|f| f.refreshing));

    let refresh = move |_: leptos::ev::MouseEvent| {
        spawn_local(async move {
            if ctx.browser().refresh().await == RefreshOutcome::Cancelled {
                log::debug!("Refresh abandoned without a session key");
            }
        });
    };

    view! {
        <section class=css::panel>
            <div class=css::toolbar>
                <h2 class=css::heading>"Shared directories"</h2>
                <button
                    class=css::refreshButton
                    on:click=refresh
                    disabled=refreshing
                    title="Reload shared directories"
                >
                    <span class=move || if refreshing.get() { css::spinning } else { "" }>
                        <Icon icon=ic::REFRESH />
                    </span>
                    <span>"Refresh"</span>
                </button>
            </div>

            <NoticeBanner />

            <ErrorBoundary fallback=|errors| view! {
                <div class=css::failure role="alert">
                    <Icon icon=ic::WARNING />
                    <ul class=css::failureList>
                        {move || errors.get()
                            .into_iter()
                            .map(|(_, e)| view! { <li>{e.to_string()}</li> })
                            .collect::<Vec<_>>()
                        }
                    </ul>
                </div>
            }>
                {move || forest_body(forest)}
            </ErrorBoundary>
        </section>
    }
}

/// Tree for a loaded forest, a placeholder otherwise.
fn forest_body(forest: Memo<ForestView>) -> Result<AnyView, ForestLoadError> {
    match forest.with(|f| f.status.clone()) {
        ForestStatus::Empty => Ok(view! {
            <p class=css::placeholder>"Press refresh to load the shared directories."</p>
        }
        .into_any()),
        ForestStatus::Failed(message) => Err(ForestLoadError(message)),
        ForestStatus::Ready => {
            let roots = forest.with(|f| f.roots.clone());
            if roots.is_empty() {
                Ok(view! { <p class=css::placeholder>"No shared directories."</p> }.into_any())
            } else {
                Ok(view! { <TreeView nodes=roots /> }.into_any())
            }
        }
    }
}

/// Download failure notice with a close button.
#[component]
fn NoticeBanner() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let notice = ctx.notice;

    move || {
        notice.get().map(|n| {
            view! {
                <div class=css::notice role="alert">
                    <Icon icon=ic::WARNING />
                    <span class=css::noticeText>{n.text}</span>
                    <button
                        class=css::noticeClose
                        on:click=move |_| ctx.dismiss_notice()
                        title="Dismiss"
                    >
                        <Icon icon=ic::CLOSE />
                    </button>
                </div>
            }
        })
    }
}

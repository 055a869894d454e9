//! Session bar component.
//!
//! Shows the session key (masked by default) with controls to reveal it and
//! to replace it.

use leptos::prelude::*;
use leptos_icons::Icon;
use wasm_bindgen_futures::spawn_local;

use filete_core::change_token;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::utils::PromptDialog;

stylance::import_crate_style!(css, "src/components/session/session.module.css");

#[component]
pub fn SessionBar() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let session = ctx.session.0;

    let display_text = Signal::derive(move || session.with(|s| s.display_text()));
    let toggle_label = Signal::derive(move || session.with(|s| s.toggle_label()));
    let is_set = Signal::derive(move || session.with(|s| s.is_set()));

    let toggle_reveal = move |_: leptos::ev::MouseEvent| {
        session.update(|s| {
            s.toggle_reveal();
        });
    };

    let change = move |_: leptos::ev::MouseEvent| {
        spawn_local(async move {
            match change_token(&ctx.session, &PromptDialog::new()).await {
                Ok(_) => {}
                Err(err) => log::debug!("Keeping the current session key: {}", err),
            }
        });
    };

    view! {
        <div class=css::bar>
            <span class=css::label>
                <span class=css::labelIcon><Icon icon=ic::KEY /></span>
                <span class=css::labelText>"Session key:"</span>
            </span>
            <span
                class=move || if is_set.get() { css::value } else { css::valueUnset }
                title="Session key"
            >
                {display_text}
            </span>
            <button
                class=css::button
                on:click=toggle_reveal
                disabled=move || !is_set.get()
                title=toggle_label
            >
                {move || if session.with(|s| s.is_revealed()) {
                    view! { <Icon icon=ic::EYE_OFF /> }.into_any()
                } else {
                    view! { <Icon icon=ic::EYE /> }.into_any()
                }}
                <span class=css::buttonText>{toggle_label}</span>
            </button>
            <button class=css::button on:click=change title="Change session key">
                <Icon icon=ic::EDIT />
                <span class=css::buttonText>"Change"</span>
            </button>
        </div>
    }
}

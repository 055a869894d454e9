//! UI components built with Leptos.
//!
//! - [`Layout`] - Page frame: header, session bar and browser panel
//! - [`browser`] - Shared-directory tree with refresh and downloads
//! - [`session`] - Session key display and controls
//! - [`icons`] - Centralized icon definitions (change theme here)

pub mod browser;
pub mod icons;
pub mod session;

use leptos::prelude::*;

use crate::config::APP_NAME;
use browser::Browser;
use session::SessionBar;

stylance::import_crate_style!(css, "src/components/layout.module.css");

/// Page frame.
#[component]
pub fn Layout() -> impl IntoView {
    view! {
        <div class=css::page>
            <header class=css::header>
                <h1 class=css::title>{APP_NAME}</h1>
                <SessionBar />
            </header>
            <main class=css::main>
                <Browser />
            </main>
        </div>
    }
}

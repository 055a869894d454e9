//! Recursive tree rendering.
//!
//! Maps [`ViewNode`]s one-to-one onto markup. Files are single clickable
//! rows; directories are a summary row plus, while open, a nested list.

use leptos::prelude::*;
use leptos_icons::Icon;

use filete_core::{ChildrenView, NodeEvent, NodeId, ViewNode};

use super::{css, dispatch_event};
use crate::app::AppContext;
use crate::components::icons as ic;
use crate::utils::format::format_size;

#[component]
pub fn TreeView(nodes: Vec<ViewNode>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    view! {
        <ul class=css::tree role="tree">
            {render_nodes(ctx, nodes)}
        </ul>
    }
}

fn render_nodes(ctx: AppContext, nodes: Vec<ViewNode>) -> AnyView {
    nodes
        .into_iter()
        .map(|node| render_node(ctx, node))
        .collect_view()
        .into_any()
}

fn render_node(ctx: AppContext, node: ViewNode) -> AnyView {
    match node {
        ViewNode::File { id, name, size } => file_row(ctx, id, name, size),
        ViewNode::Directory {
            id,
            name,
            size,
            expanded,
            children,
        } => directory_row(ctx, id, name, size, expanded, children),
        ViewNode::Invalid { name, f_type, .. } => view! {
            <li class=css::invalidRow role="treeitem">
                <Icon icon=ic::WARNING />
                <span class=css::name>{name}</span>
                <span class=css::invalidNote>{format!("unknown entry type {f_type}")}</span>
            </li>
        }
        .into_any(),
    }
}

fn file_row(ctx: AppContext, id: NodeId, name: String, size: u64) -> AnyView {
    let download = move |_: leptos::ev::MouseEvent| dispatch_event(ctx, id, NodeEvent::Activate);

    view! {
        <li class=css::fileRow role="treeitem">
            <button class=css::rowButton on:click=download title="Download">
                <span class=css::chevronSpacer></span>
                <Icon icon=ic::FILE />
                <span class=css::name>{name}</span>
                <span class=css::size>{format_size(size)}</span>
            </button>
        </li>
    }
    .into_any()
}

fn directory_row(
    ctx: AppContext,
    id: NodeId,
    name: String,
    size: u64,
    expanded: bool,
    children: ChildrenView,
) -> AnyView {
    let toggle = move |_: leptos::ev::MouseEvent| dispatch_event(ctx, id, NodeEvent::Activate);
    let archive = move |ev: leptos::ev::MouseEvent| {
        ev.stop_propagation();
        dispatch_event(ctx, id, NodeEvent::DownloadArchive);
    };

    let contents = match children {
        ChildrenView::Collapsed => None,
        ChildrenView::Loading => Some(
            view! { <li class=css::placeholderRow>"Loading..."</li> }.into_any(),
        ),
        ChildrenView::Failed(message) => Some(
            view! {
                <li class=css::failureRow role="alert">
                    <Icon icon=ic::WARNING />
                    <span>{format!("Failed to load: {message}")}</span>
                </li>
            }
            .into_any(),
        ),
        ChildrenView::Loaded(nodes) if nodes.is_empty() => Some(
            view! { <li class=css::placeholderRow>"(empty)"</li> }.into_any(),
        ),
        ChildrenView::Loaded(nodes) => Some(render_nodes(ctx, nodes)),
    };

    view! {
        <li class=css::directoryRow role="treeitem" aria-expanded=expanded.to_string()>
            <div class=css::summary>
                <button class=css::rowButton on:click=toggle>
                    <span class=css::chevron>
                        {if expanded {
                            view! { <Icon icon=ic::CHEVRON_DOWN /> }.into_any()
                        } else {
                            view! { <Icon icon=ic::CHEVRON_RIGHT /> }.into_any()
                        }}
                    </span>
                    {if expanded {
                        view! { <Icon icon=ic::FOLDER_OPEN /> }.into_any()
                    } else {
                        view! { <Icon icon=ic::FOLDER /> }.into_any()
                    }}
                    <span class=css::name>{name}</span>
                    <span class=css::size>{format_size(size)}</span>
                </button>
                <button
                    class=css::archiveButton
                    on:click=archive
                    title="Download directory as zip"
                >
                    <Icon icon=ic::DOWNLOAD />
                </button>
            </div>
            {contents.map(|contents| view! {
                <ul class=css::children role="group">{contents}</ul>
            })}
        </li>
    }
    .into_any()
}

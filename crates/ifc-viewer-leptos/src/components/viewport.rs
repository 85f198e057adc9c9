//! Viewport component - canvas wireframe view with click picking

use crate::renderer;
use crate::state::use_viewer_state;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

/// Canvas size in CSS pixels, resizing the backing store to match
fn sync_canvas_size(canvas: &HtmlCanvasElement) -> (f32, f32) {
    let width = canvas.client_width().max(1) as u32;
    let height = canvas.client_height().max(1) as u32;
    if canvas.width() != width {
        canvas.set_width(width);
    }
    if canvas.height() != height {
        canvas.set_height(height);
    }
    (width as f32, height as f32)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()?
        .dyn_into::<CanvasRenderingContext2d>()
        .ok()
}

/// Viewport component
#[component]
pub fn Viewport() -> impl IntoView {
    let state = use_viewer_state();
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    // Redraw whenever the core changes or the canvas mounts
    Effect::new(move |_| {
        state.redraw.track();
        let Some(canvas) = canvas_ref.get() else {
            return;
        };
        let Some(ctx) = context_2d(&canvas) else {
            log::error!("[Viewport] Canvas 2D context unavailable");
            return;
        };
        let (width, height) = sync_canvas_size(&canvas);
        state
            .core
            .with_value(|core| renderer::draw(&ctx, core, width, height));
    });

    let _resize = window_event_listener(leptos::ev::resize, move |_| {
        state.redraw.update(|n| *n += 1);
    });

    let on_click = move |ev: MouseEvent| {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let (width, height) = sync_canvas_size(&canvas);
        let (px, py) = (ev.offset_x() as f32, ev.offset_y() as f32);
        let additive = ev.ctrl_key() || ev.meta_key() || ev.shift_key();

        let picked = state
            .update_core(|core| core.pick(px, py, width, height, additive))
            .flatten();
        match picked {
            Some((hit, label)) => {
                log::info!(
                    "[Viewport] Selected element: {label} ({} in {})",
                    hit.element,
                    hit.node
                );
                state.selection.selected_label.set(Some(label));
            }
            None => log::debug!("[Viewport] Nothing under cursor"),
        }
        state.sync_model();
    };

    let on_mouse_move = move |ev: MouseEvent| {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let (width, height) = (canvas.client_width() as f32, canvas.client_height() as f32);
        let (px, py) = (ev.offset_x() as f32, ev.offset_y() as f32);
        let changed = state
            .core
            .try_update_value(|core| core.hover(px, py, width, height))
            .unwrap_or(false);
        if changed {
            state.redraw.update(|n| *n += 1);
        }
    };

    view! {
        <div id="container" class="viewport">
            <canvas
                node_ref=canvas_ref
                class="viewport-canvas"
                on:click=on_click
                on:mousemove=on_mouse_move
            ></canvas>

            {move || {
                state.loading.loading.get().then(|| view! {
                    <div class="viewport-overlay loading-overlay">
                        <div class="loading-spinner"></div>
                        <span>"Loading model..."</span>
                    </div>
                })
            }}
        </div>
    }
}

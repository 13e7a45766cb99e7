use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use futures_util::StreamExt;
use minirts_shared::atlas::AtlasBook;
use minirts_shared::config::ViewerConfig;
use minirts_shared::models::{Snapshot, TERRAIN_KINDS};
use minirts_shared::render::hud::binding_label;
use minirts_shared::selection::PointerButton;
use minirts_shared::session::ViewerSession;
use wasm_bindgen::JsCast;

use crate::api;
use crate::canvas::{self, CanvasSurface, ImageCache};
use crate::components::controls::ReplayControls;
use crate::components::help_overlay::HelpOverlay;
use crate::coords;
use crate::transport::Transport;

const CANVAS_ID: &str = "battlefield";

struct Sprites {
    atlas: AtlasBook,
    images: ImageCache,
}

async fn load_setup() -> Result<(ViewerConfig, AtlasBook), String> {
    let cfg = api::fetch_config().await?;
    let atlas = api::fetch_atlas().await?;
    atlas
        .validate(&cfg.unit_names, TERRAIN_KINDS)
        .map_err(|e| format!("sprite atlas: {}", e))?;
    Ok((cfg, atlas))
}

fn pointer_button(button: Option<MouseButton>) -> PointerButton {
    match button {
        Some(MouseButton::Primary) => PointerButton::Primary,
        Some(MouseButton::Secondary) => PointerButton::Secondary,
        _ => PointerButton::Other,
    }
}

fn canvas_element() -> Option<web_sys::HtmlCanvasElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(CANVAS_ID)?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .ok()
}

/// Draw one frame. Does nothing before the canvas is mounted.
fn paint(session: &ViewerSession, sprites: &Sprites) -> Result<(), String> {
    let Some(canvas) = canvas_element() else {
        return Ok(());
    };
    let (w, h) = session.viewport();
    let (w, h) = (w.max(0.0) as u32, h.max(0.0) as u32);
    if canvas.width() != w {
        canvas.set_width(w);
    }
    if canvas.height() != h {
        canvas.set_height(h);
    }
    let ctx = canvas::context_2d(&canvas).ok_or("canvas has no 2d context")?;
    let mut surface = CanvasSurface::new(ctx, &sprites.images);
    session
        .render(&mut surface, &sprites.atlas)
        .map_err(|e| e.to_string())
}

fn set_if_changed<T: PartialEq + 'static>(signal: &mut Signal<T>, value: T) {
    if *signal.peek() != value {
        signal.set(value);
    }
}

#[component]
pub fn Viewer() -> Element {
    let setup = use_resource(|| load_setup());

    let loaded = setup.read().clone();
    match loaded {
        None => rsx! {
            div { class: "status", "Loading sprites..." }
        },
        Some(Err(e)) => {
            tracing::error!(%e, "viewer setup failed");
            rsx! {
                div { class: "fatal",
                    h2 { "The viewer cannot start" }
                    p { "{e}" }
                }
            }
        }
        Some(Ok((cfg, atlas))) => rsx! {
            Battlefield { cfg, atlas }
        },
    }
}

#[component]
fn Battlefield(cfg: ViewerConfig, atlas: AtlasBook) -> Element {
    let mut session = use_signal(|| {
        let mut s = ViewerSession::new(cfg.clone());
        if let Some((w, h)) = coords::viewport_size() {
            s.resize(w, h);
        }
        s
    });
    let sprites = use_signal(|| Sprites {
        images: ImageCache::load(atlas.images()),
        atlas: atlas.clone(),
    });
    let mut transport = use_signal(Transport::disconnected);
    let mut fatal = use_signal(|| None::<String>);
    let mut show_help = use_signal(|| false);

    // DOM readouts, only written when they change
    let mut speed = use_signal(|| 0i32);
    let mut fps = use_signal(|| 0u32);
    let mut progress = use_signal(|| 0u32);
    let mut legend = use_signal(Vec::<String>::new);

    let mut refresh = move || {
        let painted = paint(&session.read(), &sprites.read());
        if let Err(e) = painted {
            tracing::error!(%e, "render failed");
            set_if_changed(&mut fatal, Some(e));
        }

        let s = session.read();
        let labels: Vec<String> = s
            .legend()
            .iter()
            .map(|b| binding_label(s.config(), b))
            .collect();
        let (sp, f, p) = (s.speed(), s.fps(), s.scrub_percent());
        drop(s);
        set_if_changed(&mut speed, sp);
        set_if_changed(&mut fps, f);
        set_if_changed(&mut progress, p);
        set_if_changed(&mut legend, labels);
    };

    let frames = use_coroutine(move |mut rx: UnboundedReceiver<String>| async move {
        while let Some(text) = rx.next().await {
            match Snapshot::from_json(&text) {
                Ok(snapshot) => {
                    session.write().on_snapshot(snapshot);
                    refresh();
                }
                Err(e) => tracing::warn!(%e, "malformed snapshot dropped"),
            }
        }
    });

    use_effect(move || {
        let tx = frames.tx();
        let url = match api::socket_url() {
            Ok(url) => url,
            Err(e) => {
                fatal.set(Some(e));
                return;
            }
        };
        tracing::info!(%url, "connecting");
        let connected = Transport::connect(&url, move |text| {
            if tx.unbounded_send(text).is_err() {
                tracing::debug!("viewer unmounted, frame dropped");
            }
        });
        match connected {
            Ok(t) => transport.set(t),
            Err(e) => {
                tracing::error!(%e, "connect failed");
                fatal.set(Some(e));
            }
        }
    });

    rsx! {
        div {
            class: "viewer",
            tabindex: "0",
            autofocus: true,

            onresize: move |evt: Event<ResizeData>| {
                if let Ok(size) = evt.data().get_content_box_size() {
                    session.write().resize(size.width, size.height);
                    refresh();
                }
            },

            onkeydown: move |evt: Event<KeyboardData>| {
                match evt.key() {
                    Key::Escape => show_help.set(false),
                    Key::Character(s) => {
                        let mut chars = s.chars();
                        let (Some(c), None) = (chars.next(), chars.next()) else {
                            return;
                        };
                        if c == '?' {
                            let open = *show_help.peek();
                            show_help.set(!open);
                            return;
                        }
                        let mut sink = transport();
                        session.write().key(c, &mut sink);
                        refresh();
                    }
                    _ => {}
                }
            },

            canvas {
                id: CANVAS_ID,
                class: "battlefield",

                onmousedown: move |evt: Event<MouseData>| {
                    let client = evt.client_coordinates();
                    let Some((x, y)) = coords::client_to_canvas_px(client.x, client.y, CANVAS_ID) else {
                        return;
                    };
                    session.write().pointer_down(pointer_button(evt.trigger_button()), x, y);
                },

                onmousemove: move |evt: Event<MouseData>| {
                    let client = evt.client_coordinates();
                    let Some((x, y)) = coords::client_to_canvas_px(client.x, client.y, CANVAS_ID) else {
                        return;
                    };
                    session.write().pointer_move(x, y);
                    if session.read().selection().drag_box().is_some() {
                        refresh();
                    }
                },

                onmouseup: move |evt: Event<MouseData>| {
                    let client = evt.client_coordinates();
                    let Some((x, y)) = coords::client_to_canvas_px(client.x, client.y, CANVAS_ID) else {
                        return;
                    };
                    let mut sink = transport();
                    session
                        .write()
                        .pointer_up(pointer_button(evt.trigger_button()), x, y, &mut sink);
                    refresh();
                },

                oncontextmenu: move |evt: Event<MouseData>| evt.prevent_default(),
            }

            div { class: "side-controls",
                ReplayControls {
                    speed: speed(),
                    min_speed: cfg.min_speed,
                    max_speed: cfg.max_speed,
                    fps: fps(),
                    progress: progress(),
                    on_action: move |action| {
                        let mut sink = transport();
                        session.write().control(action, &mut sink);
                        refresh();
                    },
                }
                button {
                    class: "help-button",
                    onclick: move |_| show_help.set(true),
                    "?"
                }
            }

            if let Some(e) = fatal() {
                div { class: "fatal",
                    h2 { "Rendering stopped" }
                    p { "{e}" }
                }
            }

            HelpOverlay { show: show_help, legend: legend() }
        }
    }
}

use dioxus::prelude::*;
use minirts_shared::controls::ControlAction;

#[component]
pub fn ReplayControls(
    speed: i32,
    min_speed: i32,
    max_speed: i32,
    fps: u32,
    progress: u32,
    on_action: EventHandler<ControlAction>,
) -> Element {
    rsx! {
        div { class: "replay-controls",
            div { class: "control-row",
                label { r#for: "speed", "Speed" }
                input {
                    id: "speed",
                    r#type: "range",
                    min: "{min_speed}",
                    max: "{max_speed}",
                    step: "1",
                    value: "{speed}",
                    oninput: move |evt: Event<FormData>| {
                        if let Ok(v) = evt.value().parse::<i32>() {
                            on_action.call(ControlAction::SetSpeed(v));
                        }
                    },
                }
                span { class: "readout", "{fps} fps" }
            }
            div { class: "control-row",
                button { onclick: move |_| on_action.call(ControlAction::Slower), "Slower" }
                button { onclick: move |_| on_action.call(ControlAction::Faster), "Faster" }
                button { onclick: move |_| on_action.call(ControlAction::Pause), "Pause" }
                button { onclick: move |_| on_action.call(ControlAction::Cycle), "Cycle player" }
            }
            div { class: "control-row",
                label { r#for: "progress", "Replay" }
                input {
                    id: "progress",
                    r#type: "range",
                    min: "0",
                    max: "100",
                    step: "1",
                    value: "{progress}",
                    // Seek on release, not on every thumb move.
                    onchange: move |evt: Event<FormData>| {
                        if let Ok(v) = evt.value().parse::<u32>() {
                            on_action.call(ControlAction::Scrub(v));
                        }
                    },
                }
                span { class: "readout", "{progress}%" }
            }
        }
    }
}

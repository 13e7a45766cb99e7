use dioxus::prelude::*;

#[component]
pub fn HelpOverlay(show: Signal<bool>, legend: Vec<String>) -> Element {
    if !*show.read() {
        return rsx! {};
    }

    rsx! {
        div {
            class: "help-overlay-backdrop",
            onclick: move |_| show.set(false),

            div {
                class: "help-overlay",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),

                h2 { "Help" }

                div { class: "shortcut-section",
                    h3 { "Mouse" }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", "Left click" }
                        span { "Select the unit under the cursor" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", "Left drag" }
                        span { "Box-select your units" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", "Right click" }
                        span { "Context command at the cell (move, attack, gather)" }
                    }
                }

                div { class: "shortcut-section",
                    h3 { "Commands for the current selection" }
                    if legend.is_empty() {
                        div { class: "shortcut-row", span { "Select units to see their commands" } }
                    }
                    for line in legend.iter() {
                        div { class: "shortcut-row", span { "{line}" } }
                    }
                    p { "Command hotkeys arm the command; the next click picks its target." }
                }

                div { class: "shortcut-section",
                    h3 { "Replay" }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", "Speed slider" }
                        span { "Frames per second of the replay" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", "Replay slider" }
                        span { "Jump to a point in the replay" }
                    }
                }

                div { class: "shortcut-section",
                    h3 { "Help" }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", kbd { "?" } }
                        span { "Toggle this help" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", kbd { "Esc" } }
                        span { "Close help" }
                    }
                }

                button {
                    class: "close-help",
                    onclick: move |_| show.set(false),
                    "Close"
                }
            }
        }
    }
}

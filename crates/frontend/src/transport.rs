use minirts_shared::command::CommandSink;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

/// Persistent connection to the game server. Snapshots come in through the
/// `on_message` callback; commands go out through `CommandSink`.
#[derive(Clone, Default)]
pub struct Transport {
    socket: Option<WebSocket>,
}

impl Transport {
    pub fn disconnected() -> Self {
        Transport { socket: None }
    }

    pub fn connect(url: &str, mut on_message: impl FnMut(String) + 'static) -> Result<Self, String> {
        let ws = WebSocket::new(url).map_err(|e| format!("WebSocket {}: {:?}", url, e))?;

        let onopen_callback = Closure::wrap(Box::new(move || {
            tracing::info!("snapshot stream opened");
        }) as Box<dyn FnMut()>);
        ws.set_onopen(Some(onopen_callback.as_ref().unchecked_ref()));
        onopen_callback.forget();

        let onmessage_callback = Closure::wrap(Box::new(move |e: MessageEvent| {
            match e.data().as_string() {
                Some(text) => on_message(text),
                None => tracing::debug!("non-text frame ignored"),
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(onmessage_callback.as_ref().unchecked_ref()));
        onmessage_callback.forget();

        let onclose_callback = Closure::wrap(Box::new(move |e: CloseEvent| {
            tracing::warn!(code = e.code(), reason = %e.reason(), "snapshot stream closed");
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(onclose_callback.as_ref().unchecked_ref()));
        onclose_callback.forget();

        Ok(Transport { socket: Some(ws) })
    }
}

impl CommandSink for Transport {
    fn send(&mut self, line: String) {
        let Some(ws) = &self.socket else {
            tracing::debug!(%line, "not connected, command dropped");
            return;
        };
        if ws.ready_state() != WebSocket::OPEN {
            tracing::debug!(%line, "socket not open, command dropped");
            return;
        }
        if let Err(e) = ws.send_with_str(&line) {
            tracing::warn!(?e, "command send failed");
        }
    }
}

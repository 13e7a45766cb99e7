use minirts_shared::atlas::AtlasBook;
use minirts_shared::config::ViewerConfig;

const ATLAS_PATH: &str = "/static/atlas.json";
const CONFIG_PATH: &str = "/static/viewer.json";

/// WebSocket endpoint on the page's host, `wss` when the page is served over TLS.
pub fn socket_url_for(protocol: &str, host: &str) -> String {
    let scheme = if protocol == "https:" { "wss" } else { "ws" };
    format!("{}://{}/ws", scheme, host)
}

/// Resolve an atlas image path against the static mount. Absolute paths and URLs pass through.
pub fn image_url(path: &str) -> String {
    if path.starts_with('/') || path.contains("://") {
        path.to_string()
    } else {
        format!("/static/{}", path)
    }
}

fn origin() -> Result<String, String> {
    let window = web_sys::window().ok_or("no window")?;
    window.location().origin().map_err(|_| "no location origin".to_string())
}

pub fn socket_url() -> Result<String, String> {
    let window = web_sys::window().ok_or("no window")?;
    let location = window.location();
    let protocol = location.protocol().map_err(|_| "no location protocol".to_string())?;
    let host = location.host().map_err(|_| "no location host".to_string())?;
    Ok(socket_url_for(&protocol, &host))
}

/// Body of a static file, or `None` when the server has no such file.
async fn get_optional(path: &str) -> Result<Option<String>, String> {
    let url = format!("{}{}", origin()?, path);
    let resp = reqwest::get(&url).await.map_err(|e| e.to_string())?;
    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !resp.status().is_success() {
        return Err(format!("GET {} failed: {}", path, resp.status()));
    }
    resp.text().await.map(Some).map_err(|e| e.to_string())
}

/// Sprite manifest from the server, falling back to the built-in MiniRTS tables.
pub async fn fetch_atlas() -> Result<AtlasBook, String> {
    match get_optional(ATLAS_PATH).await? {
        Some(text) => AtlasBook::from_json(&text).map_err(|e| e.to_string()),
        None => {
            tracing::info!("no atlas manifest, using built-in sprite tables");
            Ok(AtlasBook::minirts())
        }
    }
}

pub async fn fetch_config() -> Result<ViewerConfig, String> {
    match get_optional(CONFIG_PATH).await? {
        Some(text) => ViewerConfig::from_json(&text).map_err(|e| e.to_string()),
        None => Ok(ViewerConfig::default()),
    }
}

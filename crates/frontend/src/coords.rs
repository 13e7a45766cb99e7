use wasm_bindgen::JsCast;

/// Convert client (viewport) coordinates to container-relative pixel coordinates.
pub fn client_to_container(
    client_x: f64,
    client_y: f64,
    rect_left: f64,
    rect_top: f64,
) -> (f64, f64) {
    (client_x - rect_left, client_y - rect_top)
}

/// Pure function: container-relative CSS pixels to canvas backing-store pixels.
///
/// The canvas may be stretched by CSS, so each axis scales by its own
/// backing/CSS ratio.
pub fn container_to_canvas_px(
    container_x: f64,
    container_y: f64,
    css_w: f64,
    css_h: f64,
    canvas_w: f64,
    canvas_h: f64,
) -> Option<(f64, f64)> {
    if css_w <= 0.0 || css_h <= 0.0 {
        return None;
    }
    Some((container_x * canvas_w / css_w, container_y * canvas_h / css_h))
}

/// Client coordinates of a pointer event to canvas pixels, via the canvas's bounding box.
pub fn client_to_canvas_px(client_x: f64, client_y: f64, canvas_id: &str) -> Option<(f64, f64)> {
    let document = web_sys::window()?.document()?;
    let canvas = document
        .get_element_by_id(canvas_id)?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .ok()?;
    let rect = canvas.get_bounding_client_rect();
    let (cx, cy) = client_to_container(client_x, client_y, rect.left(), rect.top());
    container_to_canvas_px(
        cx,
        cy,
        rect.width(),
        rect.height(),
        canvas.width() as f64,
        canvas.height() as f64,
    )
}

/// Inner size of the browser window, the viewport the layout fits into.
pub fn viewport_size() -> Option<(f64, f64)> {
    let window = web_sys::window()?;
    let w = window.inner_width().ok()?.as_f64()?;
    let h = window.inner_height().ok()?.as_f64()?;
    Some((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_to_container_origin() {
        let (x, y) = client_to_container(100.0, 200.0, 100.0, 200.0);
        assert!((x - 0.0).abs() < 1e-9);
        assert!((y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_client_to_container_offset() {
        let (x, y) = client_to_container(450.0, 350.0, 320.0, 50.0);
        assert!((x - 130.0).abs() < 1e-9);
        assert!((y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_canvas_px_unscaled() {
        let (x, y) = container_to_canvas_px(130.0, 300.0, 1400.0, 1000.0, 1400.0, 1000.0).unwrap();
        assert!((x - 130.0).abs() < 1e-9);
        assert!((y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_canvas_px_stretched() {
        // 700x500 CSS box showing a 1400x1000 backing store
        let (x, y) = container_to_canvas_px(100.0, 50.0, 700.0, 500.0, 1400.0, 1000.0).unwrap();
        assert!((x - 200.0).abs() < 1e-9);
        assert!((y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_canvas_px_collapsed_box() {
        assert!(container_to_canvas_px(10.0, 10.0, 0.0, 500.0, 1400.0, 1000.0).is_none());
    }
}

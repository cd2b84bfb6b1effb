//! Browser-side image decoding.
//!
//! The browser decodes anything an `<img>` can show (SVG included), and the
//! image is rasterised straight at its working size on an off-screen canvas.

use wasm_bindgen::{Clamped, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, Url};

use crate::error::{LogoError, Result};
use crate::field::{target_dimensions, FieldExtractor, NormalizedField, RasterImage};

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .map_err(|e| LogoError::Context(describe(&e)))?
        .ok_or_else(|| LogoError::Context("canvas returned no 2d context".into()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|e| LogoError::Context(describe(&e)))
}

/// Decode `blob` and rasterise it at the extraction working size.
pub async fn decode_blob(document: &Document, blob: &Blob) -> Result<RasterImage> {
    let url = Url::create_object_url_with_blob(blob).map_err(|e| LogoError::Decode(describe(&e)))?;
    let img = HtmlImageElement::new().map_err(|e| LogoError::Decode(describe(&e)))?;
    img.set_cross_origin(Some("anonymous"));
    img.set_src(&url);

    // The only suspension point: one decoded image or one failure.
    let loaded = JsFuture::from(img.decode()).await;
    _ = Url::revoke_object_url(&url);
    loaded.map_err(|e| LogoError::Decode(format!("Failed to load image: {}", describe(&e))))?;

    let (width, height) = target_dimensions(img.natural_width(), img.natural_height());
    if width == 0 || height == 0 {
        return Err(LogoError::Decode("image has no intrinsic size".into()));
    }
    log::debug!(
        "decoded {}x{} image, rasterising at {width}x{height}",
        img.natural_width(),
        img.natural_height()
    );

    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().map_err(JsValue::from))
        .map_err(|e| LogoError::Context(describe(&e)))?;
    canvas.set_width(width);
    canvas.set_height(height);

    let ctx = context_2d(&canvas)?;
    ctx.draw_image_with_html_image_element_and_dw_and_dh(&img, 0.0, 0.0, f64::from(width), f64::from(height))
        .map_err(|e| LogoError::Decode(describe(&e)))?;
    let data = ctx
        .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
        .map_err(|e| LogoError::Decode(describe(&e)))?;
    let Clamped(pixels) = data.data();

    RasterImage::from_rgba(width, height, pixels)
}

/// Decode raw bytes of the given MIME type.
pub async fn decode_bytes(document: &Document, bytes: &[u8], mime: &str) -> Result<RasterImage> {
    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(|e| LogoError::Decode(describe(&e)))?;
    decode_blob(document, &blob).await
}

/// Decode `blob` and run the extractor on it.
pub async fn extract_blob(
    document: &Document,
    blob: &Blob,
    extractor: &FieldExtractor,
) -> Result<NormalizedField> {
    let image = decode_blob(document, blob).await?;
    Ok(extractor.extract_prepared(&image))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use wasm_bindgen_test::*;

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn canvas() -> HtmlCanvasElement {
        let document = web_sys::window().unwrap().document().unwrap();
        document.create_element("canvas").unwrap().dyn_into().unwrap()
    }

    #[wasm_bindgen_test]
    fn fresh_canvas_yields_2d_context() {
        assert!(context_2d(&canvas()).is_ok());
    }

    #[wasm_bindgen_test]
    fn canvas_bound_to_webgl_is_a_context_error() {
        let canvas = canvas();
        assert!(canvas.get_context("webgl2").unwrap().is_some());
        assert!(matches!(context_2d(&canvas), Err(LogoError::Context(_))));
    }
}

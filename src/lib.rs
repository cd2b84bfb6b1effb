#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Turns a flat logo into a glow field and renders it with an animated liquid
//! refraction shader.
//!
//! `field` and `shading` are plain Rust and build everywhere. The WebGL2
//! renderer and browser decoding live in `wasm`, compiled only for wasm32.

pub mod error;
pub mod field;
pub mod params;
pub mod shading;

pub use error::{LogoError, Result};
pub use field::{FieldExtractor, NormalizedField, RasterImage};
pub use params::RenderParams;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::{spawn_local, JsFuture};
    use web_sys::{HtmlCanvasElement, Response};

    use crate::field::FieldExtractor;
    use crate::params::RenderParams;

    mod decode;
    mod gl;
    mod render;

    pub use decode::{decode_blob, decode_bytes, extract_blob};
    pub use render::LiquidRenderer;

    const DEMO_CANVAS_ID: &str = "c";
    const DEMO_LOGO: &str = "logo.svg";

    thread_local! {
        /// Renderer mounted by the demo entry point, kept alive for the page.
        static DEMO: RefCell<Option<LiquidRenderer>> = const { RefCell::new(None) };
    }

    /// Handle returned to JavaScript hosts.
    #[wasm_bindgen]
    pub struct LiquidLogo {
        renderer: LiquidRenderer,
    }

    #[wasm_bindgen]
    impl LiquidLogo {
        pub fn start(&self) -> Result<(), JsValue> {
            self.renderer.start()?;
            Ok(())
        }

        pub fn stop(&self) {
            self.renderer.stop();
        }

        #[wasm_bindgen(js_name = isRunning)]
        pub fn is_running(&self) -> bool {
            self.renderer.is_running()
        }
    }

    /// Extract a field from logo bytes and start rendering it on `canvas`.
    #[wasm_bindgen]
    pub async fn mount(
        canvas: HtmlCanvasElement,
        bytes: Vec<u8>,
        mime: String,
        params_json: String,
    ) -> Result<LiquidLogo, JsValue> {
        let params = RenderParams::from_json(&params_json)?;
        let document = canvas
            .owner_document()
            .ok_or("canvas is not attached to a document")?;
        let image = decode_bytes(&document, &bytes, &mime).await?;
        let field = FieldExtractor::default().extract_prepared(&image);
        let renderer = LiquidRenderer::create(&canvas, &field, params)?;
        Ok(LiquidLogo { renderer })
    }

    /// Extract a field and return it as PNG bytes.
    #[wasm_bindgen(js_name = extractPng)]
    pub async fn extract_png(bytes: Vec<u8>, mime: String) -> Result<Vec<u8>, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("no document")?;
        let image = decode_bytes(&document, &bytes, &mime).await?;
        let field = FieldExtractor::default().extract_prepared(&image);
        Ok(field.to_png()?)
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        _ = console_log::init_with_level(log::Level::Debug);

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        // Library use: nothing to mount without the demo canvas.
        let Some(element) = document.get_element_by_id(DEMO_CANVAS_ID) else {
            return Ok(());
        };
        let canvas = element.dyn_into::<HtmlCanvasElement>()?;

        fit_to_window(&canvas)?;
        let resize_closure = {
            let canvas = canvas.clone();
            Closure::wrap(Box::new(move || {
                if let Err(e) = fit_to_window(&canvas) {
                    log::warn!("resize failed: {e:?}");
                }
            }) as Box<dyn FnMut()>)
        };
        window.add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref())?;
        resize_closure.forget();

        spawn_local(async move {
            match mount_demo(canvas).await {
                Ok(renderer) => DEMO.with(|demo| *demo.borrow_mut() = Some(renderer)),
                Err(e) => log::error!("Error during setup: {e:?}"),
            }
        });
        Ok(())
    }

    fn fit_to_window(canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let w = window.inner_width()?.as_f64().unwrap_or(0.0);
        let h = window.inner_height()?.as_f64().unwrap_or(0.0);
        canvas.set_width(w as u32);
        canvas.set_height(h as u32);
        Ok(())
    }

    async fn mount_demo(canvas: HtmlCanvasElement) -> Result<LiquidRenderer, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let response: Response = JsFuture::from(window.fetch_with_str(DEMO_LOGO))
            .await?
            .dyn_into()?;
        if !response.ok() {
            return Err(format!("Failed to load {DEMO_LOGO}: HTTP {}", response.status()).into());
        }
        let blob: web_sys::Blob = JsFuture::from(response.blob()?).await?.dyn_into()?;

        let field = extract_blob(&document, &blob, &FieldExtractor::default()).await?;
        Ok(LiquidRenderer::create(&canvas, &field, RenderParams::DEMO)?)
    }
}

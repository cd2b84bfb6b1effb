//! WebGL2 liquid renderer and its animation-frame loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{
    window, HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram,
    WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject,
};

use super::gl;
use crate::error::{LogoError, Result};
use crate::field::NormalizedField;
use crate::params::RenderParams;
use crate::shading::{FrameUniforms, FRAGMENT_SHADER, VERTEX_SHADER};

fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

struct UniformLocations {
    time: Option<WebGlUniformLocation>,
    ratio: Option<WebGlUniformLocation>,
    img_ratio: Option<WebGlUniformLocation>,
    pattern_scale: Option<WebGlUniformLocation>,
    refraction: Option<WebGlUniformLocation>,
    liquid: Option<WebGlUniformLocation>,
    edge: Option<WebGlUniformLocation>,
    pattern_blur: Option<WebGlUniformLocation>,
}

impl UniformLocations {
    fn lookup(gl: &GL, program: &WebGlProgram) -> Self {
        let at = |name: &str| gl.get_uniform_location(program, name);
        Self {
            time: at("u_time"),
            ratio: at("u_ratio"),
            img_ratio: at("u_img_ratio"),
            pattern_scale: at("u_patternScale"),
            refraction: at("u_refraction"),
            liquid: at("u_liquid"),
            // Inert in the fragment program; the compiler may strip them.
            edge: at("u_edge"),
            pattern_blur: at("u_patternBlur"),
        }
    }
}

/// GL objects plus the fixed inputs needed to draw a frame.
struct Scene {
    gl: GL,
    canvas: HtmlCanvasElement,
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    buffer: WebGlBuffer,
    texture: WebGlTexture,
    uniforms: UniformLocations,
    params: RenderParams,
    field_size: (u32, u32),
    started_at: f64,
}

impl Scene {
    fn draw(&self, now: f64) {
        let gl = &self.gl;
        let surface = (self.canvas.width(), self.canvas.height());
        let frame = FrameUniforms::new(&self.params, surface, self.field_size, now - self.started_at);

        gl.use_program(Some(&self.program));
        gl.bind_vertex_array(Some(&self.vao));
        gl.active_texture(GL::TEXTURE0);
        gl.bind_texture(GL::TEXTURE_2D, Some(&self.texture));

        let u = &self.uniforms;
        gl.uniform1f(u.time.as_ref(), frame.time);
        gl.uniform1f(u.ratio.as_ref(), frame.ratio);
        gl.uniform1f(u.img_ratio.as_ref(), frame.img_ratio);
        gl.uniform1f(u.pattern_scale.as_ref(), frame.pattern_scale);
        gl.uniform1f(u.refraction.as_ref(), frame.refraction);
        gl.uniform1f(u.liquid.as_ref(), frame.liquid);
        gl.uniform1f(u.edge.as_ref(), frame.edge);
        gl.uniform1f(u.pattern_blur.as_ref(), frame.pattern_blur);

        gl.viewport(0, 0, surface.0 as i32, surface.1 as i32);
        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.draw_arrays(GL::TRIANGLE_STRIP, 0, 4);
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        let gl = &self.gl;
        gl.delete_texture(Some(&self.texture));
        gl.delete_buffer(Some(&self.buffer));
        gl.delete_vertex_array(Some(&self.vao));
        gl.delete_program(Some(&self.program));
        log::debug!("liquid renderer resources released");
    }
}

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Draws a [`NormalizedField`] on a canvas every animation frame until
/// stopped or dropped.
pub struct LiquidRenderer {
    scene: Rc<Scene>,
    frame: FrameSlot,
    running: Rc<Cell<bool>>,
    pending: Rc<Cell<Option<i32>>>,
}

impl LiquidRenderer {
    /// Build the GL pipeline for `field` and start the frame loop.
    pub fn create(canvas: &HtmlCanvasElement, field: &NormalizedField, params: RenderParams) -> Result<Self> {
        let renderer = Self::new(canvas, field, params)?;
        renderer.start()?;
        Ok(renderer)
    }

    /// Build the GL pipeline without starting the loop.
    pub fn new(canvas: &HtmlCanvasElement, field: &NormalizedField, params: RenderParams) -> Result<Self> {
        params.validate()?;

        let gl: GL = match canvas.get_context("webgl2") {
            Ok(Some(ctx)) => ctx
                .dyn_into()
                .map_err(|_| LogoError::Unsupported("context is not WebGL2".into()))?,
            Ok(None) | Err(_) => {
                log::error!("WebGL2 not supported");
                return Err(LogoError::Unsupported("canvas returned no webgl2 context".into()));
            }
        };

        let vert = gl::compile_shader(&gl, GL::VERTEX_SHADER, VERTEX_SHADER)?;
        let frag = match gl::compile_shader(&gl, GL::FRAGMENT_SHADER, FRAGMENT_SHADER) {
            Ok(frag) => frag,
            Err(e) => {
                gl.delete_shader(Some(&vert));
                return Err(e);
            }
        };
        let linked = gl::link_program(&gl, &vert, &frag);
        // The program keeps what it needs once linked.
        gl.delete_shader(Some(&vert));
        gl.delete_shader(Some(&frag));
        let program = linked?;
        gl.use_program(Some(&program));

        let uniforms = UniformLocations::lookup(&gl, &program);
        let (vao, buffer) = gl::create_quad(&gl, &program)?;
        let texture = gl::upload_field(&gl, field)?;
        gl.uniform1i(
            gl.get_uniform_location(&program, "u_image_texture").as_ref(),
            0,
        );

        log::info!(
            "liquid renderer ready: field {}x{}, surface {}x{}",
            field.width(),
            field.height(),
            canvas.width(),
            canvas.height()
        );

        let scene = Scene {
            gl,
            canvas: canvas.clone(),
            program,
            vao,
            buffer,
            texture,
            uniforms,
            params,
            field_size: (field.width(), field.height()),
            started_at: now_ms(),
        };

        Ok(Self {
            scene: Rc::new(scene),
            frame: Rc::new(RefCell::new(None)),
            running: Rc::new(Cell::new(false)),
            pending: Rc::new(Cell::new(None)),
        })
    }

    /// Start (or resume) the frame loop. Time keeps counting from
    /// construction. Calling while running is a no-op.
    pub fn start(&self) -> Result<()> {
        if self.running.replace(true) {
            return Ok(());
        }

        // `f` holds the animation-frame closure so that it can keep calling
        // `request_animation_frame` on itself.
        let f = self.frame.clone();
        let scene = self.scene.clone();
        let running = self.running.clone();
        let pending = self.pending.clone();
        *self.frame.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            pending.set(None);
            if !running.get() {
                return;
            }
            scene.draw(now_ms());

            // schedule next
            let next = window().and_then(|w| {
                f.borrow()
                    .as_ref()
                    .and_then(|cb| w.request_animation_frame(cb.as_ref().unchecked_ref()).ok())
            });
            if next.is_none() {
                log::error!("failed to schedule next animation frame");
                running.set(false);
            }
            pending.set(next);
        }) as Box<dyn FnMut()>));

        self.scene.draw(now_ms());
        let handle = window()
            .ok_or_else(|| LogoError::Unsupported("no window".into()))
            .and_then(|w| {
                let slot = self.frame.borrow();
                let cb = slot
                    .as_ref()
                    .ok_or_else(|| LogoError::Unsupported("frame callback missing".into()))?;
                w.request_animation_frame(cb.as_ref().unchecked_ref())
                    .map_err(|e| LogoError::Unsupported(format!("requestAnimationFrame failed: {e:?}")))
            });
        match handle {
            Ok(handle) => {
                self.pending.set(Some(handle));
                Ok(())
            }
            Err(e) => {
                self.stop();
                Err(e)
            }
        }
    }

    /// Stop the frame loop and release the frame callback. The GL resources
    /// stay alive until the renderer is dropped, so `start` can resume.
    pub fn stop(&self) {
        self.running.set(false);
        if let (Some(handle), Some(w)) = (self.pending.take(), window()) {
            _ = w.cancel_animation_frame(handle);
        }
        // Dropping the closure breaks its reference cycle through `frame`.
        self.frame.borrow_mut().take();
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }
}

impl Drop for LiquidRenderer {
    fn drop(&mut self) {
        self.stop();
    }
}

//! WebGL2 resource helpers: programs, the full-screen quad, the field texture.

use web_sys::{
    WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader, WebGlTexture,
    WebGlVertexArrayObject,
};

use crate::error::{LogoError, Result};
use crate::field::NormalizedField;

/// Triangle strip covering clip space.
const QUAD: [f32; 8] = [-1.0, -1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0];

pub fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| LogoError::Shader("unable to create shader object".into()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let compiled = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if compiled {
        return Ok(shader);
    }
    let info = gl
        .get_shader_info_log(&shader)
        .filter(|log| !log.is_empty())
        .unwrap_or_else(|| "unknown compile error".into());
    gl.delete_shader(Some(&shader));
    log::error!("Shader compile failed: {info}");
    Err(LogoError::Shader(info))
}

pub fn link_program(gl: &GL, vert: &WebGlShader, frag: &WebGlShader) -> Result<WebGlProgram> {
    let program = gl
        .create_program()
        .ok_or_else(|| LogoError::Shader("unable to create program object".into()))?;
    gl.attach_shader(&program, vert);
    gl.attach_shader(&program, frag);
    gl.link_program(&program);

    let linked = gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if linked {
        return Ok(program);
    }
    let info = gl
        .get_program_info_log(&program)
        .filter(|log| !log.is_empty())
        .unwrap_or_else(|| "unknown link error".into());
    gl.delete_program(Some(&program));
    log::error!("Shader link failed: {info}");
    Err(LogoError::Shader(info))
}

/// Upload the quad and bind it to `a_position` through a vertex array.
pub fn create_quad(gl: &GL, program: &WebGlProgram) -> Result<(WebGlVertexArrayObject, WebGlBuffer)> {
    let vao = gl
        .create_vertex_array()
        .ok_or_else(|| LogoError::Unsupported("unable to create vertex array".into()))?;
    gl.bind_vertex_array(Some(&vao));

    let buffer = gl
        .create_buffer()
        .ok_or_else(|| LogoError::Unsupported("unable to create vertex buffer".into()))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
    let vertices = js_sys::Float32Array::from(&QUAD[..]);
    gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &vertices, GL::STATIC_DRAW);

    let location = gl.get_attrib_location(program, "a_position");
    if location < 0 {
        return Err(LogoError::Shader("a_position attribute not found".into()));
    }
    gl.enable_vertex_attrib_array(location as u32);
    gl.vertex_attrib_pointer_with_i32(location as u32, 2, GL::FLOAT, false, 0, 0);

    Ok((vao, buffer))
}

/// Upload the field as an RGBA8 texture on unit 0, linear filtering with
/// repeat wrapping.
pub fn upload_field(gl: &GL, field: &NormalizedField) -> Result<WebGlTexture> {
    let texture = gl
        .create_texture()
        .ok_or_else(|| LogoError::Unsupported("unable to create texture".into()))?;
    gl.active_texture(GL::TEXTURE0);
    gl.bind_texture(GL::TEXTURE_2D, Some(&texture));
    gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
        GL::TEXTURE_2D,
        0,
        GL::RGBA as i32,
        field.width() as i32,
        field.height() as i32,
        0,
        GL::RGBA,
        GL::UNSIGNED_BYTE,
        Some(field.pixels()),
    )
    .map_err(|e| LogoError::Unsupported(format!("texture upload failed: {e:?}")))?;
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::LINEAR as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::REPEAT as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::REPEAT as i32);
    Ok(texture)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    use super::*;
    use crate::shading::{FRAGMENT_SHADER, VERTEX_SHADER};

    wasm_bindgen_test_configure!(run_in_browser);

    fn context() -> GL {
        let document = web_sys::window().unwrap().document().unwrap();
        let canvas = document
            .create_element("canvas")
            .unwrap()
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .unwrap();
        canvas.get_context("webgl2").unwrap().unwrap().dyn_into().unwrap()
    }

    #[wasm_bindgen_test]
    fn bundled_program_links() {
        let gl = context();
        let vert = compile_shader(&gl, GL::VERTEX_SHADER, VERTEX_SHADER).unwrap();
        let frag = compile_shader(&gl, GL::FRAGMENT_SHADER, FRAGMENT_SHADER).unwrap();
        assert!(link_program(&gl, &vert, &frag).is_ok());
    }

    #[wasm_bindgen_test]
    fn invalid_source_is_a_shader_error() {
        let gl = context();
        let result = compile_shader(&gl, GL::FRAGMENT_SHADER, "#version 300 es\nvoid main() { oops }");
        match result {
            Err(LogoError::Shader(msg)) => assert!(!msg.is_empty()),
            other => panic!("expected shader error, got {other:?}"),
        }
    }

    #[wasm_bindgen_test]
    fn mismatched_interface_fails_to_link() {
        let gl = context();
        let vert = compile_shader(&gl, GL::VERTEX_SHADER, VERTEX_SHADER).unwrap();
        let frag = compile_shader(
            &gl,
            GL::FRAGMENT_SHADER,
            "#version 300 es\nprecision mediump float;\nin vec3 v_missing;\nout vec4 color;\nvoid main() { color = vec4(v_missing, 1.0); }",
        )
        .unwrap();
        match link_program(&gl, &vert, &frag) {
            Err(LogoError::Shader(msg)) => assert!(!msg.is_empty()),
            other => panic!("expected link error, got {other:?}"),
        }
    }
}

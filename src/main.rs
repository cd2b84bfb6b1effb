//! Host-side helper.
//!
//! `bake` extracts a glow field from a PNG/JPEG logo and writes it as PNG,
//! optionally with a CPU-shaded still frame. `serve` builds the WASM bundle
//! into `dist/pkg` (the build script has already copied `static/` there) and
//! serves `dist/` locally.

use std::path::PathBuf;
use std::process::{Command, ExitCode};
use std::{env, fs};

use liquid_logo::shading::{render_frame, FrameUniforms};
use liquid_logo::{FieldExtractor, LogoError, RenderParams, Result};

/// Site root: `build.rs` copies `static/` here, wasm-pack adds `pkg/`.
const SITE_DIR: &str = "dist";

const USAGE: &str = "usage:
  liquid_logo bake <input> <output.png> [--preview <png>] [--params <json>] [--time <seconds>]
  liquid_logo serve";

struct BakeArgs {
    input: PathBuf,
    output: PathBuf,
    preview: Option<PathBuf>,
    params: Option<PathBuf>,
    time: f64,
}

fn parse_bake(args: &[String]) -> std::result::Result<BakeArgs, String> {
    let mut positional = Vec::new();
    let mut preview = None;
    let mut params = None;
    let mut time = 0.0;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{flag} needs a value"))
        };
        match arg.as_str() {
            "--preview" => preview = Some(PathBuf::from(value("--preview")?)),
            "--params" => params = Some(PathBuf::from(value("--params")?)),
            "--time" => {
                let raw = value("--time")?;
                time = raw.parse().map_err(|_| format!("invalid --time: {raw}"))?;
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let [input, output]: [PathBuf; 2] = positional
        .try_into()
        .map_err(|_| "bake takes an input and an output path".to_string())?;
    Ok(BakeArgs {
        input,
        output,
        preview,
        params,
        time,
    })
}

fn bake(args: BakeArgs) -> Result<()> {
    let bytes = fs::read(&args.input)?;
    let field = FieldExtractor::default().extract_bytes(&bytes)?;
    fs::write(&args.output, field.to_png()?)?;
    println!(
        "wrote {}x{} field to {} (peak {:.5})",
        field.width(),
        field.height(),
        args.output.display(),
        field.peak()
    );

    if let Some(preview) = args.preview {
        let params = match args.params {
            Some(path) => RenderParams::from_json(&fs::read_to_string(path)?)?,
            None => RenderParams::DEMO,
        };
        let size = (field.width(), field.height());
        let uniforms = FrameUniforms::new(&params, size, size, args.time * 1000.0);
        let frame = render_frame(&field, &uniforms, size.0, size.1);
        image::RgbaImage::from_raw(size.0, size.1, frame)
            .ok_or_else(|| LogoError::Encode("frame buffer does not match dimensions".into()))?
            .save_with_format(&preview, image::ImageFormat::Png)?;
        println!("wrote preview frame to {}", preview.display());
    }
    Ok(())
}

fn wasm_pack_args() -> Vec<String> {
    ["build", "--release", "--target", "web", "--out-dir"]
        .into_iter()
        .map(String::from)
        .chain([format!("{SITE_DIR}/pkg")])
        .collect()
}

fn server_args() -> [&'static str; 5] {
    ["-m", "http.server", "8000", "--directory", SITE_DIR]
}

fn serve() -> ExitCode {
    // Build wasm bundle
    println!("Building WASM pkg …");
    match Command::new("wasm-pack").args(wasm_pack_args()).status()
    {
        Ok(st) if st.success() => {}
        Ok(_) => {
            eprintln!("wasm-pack finished with errors. Ensure wasm-pack is installed (https://rustwasm.github.io/wasm-pack/).");
            return ExitCode::FAILURE;
        }
        Err(_) => {
            eprintln!("wasm-pack not found in PATH. Skipping wasm build; the site may serve stale artifacts.");
        }
    }

    println!("Launching local server at http://127.0.0.1:8000 …");
    match Command::new("python3").args(server_args()).status()
    {
        Ok(st) if st.success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("failed to start http server: {e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("bake") => {
            let parsed = match parse_bake(&args[1..]) {
                Ok(parsed) => parsed,
                Err(msg) => {
                    eprintln!("{msg}\n{USAGE}");
                    return ExitCode::FAILURE;
                }
            };
            match bake(parsed) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("{e}");
                    ExitCode::FAILURE
                }
            }
        }
        Some("serve") => serve(),
        _ => {
            eprintln!("{USAGE}");
            ExitCode::FAILURE
        }
    }
}

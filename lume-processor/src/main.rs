use anyhow::{Context, Result};
use clap::Parser;
use lume_model::{ConvertOptions, ImportOptions, ModelEncoder, TextureLoader, convert_scene, import_scene};
use std::path::PathBuf;

/// Converts an OBJ model into a renderer-ready `.model` file.
#[derive(Parser, Debug)]
#[command(name = "lume-processor", version)]
struct Cli {
    /// Input model file.
    input: PathBuf,

    /// Output file, replaced if it exists.
    #[arg(default_value = "out.model")]
    output: PathBuf,

    /// Build mesh records on all cores.
    #[arg(short = 'j', long)]
    parallel: bool,

    /// Keep UVs as stored instead of flipping v.
    #[arg(long)]
    no_flip_uvs: bool,

    /// Do not generate normals for meshes that lack them.
    #[arg(long)]
    no_normals: bool,

    /// Do not compute tangents and bitangents.
    #[arg(long)]
    no_tangents: bool,
}

impl Cli {
    fn import_options(&self) -> ImportOptions {
        ImportOptions {
            flip_uvs: !self.no_flip_uvs,
            generate_normals: !self.no_normals,
            calc_tangent_space: !self.no_tangents,
        }
    }

    fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            parallel: self.parallel,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Usage errors exit with 1, help and version with 0.
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            err.print().ok();
            std::process::exit(if err.use_stderr() { 1 } else { 0 });
        }
    };

    log::info!("Processing {:?}...", args.input);
    let start_total = std::time::Instant::now();

    let scene = import_scene(&args.input, &args.import_options())
        .with_context(|| format!("Failed to load model file: {}", args.input.display()))?;
    log::info!("Model loaded in {:.2}s", start_total.elapsed().as_secs_f32());

    let convert_start = std::time::Instant::now();
    let textures = TextureLoader::for_model(&args.input);
    let model = convert_scene(Some(&scene), &textures, &args.convert_options())
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;
    log::info!("Conversion complete in {:.2}s", convert_start.elapsed().as_secs_f32());

    let save_start = std::time::Instant::now();
    let written = ModelEncoder::save_to_file(&model, &args.output)
        .with_context(|| format!("Failed to write model: {}", args.output.display()))?;
    log::info!("Saved to {:?} in {:.2}s", args.output, save_start.elapsed().as_secs_f32());

    println!(
        "{}: {} meshes, {} vertices, {} triangles, {:.2} MB in {:.2}s",
        args.output.display(),
        model.meshes.len(),
        model.vertex_count(),
        model.triangle_count(),
        written as f64 / 1024.0 / 1024.0,
        start_total.elapsed().as_secs_f32()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("lume-processor").chain(args.iter().copied()))
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn output_defaults_to_out_model() {
        let cli = parse(&["ship.obj"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("ship.obj"));
        assert_eq!(cli.output, PathBuf::from("out.model"));
        assert_eq!(cli.import_options(), ImportOptions::default());
        assert_eq!(cli.convert_options(), ConvertOptions::default());
    }

    #[test]
    fn flags_and_explicit_output() {
        let cli = parse(&["--parallel", "ship.obj", "--no-tangents", "ship.model"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("ship.model"));
        assert!(cli.convert_options().parallel);
        assert!(!cli.import_options().calc_tangent_space);
        assert!(cli.import_options().flip_uvs);

        assert!(parse(&["-j", "ship.obj"]).unwrap().parallel);
    }

    #[test]
    fn usage_errors() {
        assert!(parse(&[]).unwrap_err().use_stderr());
        assert!(parse(&["--bogus", "ship.obj"]).unwrap_err().use_stderr());
        assert!(parse(&["a.obj", "b.model", "c"]).unwrap_err().use_stderr());
        assert!(!parse(&["--help"]).unwrap_err().use_stderr());
    }
}

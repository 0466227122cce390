use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser};

use sociograph::engine::DEFAULT_CANVAS;
use sociograph::{Sociogram, SociogramEngine};

#[derive(Debug, Parser)]
#[command(
    name = "sociograph",
    about = "Render sociograms (ranked relationship graphs) directly to SVG."
)]
struct RenderArgs {
    /// Path to the input sociogram file. Use '-' to read from stdin.
    #[arg(short = 'i', long = "input")]
    input: Option<String>,

    /// Path to the output SVG file. Use '-' to write to stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Background color for the rendered sociogram.
    #[arg(short = 'b', long = "background-color", default_value = "#ffffff")]
    background_color: String,

    /// Suppress informational output.
    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputSource {
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone)]
enum OutputDestination {
    Stdout,
    File(PathBuf),
}

#[tokio::main]
async fn main() {
    if let Err(err) = dispatch().await {
        eprintln!("\u{001b}[31merror:\u{001b}[0m {err:?}");
        std::process::exit(1);
    }
}

async fn dispatch() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(|s| s.as_str()) {
        #[cfg(feature = "server")]
        Some("serve") => {
            let serve_args = sociograph::serve::ServeArgs::parse_from(
                std::iter::once(args[0].clone()).chain(args.iter().skip(2).cloned()),
            );
            sociograph::serve::run_serve(serve_args).await
        }
        Some("render") => {
            let render_args = RenderArgs::parse_from(
                std::iter::once(args[0].clone()).chain(args.iter().skip(2).cloned()),
            );
            run_render(render_args)
        }
        _ => {
            let render_args = RenderArgs::parse_from(args);
            run_render(render_args)
        }
    }
}

fn run_render(cli: RenderArgs) -> Result<()> {
    let input_source = parse_input(cli.input.as_deref())?;
    let output_dest = parse_output(cli.output.as_deref(), &input_source)?;

    let definition = load_definition(&input_source)?;
    let graph = Sociogram::parse(&definition).context("failed to parse sociogram definition")?;

    let mut engine = SociogramEngine::new(graph, DEFAULT_CANVAS);
    engine.set_background(cli.background_color.clone());

    let svg = engine.render_svg()?;
    write_output(output_dest, svg.as_bytes(), cli.quiet)?;

    Ok(())
}

fn parse_input(input: Option<&str>) -> Result<InputSource> {
    match input {
        Some("-") => Ok(InputSource::Stdin),
        Some(path_str) => {
            let path = PathBuf::from(path_str);
            if !path.exists() {
                return Err(anyhow!("input file '{path_str}' does not exist"));
            }
            Ok(InputSource::File(path))
        }
        None => Ok(InputSource::Stdin),
    }
}

fn parse_output(output: Option<&str>, input: &InputSource) -> Result<OutputDestination> {
    match output {
        Some("-") => Ok(OutputDestination::Stdout),
        Some(path_str) => {
            let path = PathBuf::from(path_str);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(anyhow!(
                        "output directory '{}' does not exist",
                        parent.display()
                    ));
                }
            }
            Ok(OutputDestination::File(path))
        }
        None => match input {
            InputSource::File(path) => {
                let default_name = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| format!("{name}.svg"))
                    .unwrap_or_else(|| "out.svg".to_string());
                let mut default_path = path.to_path_buf();
                default_path.set_file_name(default_name);
                Ok(OutputDestination::File(default_path))
            }
            InputSource::Stdin => Ok(OutputDestination::File(PathBuf::from("out.svg"))),
        },
    }
}

fn load_definition(input: &InputSource) -> Result<String> {
    match input {
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read definition from stdin")?;
            Ok(buffer)
        }
        InputSource::File(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display())),
    }
}

fn write_output(dest: OutputDestination, bytes: &[u8], quiet: bool) -> Result<()> {
    match dest {
        OutputDestination::Stdout => {
            io::stdout()
                .write_all(bytes)
                .context("failed to write SVG to stdout")?;
        }
        OutputDestination::File(path) => {
            fs::write(&path, bytes)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            if !quiet {
                println!("Generated sociogram -> {}", path.display());
            }
        }
    }
    Ok(())
}

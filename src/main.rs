//! `sprig-prerender`: run the hydration pipeline over an HTML file (or
//! stdin) and print the annotated result.

use std::io::Read;
use std::process::ExitCode;

use mimalloc::MiMalloc;
use sprig::{render_to_string, HydrateOptions, Registry, SerializeOptions};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const USAGE: &str = "usage: sprig-prerender [--pretty] [--no-prune-css] [--diagnostics] [FILE]
Reads FILE (or stdin) and writes prerendered HTML to stdout.
  --pretty        indent element-only regions
  --no-prune-css  keep stylesheet rules that match nothing
  --diagnostics   print the diagnostic records as JSON on stderr";

fn main() -> ExitCode {
    let mut pretty = false;
    let mut prune_css = true;
    let mut emit_diagnostics = false;
    let mut path: Option<String> = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--pretty" => pretty = true,
            "--no-prune-css" => prune_css = false,
            "--diagnostics" => emit_diagnostics = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                return ExitCode::SUCCESS;
            }
            other if other.starts_with('-') => {
                eprintln!("unknown flag {other}\n{USAGE}");
                return ExitCode::FAILURE;
            }
            other => path = Some(other.to_string()),
        }
    }

    let input = match read_input(path.as_deref()) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("sprig-prerender: {err}");
            return ExitCode::FAILURE;
        }
    };

    let opts = HydrateOptions {
        prune_css,
        serialize: SerializeOptions {
            pretty,
            serialize_shadow_roots: true,
            ..SerializeOptions::default()
        },
        ..HydrateOptions::default()
    };
    let outcome = render_to_string(&input, &Registry::new(), &opts);

    if emit_diagnostics {
        match serde_json::to_string_pretty(&outcome.diagnostics) {
            Ok(json) => eprintln!("{json}"),
            Err(err) => eprintln!("sprig-prerender: diagnostics not serializable: {err}"),
        }
    }

    match outcome.html {
        Some(html) => {
            println!("{html}");
            ExitCode::SUCCESS
        }
        None => {
            for diag in &outcome.diagnostics {
                eprintln!("{}: {}", diag.header, diag.message_text);
            }
            ExitCode::FAILURE
        }
    }
}

fn read_input(path: Option<&str>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

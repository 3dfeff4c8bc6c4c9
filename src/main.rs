use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use sihm::{TranspileOptions, transpile};

const USAGE: &str = "usage: sihm --input <scene.yaml|json|ini> [--output <scene.js>] [--base-dir <dir>]";

#[derive(Debug, Default, Clone)]
struct Cli {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    base_dir: Option<PathBuf>,
    help: bool,
}

fn parse_cli(args: &[String]) -> Result<Cli> {
    let mut cli = Cli::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                cli.help = true;
                i += 1;
            }
            "--input" | "-i" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --input"));
                };
                cli.input = Some(PathBuf::from(v));
                i += 2;
            }
            "--output" | "-o" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --output"));
                };
                cli.output = Some(PathBuf::from(v));
                i += 2;
            }
            "--base-dir" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --base-dir"));
                };
                cli.base_dir = Some(PathBuf::from(v));
                i += 2;
            }
            other => {
                return Err(anyhow!("unknown argument: {other}\n{USAGE}"));
            }
        }
    }
    Ok(cli)
}

impl Cli {
    fn into_options(self) -> Result<TranspileOptions> {
        let config_path = self.input.ok_or_else(|| anyhow!("--input is required\n{USAGE}"))?;
        let output_file = self
            .output
            .unwrap_or_else(|| config_path.with_extension("js"));
        Ok(TranspileOptions {
            config_path,
            output_file,
            base_dir: self.base_dir,
        })
    }
}

fn run() -> Result<()> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_cli(&argv)?;
    if cli.help {
        println!("{USAGE}");
        return Ok(());
    }

    let opts = cli.into_options()?;
    let report = transpile(&opts)
        .with_context(|| format!("failed to transpile {}", opts.config_path.display()))?;

    println!("[sihm] saved: {}", report.output_file.display());
    for file in &report.generated_files {
        println!("[sihm]   + {}", file.display());
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("[sihm] error: {e:#}");
        std::process::exit(1);
    }
}

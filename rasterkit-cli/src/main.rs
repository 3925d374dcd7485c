use anyhow::{Context, Result};
use clap::Parser;

mod cli;
mod color;
mod convert;
mod info;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = cli::Cli::parse();
    run(args.command)
}

fn run(cmd: cli::Command) -> Result<()> {
    match cmd {
        cli::Command::Convert(args) => convert::run_convert(&args),
        cli::Command::Info(args) => info::run_info(&args),
        cli::Command::Gradient(args) => run_gradient(&args),
        cli::Command::Show(args) => run_show(&args),
    }
}

fn run_gradient(args: &cli::GradientArgs) -> Result<()> {
    let from = color::parse_hex_color(&args.from)?;
    let to = color::parse_hex_color(&args.to)?;
    let img = rasterkit::linear_gradient(args.width, args.height, from, to)?;
    let written = rasterkit::save(&img, &args.out)
        .with_context(|| format!("Failed to write output {}", args.out.display()))?;
    println!("Wrote {} ({}x{})", written.display(), args.width, args.height);
    Ok(())
}

#[cfg(feature = "viewer")]
fn run_show(args: &cli::ShowArgs) -> Result<()> {
    let img = rasterkit::load_path(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let title = args
        .title
        .clone()
        .unwrap_or_else(|| args.input.display().to_string());
    let opts = rasterkit::ViewOptions::default().zoom(args.zoom).title(title);
    rasterkit::show(&img, &opts).context("Viewer failed")
}

#[cfg(not(feature = "viewer"))]
fn run_show(args: &cli::ShowArgs) -> Result<()> {
    anyhow::bail!(
        "Cannot show {}: rasterkit was built without the `viewer` feature",
        args.input.display()
    )
}

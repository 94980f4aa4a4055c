use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use gutter_sizing::{ReferenceData, SizingEngine, SizingInput, SizingReport};
use tracing::warn;

const USAGE: &str = "usage: gutter_sizing [INPUT.toml] [--data REFERENCE.toml]";

struct Args {
    input: Option<String>,
    data: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        input: None,
        data: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--data" => {
                args.data = Some(iter.next().context("--data needs a file path")?);
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ if arg.starts_with('-') => bail!("unknown option '{arg}'\n{USAGE}"),
            _ if args.input.is_none() => args.input = Some(arg),
            _ => bail!("unexpected argument '{arg}'\n{USAGE}"),
        }
    }
    Ok(args)
}

fn print_report(input: &SizingInput, report: &SizingReport) {
    println!("Local: {} / {}", input.city, input.state);
    println!("Área de contribuição [m²]   {:>10.2}", report.contribution_area);
    println!("Intensidade de chuva [mm/h] {:>10.0}", report.rainfall_intensity);
    println!("Vazão de projeto [L/min]    {:>10.2}", report.flow_rate);
    println!("Largura da calha [cm]       {:>10.1}", report.gutter_width);
    println!("Lâmina d'água [cm]          {:>10.1}", report.water_depth);
    println!("Altura total da calha [cm]  {:>10.1}", report.total_gutter_height);
    println!(
        "Dutos de descida            {:>6} x {} mm",
        input.downspout_count, report.downspout_diameter
    );
    if let Some(warning) = &report.downspout_warning {
        println!("Atenção: {warning}");
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;

    let data = match &args.data {
        Some(path) => ReferenceData::from_file(path)?,
        None => ReferenceData::builtin()?,
    };
    let input = match &args.input {
        Some(path) => {
            let toml_str = fs::read_to_string(path)
                .with_context(|| format!("failed to read input from {path}"))?;
            SizingInput::from_toml_str(&toml_str)
                .with_context(|| format!("failed to parse input from {path}"))?
        }
        None => SizingInput::default(),
    };

    let engine = SizingEngine::new(data);
    let outcome = engine.compute(&input);
    if let Err(err) = &outcome {
        warn!(kind = ?err.kind(), "sizing failed");
    }
    print_report(&input, &SizingReport::from_outcome(&outcome));

    Ok(if outcome.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

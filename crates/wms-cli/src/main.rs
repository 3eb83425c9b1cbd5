// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use runtime::DatasetRuntime;
use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use wms_app::{AppState, Dataset};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `wms --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    init_logging(&config)?;
    tracing::info!(config = %options.config_path.display(), "starting wms");

    let data_path = if options.demo {
        None
    } else {
        options.data_path.clone().or_else(|| config.data_path())
    };
    let dataset = match &data_path {
        Some(path) => Dataset::load(path).with_context(|| {
            format!(
                "load dataset {} -- fix the file, pass --data, or run with --demo",
                path.display()
            )
        })?,
        None => {
            let rows = options.rows.unwrap_or_else(|| config.demo_rows());
            let seed = options.seed.unwrap_or_else(|| config.demo_seed());
            tracing::info!(rows, seed, "generating demo dataset");
            wms_testkit::demo_dataset(seed, rows)
        }
    };

    if let Some(export_path) = &options.export_path {
        dataset.save(export_path)?;
        println!("{}", export_path.display());
        return Ok(());
    }

    if options.check_only {
        let summary = serde_json::to_string_pretty(&dataset.summary())
            .context("encode inventory summary")?;
        println!("{summary}");
        return Ok(());
    }

    let mut state = AppState::default();
    let mut runtime = DatasetRuntime::with_persist_path(dataset, data_path);
    let result = wms_tui::run_app(&mut state, &mut runtime, config.table_settings());
    if let Err(error) = &result {
        tracing::error!(error = %format!("{error:#}"), "terminal session failed");
    }
    result
}

/// Sends tracing output to the log file; the terminal belongs to the UI.
fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path()?;
    let log_file = open_log_file(&path)?;
    let filter = match env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
        _ => EnvFilter::new(config.log_level()),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Arc::new(log_file))
                .with_ansi(false),
        )
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].path to a writable location",
                path.display()
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    data_path: Option<PathBuf>,
    demo: bool,
    rows: Option<usize>,
    seed: Option<u64>,
    export_path: Option<PathBuf>,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        data_path: None,
        demo: false,
        rows: None,
        seed: None,
        export_path: None,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--data" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--data requires a JSON dataset path"))?;
                config::validate_file_path("--data", value.as_ref())?;
                options.data_path = Some(PathBuf::from(value.as_ref()));
            }
            "--export" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--export requires an output path"))?;
                config::validate_file_path("--export", value.as_ref())?;
                options.export_path = Some(PathBuf::from(value.as_ref()));
            }
            "--rows" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--rows requires a number of products"))?;
                let rows = value.as_ref().parse::<usize>().with_context(|| {
                    format!("--rows expects a whole number, got {:?}", value.as_ref())
                })?;
                options.rows = Some(rows);
            }
            "--seed" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--seed requires a number"))?;
                let seed = value.as_ref().parse::<u64>().with_context(|| {
                    format!("--seed expects a whole number, got {:?}", value.as_ref())
                })?;
                options.seed = Some(seed);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if options.demo && options.data_path.is_some() {
        return Err(anyhow!("--demo and --data are mutually exclusive; pick one"));
    }

    Ok(options)
}

fn print_help() {
    println!("wms - warehouse admin tables");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --data <path>            Load a JSON dataset (changes are saved back)");
    println!("  --demo                   Launch with generated demo data (in-memory)");
    println!("  --rows <n>               Products to generate for demo data");
    println!("  --seed <n>               Seed for demo data");
    println!("  --export <path>          Write the loaded dataset as JSON and exit");
    println!("  --check                  Validate config + dataset, print a summary, exit");
    println!("  --help                   Show this help");
}

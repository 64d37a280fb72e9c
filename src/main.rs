//! # netmap-report CLI
//!
//! Usage:
//!   netmap-report request.json -o report.pdf
//!   echo '{ ... }' | netmap-report --labels pt
//!   netmap-report --example > request.json

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use netmap_report::config::ReportLabels;
use netmap_report::error::ReportError;
use netmap_report::{compose_request, parse_request, RenderedReport};

/// Compose the PDF report of a network topology project.
#[derive(Debug, Parser)]
#[command(name = "netmap-report", version)]
struct Cli {
    /// Report request JSON. Read from stdin when omitted.
    input: Option<PathBuf>,

    /// Where to write the PDF. Defaults to `relatorio_<id>.pdf`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory relative map references are resolved against.
    #[arg(long, env = "NETMAP_IMAGE_DIR")]
    image_dir: Option<PathBuf>,

    /// Label language; overrides the labels in the request.
    #[arg(long, value_enum)]
    labels: Option<LabelSet>,

    /// Write uncompressed content streams.
    #[arg(long)]
    no_compress: bool,

    /// Print a sample request and exit.
    #[arg(long)]
    example: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LabelSet {
    En,
    Pt,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.example {
        print!("{}", example_request_json());
        return;
    }

    match run(&cli) {
        Ok((report, path)) => {
            eprintln!("✓ Written {} bytes to {}", report.bytes.len(), path.display());
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<(RenderedReport, PathBuf), ReportError> {
    let input = read_input(cli.input.as_ref())?;
    let mut request = parse_request(&input)?;

    if let Some(dir) = &cli.image_dir {
        request.config.image_dir = Some(dir.clone());
    }
    match cli.labels {
        Some(LabelSet::En) => request.config.labels = ReportLabels::english(),
        Some(LabelSet::Pt) => request.config.labels = ReportLabels::portuguese(),
        None => {}
    }
    if cli.no_compress {
        request.config.compress = false;
    }

    let report = compose_request(&request, chrono::Local::now().naive_local());
    let path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&report.filename));
    fs::write(&path, &report.bytes).map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    Ok((report, path))
}

fn read_input(path: Option<&PathBuf>) -> Result<String, ReportError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        }),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| ReportError::Io {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            Ok(buf)
        }
    }
}

fn example_request_json() -> &'static str {
    r##"{
  "project": {
    "id": 7,
    "name": "Lab-Net",
    "notes": "Uplink: 1Gbps\nBackup: 100Mbps",
    "map_filename": null,
    "devices": [
      {
        "id": 1,
        "device_type": "switch",
        "x": 120.0,
        "y": 80.0,
        "name": "Core-SW",
        "ip": "10.0.0.2",
        "mac": "00:1A:2B:3C:4D:5E",
        "gateway": "10.0.0.1",
        "dns": "10.0.0.53"
      },
      {
        "id": 2,
        "device_type": "router",
        "x": 40.0,
        "y": 80.0,
        "name": "Edge-RTR",
        "ip": "10.0.0.1",
        "mac": "00:1A:2B:3C:4D:01",
        "dns": "1.1.1.1"
      },
      {
        "id": 3,
        "x": 200.0,
        "y": 140.0,
        "name": "AP-01",
        "ip": "10.0.0.20"
      }
    ]
  },
  "generated_by": "admin",
  "generated_at": "2024-03-05T09:07:02",
  "config": {
    "page": { "size": "A4" }
  }
}
"##
}

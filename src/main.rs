use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use futures::executor::block_on;
use gaugeviz::csv_source::CsvWorksheet;
use gaugeviz::host::Worksheet;
use gaugeviz::snapshot::SnapshotWorksheet;
use gaugeviz::{
    get_encoded_data, get_encoded_data_and_selected_tuples, init_fog, EncodedRow, FogOptions,
    PageOptions, TupleId,
};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gaugeviz")]
#[command(about = "Encode worksheet data for a gauge chart and compute fog colors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print encoded rows as JSON
    Encode(SourceArgs),
    /// Print encoded rows and the selected tuple ids as JSON
    Select(SourceArgs),
    /// Print the fogged hex color for COLOR
    Fog {
        color: String,
        /// Host background the fog tone is derived from
        #[arg(long, default_value = "#ffffff")]
        background: String,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Read a CSV file instead of a JSON worksheet snapshot on stdin
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Rows per summary-data page (CSV only)
    #[arg(long, default_value_t = PageOptions::default().page_size)]
    page_size: usize,
    /// Channel assignment, e.g. `edge=Region` or `level=Sales,Target` (CSV only)
    #[arg(long = "channel", value_parser = parse_channel)]
    channels: Vec<ChannelArg>,
    /// Comma-separated 1-based row numbers reported as selected (CSV only)
    #[arg(long, value_delimiter = ',')]
    select: Vec<usize>,
}

#[derive(Debug, Clone)]
struct ChannelArg {
    channel: String,
    fields: Vec<String>,
}

fn parse_channel(arg: &str) -> Result<ChannelArg> {
    let (channel, fields) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected CHANNEL=FIELD[,FIELD...], got '{}'", arg))?;
    let fields: Vec<String> = fields
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();
    if channel.trim().is_empty() || fields.is_empty() {
        return Err(anyhow!("expected CHANNEL=FIELD[,FIELD...], got '{}'", arg));
    }
    Ok(ChannelArg {
        channel: channel.trim().to_string(),
        fields,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Encode(args) => run_source(&args, false),
        Command::Select(args) => run_source(&args, true),
        Command::Fog { color, background } => {
            let fog = init_fog(&FogOptions { background })?;
            let fogged = fog.fog(&color)?;
            writeln!(io::stdout().lock(), "{}", fogged).context("Failed to write to stdout")?;
            Ok(())
        }
    }
}

fn run_source(args: &SourceArgs, with_selection: bool) -> Result<()> {
    match &args.csv {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            let options = PageOptions {
                page_size: args.page_size,
            };
            let mut worksheet = CsvWorksheet::from_reader(file, &options)?;
            for arg in &args.channels {
                worksheet = worksheet.with_encoding(&arg.channel, arg.fields.as_slice());
            }
            let worksheet = worksheet.with_selection(args.select.iter().copied());
            run(&worksheet, with_selection)
        }
        None => {
            let worksheet = SnapshotWorksheet::from_reader(io::stdin().lock())
                .context("Failed to read worksheet snapshot from stdin")?;
            run(&worksheet, with_selection)
        }
    }
}

fn run<W: Worksheet>(worksheet: &W, with_selection: bool) -> Result<()> {
    if with_selection {
        let result = block_on(get_encoded_data_and_selected_tuples(worksheet))
            .context("Failed to encode worksheet selection")?;
        write_json(&SelectOutput {
            selected_tuples: result.sorted_selection(),
            encoded: &result.encoded,
        })
    } else {
        let encoded = block_on(get_encoded_data(worksheet)).context("Failed to encode worksheet data")?;
        write_json(&encoded)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SelectOutput<'a> {
    encoded: &'a [EncodedRow],
    selected_tuples: Vec<TupleId>,
}

fn write_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value).context("Failed to write JSON to stdout")?;
    writeln!(handle).context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

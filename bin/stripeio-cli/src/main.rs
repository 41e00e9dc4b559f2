//! stripeio - Erasure-coded part writer
//!
//! Stripes a file (or stdin) across a set of local endpoint directories
//! with Reed-Solomon parity and verifies the written shards against the
//! recorded descriptor checksums.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use sha2::{Digest, Sha512};
use std::path::PathBuf;
use std::sync::Arc;
use stripeio_common::{ErasureDescriptor, WriteConfig};
use stripeio_storage::{create_part, EndpointSlot, LocalEndpoint, StorageEndpoint};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stripeio")]
#[command(about = "Erasure-coded part writer over local endpoint directories")]
#[command(version)]
struct Cli {
    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stripe a file (or stdin) across the endpoint directories
    Put(PutArgs),
    /// Verify endpoint shard files against recorded descriptor checksums
    Verify(VerifyArgs),
}

#[derive(Args, Debug)]
struct PutArgs {
    /// Endpoint root directories, one per shard slot (repeatable)
    #[arg(long = "endpoint", required = true)]
    endpoints: Vec<PathBuf>,

    /// Volume to write into
    #[arg(long)]
    volume: String,

    /// Part path inside the volume
    #[arg(long)]
    path: String,

    /// Part name recorded in each checksum entry
    #[arg(long)]
    part_name: String,

    /// Number of data shards
    #[arg(long)]
    data_shards: Option<usize>,

    /// Number of parity shards
    #[arg(long)]
    parity_shards: Option<usize>,

    /// Block size in bytes
    #[arg(long)]
    block_size: Option<usize>,

    /// Write quorum; defaults to data shards + 1
    #[arg(long)]
    quorum: Option<usize>,

    /// Write the descriptor set to this file instead of stdout
    #[arg(long)]
    descriptors_out: Option<PathBuf>,

    /// Input file; reads stdin when omitted
    input: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Endpoint root directories, in the same order as the write
    #[arg(long = "endpoint", required = true)]
    endpoints: Vec<PathBuf>,

    /// Volume the part was written into
    #[arg(long)]
    volume: String,

    /// Part path inside the volume
    #[arg(long)]
    path: String,

    /// Part name to check
    #[arg(long)]
    part_name: String,

    /// Descriptor set produced by `put`
    #[arg(long)]
    descriptors: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone())),
        )
        .init();

    match cli.command {
        Command::Put(args) => put(args).await,
        Command::Verify(args) => verify(args).await,
    }
}

fn open_endpoints(roots: &[PathBuf]) -> Vec<Arc<LocalEndpoint>> {
    roots
        .iter()
        .map(|root| Arc::new(LocalEndpoint::new(root)))
        .collect()
}

async fn put(args: PutArgs) -> Result<()> {
    let defaults = WriteConfig::default();
    let config = WriteConfig {
        block_size: args.block_size.unwrap_or(defaults.block_size),
        data_shards: args.data_shards.unwrap_or(defaults.data_shards),
        parity_shards: args.parity_shards.unwrap_or(defaults.parity_shards),
        write_quorum: args.quorum,
    };
    config.validate().context("invalid write configuration")?;

    if args.endpoints.len() != config.total_shards() {
        bail!(
            "{} endpoints given, geometry needs {} (D={} P={})",
            args.endpoints.len(),
            config.total_shards(),
            config.data_shards,
            config.parity_shards
        );
    }

    let endpoints = open_endpoints(&args.endpoints);
    for endpoint in &endpoints {
        endpoint.make_volume(&args.volume).await?;
    }
    let slots: Vec<EndpointSlot> = endpoints
        .iter()
        .map(|endpoint| Some(Arc::clone(endpoint) as Arc<dyn StorageEndpoint>))
        .collect();

    let descriptors: Vec<ErasureDescriptor> = (0..slots.len()).map(|_| config.descriptor()).collect();

    let (updated, size) = match &args.input {
        Some(path) => {
            let mut file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("cannot open {}", path.display()))?;
            create_part(
                &slots,
                &args.volume,
                &args.path,
                &args.part_name,
                &mut file,
                &descriptors,
                config.quorum(),
            )
            .await?
        }
        None => {
            let mut stdin = tokio::io::stdin();
            create_part(
                &slots,
                &args.volume,
                &args.path,
                &args.part_name,
                &mut stdin,
                &descriptors,
                config.quorum(),
            )
            .await?
        }
    };

    info!(bytes = size, endpoints = slots.len(), "part written");

    let report = json!({
        "volume": args.volume,
        "path": args.path,
        "part_name": args.part_name,
        "size": size,
        "descriptors": updated,
    });
    let rendered = serde_json::to_string_pretty(&report)?;
    match &args.descriptors_out {
        Some(path) => tokio::fs::write(path, rendered.as_bytes())
            .await
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(())
}

async fn verify(args: VerifyArgs) -> Result<()> {
    let report: serde_json::Value = serde_json::from_slice(
        &tokio::fs::read(&args.descriptors)
            .await
            .with_context(|| format!("cannot read {}", args.descriptors.display()))?,
    )?;
    let descriptors: Vec<Option<ErasureDescriptor>> =
        serde_json::from_value(report["descriptors"].clone())
            .context("descriptor set missing from report")?;

    if descriptors.len() != args.endpoints.len() {
        bail!(
            "descriptor set covers {} endpoints, {} given",
            descriptors.len(),
            args.endpoints.len()
        );
    }

    let endpoints = open_endpoints(&args.endpoints);
    let mut mismatches = 0usize;
    for (index, slot) in descriptors.iter().enumerate() {
        let Some(descriptor) = slot else {
            println!("endpoint {index}: no descriptor recorded, skipped");
            continue;
        };
        let Some(entry) = descriptor
            .checksums
            .iter()
            .find(|entry| entry.part_name == args.part_name)
        else {
            bail!("endpoint {index}: no checksum entry for part {}", args.part_name);
        };

        let shard = endpoints[index].read_file(&args.volume, &args.path).await?;
        let actual = hex::encode(Sha512::digest(&shard));
        if actual == entry.hash {
            println!("endpoint {index}: ok ({} bytes)", shard.len());
        } else {
            println!(
                "endpoint {index}: MISMATCH (recorded {}, actual {})",
                entry.hash, actual
            );
            mismatches += 1;
        }
    }

    if mismatches > 0 {
        bail!("{mismatches} endpoint(s) failed verification");
    }
    Ok(())
}

//! BKG - Biological knowledge graph build tool

use anyhow::Result;
use bkg_common::logging::{init_logging, LogConfig, LogLevel};
use bkg_pipeline::adapter::{Adapter, AdapterConfig, Threshold};
use bkg_pipeline::sources::{
    ChemblAdapter, DiseaseAdapter, OpenTargetsAdapter, SideEffectAdapter, StringAdapter,
    UniprotAdapter,
};
use bkg_pipeline::{GraphWriter, Pipeline};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "bkg")]
#[command(author, version, about = "Biological knowledge graph build tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the adapter pipeline and write bulk-import files
    Run {
        /// Sources to run, in order
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "uniprot,disease,string,opentargets,chembl,side-effect"
        )]
        sources: Vec<String>,

        /// Output directory for the bulk-import files
        #[arg(short, long, default_value = "./bkg-out")]
        output: String,

        /// Cache root for raw upstream payloads
        #[arg(long, default_value = ".cache")]
        cache_dir: String,

        /// NCBI taxonomy id filter
        #[arg(long, default_value = "9606")]
        organism: String,

        /// Bounded, reproducible development run
        #[arg(long)]
        test_mode: bool,

        /// Minimum association/interaction score (STRING, Open Targets)
        #[arg(long)]
        score_threshold: Option<f64>,

        /// Minimum side-effect frequency
        #[arg(long)]
        frequency_threshold: Option<f64>,

        /// Minimum clinical development phase (ChEMBL)
        #[arg(long)]
        max_phase: Option<i32>,

        /// Emit raw identifiers instead of CURIEs (legacy passthrough)
        #[arg(long)]
        no_prefix: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Environment variables set the baseline; --verbose wins over both
    let mut log_config = LogConfig::from_env().unwrap_or_else(|_| {
        LogConfig::builder().log_file_prefix("bkg").build()
    });
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }

    init_logging(&log_config)?;

    match cli.command {
        Command::Run {
            sources,
            output,
            cache_dir,
            organism,
            test_mode,
            score_threshold,
            frequency_threshold,
            max_phase,
            no_prefix,
        } => {
            let base_config = AdapterConfig::builder()
                .organism(organism)
                .test_mode(test_mode)
                .add_prefix(!no_prefix)
                .cache_dir(cache_dir)
                .build();

            run_pipeline(
                &sources,
                &output,
                base_config,
                score_threshold,
                frequency_threshold,
                max_phase,
            )
            .await?;
        },
    }

    Ok(())
}

/// Wire the requested adapters and run them through the driver.
///
/// The disease adapter is downloaded up front when any consumer of the
/// disease crosswalk is requested, so the crosswalk built from MONDO xrefs
/// replaces the built-in table; its download() is a no-op inside the run.
async fn run_pipeline(
    sources: &[String],
    output: &str,
    base_config: AdapterConfig,
    score_threshold: Option<f64>,
    frequency_threshold: Option<f64>,
    max_phase: Option<i32>,
) -> Result<()> {
    let wants = |name: &str| sources.iter().any(|s| s == name);
    let needs_crosswalk = wants("opentargets") || wants("chembl");

    let mut crosswalk = None;
    let mut disease_adapter = None;
    if wants("disease") || needs_crosswalk {
        let mut adapter = DiseaseAdapter::new(base_config.clone())?;
        if let Err(e) = adapter.download().await {
            warn!("Disease ontology unavailable, falling back to built-in crosswalk: {}", e);
        } else {
            crosswalk = Some(adapter.crosswalk());
        }
        if wants("disease") {
            disease_adapter = Some(adapter);
        }
    }

    let mut adapters: Vec<Box<dyn Adapter>> = Vec::new();

    for source in sources {
        match source.as_str() {
            "uniprot" => {
                adapters.push(Box::new(UniprotAdapter::new(base_config.clone())?));
            },
            "disease" => {
                if let Some(adapter) = disease_adapter.take() {
                    adapters.push(Box::new(adapter));
                }
            },
            "string" => {
                let mut config = base_config.clone();
                config.threshold = score_threshold.map(Threshold::Score);
                adapters.push(Box::new(StringAdapter::new(config)?));
            },
            "opentargets" => {
                let mut config = base_config.clone();
                config.threshold = score_threshold.map(Threshold::Score);
                let mut adapter = OpenTargetsAdapter::new(config)?;
                if let Some(crosswalk) = &crosswalk {
                    adapter = adapter.with_crosswalk(crosswalk.clone());
                }
                adapters.push(Box::new(adapter));
            },
            "chembl" => {
                let mut config = base_config.clone();
                config.threshold = max_phase.map(Threshold::MaxPhase);
                let mut adapter = ChemblAdapter::new(config)?;
                if let Some(crosswalk) = &crosswalk {
                    adapter = adapter.with_crosswalk(crosswalk.clone());
                }
                adapters.push(Box::new(adapter));
            },
            "side-effect" | "side_effect" => {
                let mut config = base_config.clone();
                config.threshold = frequency_threshold.map(Threshold::Frequency);
                adapters.push(Box::new(SideEffectAdapter::new(config)?));
            },
            other => {
                warn!("Unknown source '{}', skipping", other);
            },
        }
    }

    info!("Running {} adapters into {}", adapters.len(), output);

    let pipeline = Pipeline::new(GraphWriter::new(output));
    let stats = pipeline.run(adapters).await?;

    for run in &stats.adapters {
        match (&run.audit, run.failed) {
            (_, true) => warn!("{}: failed, no tuples emitted", run.adapter),
            (Some(audit), _) => {
                info!("{}: {} nodes, {} edges ({})", run.adapter, run.nodes, run.edges, audit)
            },
            (None, _) => info!("{}: {} nodes, {} edges", run.adapter, run.nodes, run.edges),
        }
    }

    info!(
        "Wrote {} nodes and {} edges ({} duplicate nodes skipped, {} edges merged)",
        stats.writer.nodes_written,
        stats.writer.edges_written,
        stats.writer.duplicate_nodes,
        stats.writer.merged_edges
    );

    Ok(())
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use seqrisk::analysis::risk::RiskEstimator;
use seqrisk::analysis::sequence_analysis::analyze_sequences;
use seqrisk::analysis::summary::{answer, Query};
use seqrisk::config::{default_config_path, write_default_config, AnalysisConfig};
use seqrisk::data_handling::analysis_table::{write_analysis_table, AnalysisTableDataset};
use seqrisk::data_handling::fasta::FastaDataset;
use seqrisk::data_handling::knowledge_base::KnowledgeBaseDataset;
use seqrisk::data_handling::Dataset;
use seqrisk::models::{RiskFactors, Sex};

#[derive(Parser, Debug)]
#[command(name = "seqrisk", version, about = "Sequence statistics, clustering and heuristic risk scoring")]
struct Args {
    /// JSON configuration file (defaults to seqrisk.json under PROJECT_ROOT)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute GC content, repeated motifs and clusters for a FASTA file
    Analyze {
        #[arg(long)]
        fasta: PathBuf,
        #[arg(long, default_value = "resultats_analyse.csv")]
        output: PathBuf,
        #[arg(long)]
        motif_length: Option<usize>,
        #[arg(long)]
        clusters: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Estimate a risk score for one sequence against a knowledge base
    Risk {
        #[arg(long)]
        knowledge_base: PathBuf,
        #[arg(long)]
        sequence: String,
        #[arg(long)]
        age: u32,
        #[arg(long, value_enum)]
        sex: Sex,
        #[arg(long)]
        smoker: bool,
        /// Print the estimate as JSON instead of a text report
        #[arg(long)]
        json: bool,
    },
    /// Answer a free-text query ("GC content", "sequence length", "cluster", "motif") over an exported table
    Query {
        #[arg(long)]
        table: PathBuf,
        text: String,
        #[arg(long)]
        json: bool,
    },
    /// Write the default configuration file
    InitConfig {
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Analyze { fasta, output, motif_length, clusters, seed } => {
            let mut config = AnalysisConfig::load(args.config.as_deref())?;
            if let Some(motif_length) = motif_length {
                config.motif_length = motif_length;
            }
            if let Some(clusters) = clusters {
                config.n_clusters = clusters;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }

            let records = FastaDataset { path: fasta.clone() }
                .load()
                .with_context(|| format!("loading {}", fasta.display()))?;
            println!("Number of sequences read: {}", records.len());

            let rows = analyze_sequences(&records, &config)?;
            write_analysis_table(&rows, &output)?;
            println!("Analysis complete. Results saved to {}", output.display());
        }
        Command::Risk { knowledge_base, sequence, age, sex, smoker, json } => {
            let kb = KnowledgeBaseDataset { path: knowledge_base.clone() }
                .load()
                .with_context(|| format!("loading {}", knowledge_base.display()))?;
            let summary = kb.gc_summary()?;
            info!(
                "Knowledge base GC content: mean {:.2}%, std dev {:.2}%",
                summary.mean, summary.std_dev
            );

            let factors = RiskFactors { age, is_smoker: smoker, sex };
            let estimate = RiskEstimator::new(&kb).estimate_sequence(&sequence, &factors)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&estimate)?);
            } else {
                println!("{estimate}");
            }
        }
        Command::Query { table, text, json } => {
            let query: Query = text.parse()?;
            let rows = AnalysisTableDataset { path: table.clone() }
                .load()
                .with_context(|| format!("loading {}", table.display()))?;
            let result = answer(query, &rows)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{result}");
            }
        }
        Command::InitConfig { path } => {
            let path = path.or(args.config).unwrap_or_else(default_config_path);
            write_default_config(&path)?;
            println!("Configuration written to {}", path.display());
        }
    }

    Ok(())
}

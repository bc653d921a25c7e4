//! contractiq binary
//!
//! Extracts clauses from a contract file, or runs the full risk analysis
//! against a directory of policy documents. Results go to stdout as JSON;
//! logs go to stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clause_engine::{ClauseExtractor, ExtractionConfig, NoopSegmenter, CANDIDATE_MARKER};
use completion_oracle::stub::ScriptedOracle;
use completion_oracle::{CompletionOracle, GroqClient, OracleError};
use contract_corpus::{load_document, CorpusConfig, InMemoryDocumentSource, PolicyIndex};
use risk_engine::{AnalysisConfig, ContractAnalyzer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "contractiq")]
#[command(version, about = "Legal clause extraction and contract risk analysis")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Run without the completion service: clauses pass through unrefined and
    /// every risk stage falls back to its error result
    #[arg(long, global = true)]
    offline: bool,

    /// Disable semantic enhancement (pattern matches only)
    #[arg(long, global = true)]
    no_semantic: bool,

    /// Refine clauses one at a time instead of concurrently
    #[arg(long, global = true)]
    sequential: bool,

    /// Per-call oracle deadline in seconds
    #[arg(long, global = true, default_value = "60")]
    timeout_secs: u64,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract one clause per type from a contract
    Extract {
        /// Contract file (.txt, .md or .pdf)
        file: PathBuf,
    },
    /// Extract clauses, score their risk and check the contract against policies
    Analyze {
        /// Contract file (.txt, .md or .pdf)
        file: PathBuf,

        /// Directory of policy documents (overrides CONTRACTIQ_POLICY_DIR)
        #[arg(long)]
        policies: Option<PathBuf>,

        /// Directory for a persistent policy index (overrides CONTRACTIQ_INDEX_PATH)
        #[arg(long)]
        index: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries the JSON result, so logs go to stderr
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting contractiq v{}", env!("CARGO_PKG_VERSION"));

    let oracle = build_oracle(args.offline)?;
    let extractor = build_extractor(&args, oracle.clone());

    let output = match &args.command {
        Command::Extract { file } => {
            let document = load_document(file)
                .with_context(|| format!("Failed to load {}", file.display()))?;
            let clauses = extractor.extract(&document.text).await?;
            serde_json::to_string_pretty(&clauses)?
        }
        Command::Analyze {
            file,
            policies,
            index,
        } => {
            let analysis = analyze(
                &args,
                file,
                policies.as_deref(),
                index.as_deref(),
                oracle,
                extractor,
            )
            .await?;
            serde_json::to_string_pretty(&analysis)?
        }
    };

    println!("{}", output);
    Ok(())
}

async fn analyze(
    args: &Args,
    file: &Path,
    policies: Option<&Path>,
    index: Option<&Path>,
    oracle: Arc<dyn CompletionOracle>,
    extractor: ClauseExtractor,
) -> anyhow::Result<shared_types::ContractAnalysis> {
    let mut corpus = CorpusConfig::from_env();
    if let Some(dir) = policies {
        corpus = corpus.with_policy_dir(dir);
    }
    if let Some(path) = index {
        corpus = corpus.with_index_path(path);
    }
    if corpus.policy_dir.is_none() && corpus.index_path.is_none() {
        tracing::warn!("No policy directory given, the policy check will report missing policies");
    }

    let policy_index = PolicyIndex::from_config(&corpus).context("Failed to build policy index")?;

    let documents = Arc::new(InMemoryDocumentSource::new());
    let document =
        load_document(file).with_context(|| format!("Failed to load {}", file.display()))?;
    let document_id = documents.add_loaded(document);

    let config =
        AnalysisConfig::default().with_oracle_timeout(Duration::from_secs(args.timeout_secs));
    let analyzer = ContractAnalyzer::new(documents, Arc::new(policy_index), oracle)
        .with_extractor(extractor)
        .with_config(config);

    Ok(analyzer.analyze(&document_id).await?)
}

fn build_oracle(offline: bool) -> anyhow::Result<Arc<dyn CompletionOracle>> {
    if offline {
        tracing::info!("Offline mode: no completion service calls");
        return Ok(Arc::new(offline_oracle()));
    }

    let client = GroqClient::from_env()
        .context("Completion service not configured (set GROQ_API_KEY or pass --offline)")?;
    tracing::info!(model = %client.config().model, "Using completion service");
    Ok(Arc::new(client))
}

/// Hands refinement candidates back unchanged and fails every other request
fn offline_oracle() -> ScriptedOracle {
    ScriptedOracle::new(|request| match request.prompt.rfind(CANDIDATE_MARKER) {
        Some(pos) => Ok(request.prompt[pos + CANDIDATE_MARKER.len()..].to_string()),
        None => Err(OracleError::Network("offline mode".to_string())),
    })
}

fn build_extractor(args: &Args, oracle: Arc<dyn CompletionOracle>) -> ClauseExtractor {
    let config = ExtractionConfig::default()
        .with_oracle_timeout(Duration::from_secs(args.timeout_secs))
        .with_parallel_refinement(!args.sequential);

    let extractor = ClauseExtractor::new(oracle).with_config(config);
    if args.no_semantic {
        extractor.with_segmenter(Box::new(NoopSegmenter))
    } else {
        extractor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use completion_oracle::CompletionRequest;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_analyze_flags() {
        let args = Args::try_parse_from([
            "contractiq",
            "analyze",
            "msa.pdf",
            "--policies",
            "policies/",
            "--offline",
            "--sequential",
        ])
        .unwrap();

        assert!(args.offline);
        assert!(args.sequential);
        assert!(!args.no_semantic);
        assert_eq!(args.timeout_secs, 60);
        match args.command {
            Command::Analyze { file, policies, index } => {
                assert_eq!(file, PathBuf::from("msa.pdf"));
                assert_eq!(policies, Some(PathBuf::from("policies/")));
                assert_eq!(index, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_extract_requires_file() {
        assert!(Args::try_parse_from(["contractiq", "extract"]).is_err());
    }

    #[tokio::test]
    async fn test_offline_oracle_passes_candidates_through() {
        let oracle = offline_oracle();

        let refine = CompletionRequest::new(
            "system",
            format!("Check this.\n\n{}Clause text.", CANDIDATE_MARKER),
        );
        assert_eq!(oracle.complete(&refine).await.unwrap(), "Clause text.");

        let assess = CompletionRequest::new("system", "Clause Type: termination");
        assert!(matches!(
            oracle.complete(&assess).await,
            Err(OracleError::Network(_))
        ));
    }

    #[test]
    fn test_no_semantic_disables_enhancer() {
        let args =
            Args::try_parse_from(["contractiq", "extract", "a.txt", "--offline", "--no-semantic"])
                .unwrap();
        let extractor = build_extractor(&args, Arc::new(offline_oracle()));
        let text = "The parties agree that payment of every invoice is due within thirty days.";
        assert!(extractor.candidates(text).unwrap().is_empty());
    }
}

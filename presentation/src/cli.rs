use application::ingest_service::IngestService;
use application::query_service::QueryService;
use clap::{Parser, Subcommand};
use colored::Colorize;
use domain::profile::{Domain, IndexMode};
use infrastructure::config::Config;
use infrastructure::openai_client::OpenAiClient;
use infrastructure::pinecone_client::PineconeClient;
use shared::telemetry::Telemetry;
use shared::types::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ragdesk")]
#[command(about = "Grounded Q&A agent over a vector index of reference data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ingest a CSV reference file into the domain's vector index
    Ingest {
        /// Target domain: health or order
        #[arg(long)]
        domain: Domain,

        /// Path to the comma-delimited reference file
        #[arg(long)]
        file: PathBuf,

        /// Override the reindexing policy (rebuild or append)
        #[arg(long)]
        mode: Option<IndexMode>,
    },

    /// Ask a question against the ingested reference data
    Ask {
        /// Target domain: health or order
        #[arg(long)]
        domain: Domain,

        /// The question to answer
        #[arg(trailing_var_arg = true, required = true)]
        question: Vec<String>,
    },
}

pub struct CliApp;

impl CliApp {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(&self, cli: Cli) -> Result<()> {
        let config = Config::load()?;
        match cli.command {
            Command::Ingest { domain, file, mode } => {
                self.run_ingest(&config, domain, &file, mode).await
            }
            Command::Ask { domain, question } => {
                self.run_ask(&config, domain, &question.join(" ")).await
            }
        }
    }

    async fn run_ingest(
        &self,
        config: &Config,
        domain: Domain,
        file: &PathBuf,
        mode: Option<IndexMode>,
    ) -> Result<()> {
        let telemetry = Telemetry::new();
        let openai = Arc::new(OpenAiClient::new(config));
        let pinecone = Arc::new(PineconeClient::new(config));
        let service = IngestService::new(
            pinecone,
            openai,
            domain,
            config.embedding_dimension,
            mode.unwrap_or(config.index_mode),
            Duration::from_secs(config.settle_seconds),
        );

        let report = service.ingest(file).await?;
        println!(
            "{} {} seen, {} rejected, {} stored, {} failed",
            "Ingested:".green().bold(),
            report.seen,
            report.rejected,
            report.stored,
            report.failed
        );
        println!("{} {:.1?}", "Elapsed:".dimmed(), telemetry.elapsed());
        Ok(())
    }

    async fn run_ask(&self, config: &Config, domain: Domain, question: &str) -> Result<()> {
        let telemetry = Telemetry::new();
        let openai = Arc::new(OpenAiClient::new(config));
        let pinecone = Arc::new(PineconeClient::new(config));
        let service = QueryService::new(
            openai.clone(),
            openai,
            pinecone,
            domain,
            config.context_char_limit,
        );

        let outcome = service.answer(question).await?;
        println!(
            "{} {} ({})",
            "Category:".cyan().bold(),
            outcome.category,
            outcome.raw_label.trim()
        );
        println!(
            "{} {} document(s)",
            "Context:".cyan().bold(),
            outcome.documents.len()
        );
        println!("{}\n{}", "Answer:".cyan().bold(), outcome.answer);
        println!("{} {:.1?}", "Elapsed:".dimmed(), telemetry.elapsed());
        Ok(())
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

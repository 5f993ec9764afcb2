//! PhenoPed — pedigree to patient record converter.
//! Entry point for the `phenoped` binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use phenoped_common::{PhenopedConfig, VocabularySource};
use phenoped_pedigree::{PedigreeDocument, PedigreeProcessor};
use phenoped_vocab::{InMemoryVocabulary, Vocabulary};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "phenoped", version, about = "Convert pedigree JSON into patient records")]
struct Cli {
    /// Config file (TOML, YAML or JSON); defaults to $PHENOPED_CONFIG or ./phenoped.toml
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a pedigree file and print the patient records as JSON
    Convert {
        /// Pedigree JSON file
        pedigree: PathBuf,
        /// OMIM term table (path or http(s) URL), overrides the config
        #[arg(long)]
        omim: Option<String>,
        /// HPO term table (path or http(s) URL), overrides the config
        #[arg(long)]
        hpo: Option<String>,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
        /// Print records together with the conversion issues
        #[arg(long)]
        report: bool,
    },
    /// Print the effective configuration as TOML
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the JSON output, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("phenoped=debug,info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match cli.config {
        Some(ref path) => PhenopedConfig::from_path(path)?,
        None => PhenopedConfig::load()?,
    };

    match cli.command {
        Command::CheckConfig => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
        Command::Convert { pedigree, omim, hpo, pretty, report } => {
            if let Some(ref arg) = omim {
                config.vocabularies.omim = source_from_arg(arg);
            }
            if let Some(ref arg) = hpo {
                config.vocabularies.hpo = source_from_arg(arg);
            }

            let omim = load_vocabulary("omim", &config.vocabularies.omim).await?;
            let hpo = load_vocabulary("hpo", &config.vocabularies.hpo).await?;

            let document = PedigreeDocument::from_file(&pedigree, &config.pedigree)
                .with_context(|| format!("could not read pedigree {}", pedigree.display()))?;
            let processor = PedigreeProcessor::with_config(hpo, omim, &config);
            let outcome = processor.convert_with_report(Some(&document));
            info!("{} records, {} issues", outcome.records.len(), outcome.issues.len());

            let output = if report {
                serde_json::to_value(&outcome)?
            } else {
                serde_json::to_value(&outcome.records)?
            };
            let rendered = if pretty {
                serde_json::to_string_pretty(&output)?
            } else {
                serde_json::to_string(&output)?
            };
            println!("{rendered}");
        }
    }

    Ok(())
}

/// `http://` / `https://` arguments are downloaded, anything else is a file path.
fn source_from_arg(arg: &str) -> VocabularySource {
    if arg.starts_with("http://") || arg.starts_with("https://") {
        VocabularySource { path: None, url: Some(arg.to_string()) }
    } else {
        VocabularySource { path: Some(arg.to_string()), url: None }
    }
}

async fn load_vocabulary(
    name: &str,
    source: &VocabularySource,
) -> anyhow::Result<Arc<dyn Vocabulary>> {
    let vocab = match (&source.path, &source.url) {
        (Some(path), _) => InMemoryVocabulary::from_path(name, path)
            .with_context(|| format!("could not load {name} vocabulary from {path}"))?,
        (None, Some(url)) => InMemoryVocabulary::from_url(name, url)
            .await
            .with_context(|| format!("could not download {name} vocabulary from {url}"))?,
        (None, None) => {
            warn!("No {} vocabulary configured; its lookups will find nothing", name);
            InMemoryVocabulary::from_terms(name, Vec::new())
        }
    };
    Ok(Arc::new(vocab))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_arg() {
        assert_eq!(source_from_arg("data/omim.tsv").path.as_deref(), Some("data/omim.tsv"));
        let remote = source_from_arg("https://example.org/hpo.tsv");
        assert!(remote.path.is_none());
        assert_eq!(remote.url.as_deref(), Some("https://example.org/hpo.tsv"));
    }

    #[test]
    fn test_cli_parses_convert() {
        let args = ["phenoped", "convert", "family.json", "--omim", "omim.tsv", "--pretty"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Convert { pedigree, omim, hpo, pretty, report } => {
                assert_eq!(pedigree, PathBuf::from("family.json"));
                assert_eq!(omim.as_deref(), Some("omim.tsv"));
                assert!(hpo.is_none());
                assert!(pretty);
                assert!(!report);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_vocabulary_is_empty() {
        let vocab = load_vocabulary("hpo", &VocabularySource::default()).await.unwrap();
        assert!(vocab.get_term("HP:0001250").unwrap().is_none());
    }
}

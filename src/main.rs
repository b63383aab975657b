use std::path::PathBuf;

use adfp::{
    CompareConfig, ComparisonRequest, HashAlgorithm, PerceptualConfig, fingerprint_files,
    local_comparator,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "adfp")]
#[command(about = "Perceptual fingerprints for ad creatives", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print one `path<TAB>fingerprint` line per image
    Hash {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// phash, dhash or ahash
        #[arg(long, default_value_t = HashAlgorithm::PHash)]
        algorithm: HashAlgorithm,
        /// Side of the bit grid; 8 gives 64-bit fingerprints
        #[arg(long, default_value_t = 8)]
        hash_size: u32,
        /// Hash files on all cores
        #[arg(long)]
        parallel: bool,
    },
    /// Cross-compare local images and print the result as JSON
    Compare {
        files: Vec<PathBuf>,
        /// Distances strictly below this count as similar
        #[arg(long, default_value_t = adfp::DEFAULT_SIMILARITY_THRESHOLD)]
        threshold: u32,
        /// Directory holding `<reference_id>/` creative folders
        #[arg(long, requires = "reference_id")]
        reference_root: Option<PathBuf>,
        /// Campaign whose creatives the inputs are compared against
        #[arg(long, requires = "reference_root")]
        reference_id: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Hash {
            files,
            algorithm,
            hash_size,
            parallel,
        } => {
            let cfg = PerceptualConfig::default()
                .with_algorithm(algorithm)
                .with_hash_size(hash_size)
                .with_parallel(parallel);
            cfg.validate()?;

            for (path, result) in files.iter().zip(fingerprint_files(files.as_slice(), &cfg)) {
                match result {
                    Ok(fp) => println!("{}\t{fp}", path.display()),
                    Err(err) => println!("{}\terror: {err}", path.display()),
                }
            }
        }
        Commands::Compare {
            files,
            threshold,
            reference_root,
            reference_id,
        } => {
            let perceptual = PerceptualConfig::default().with_similarity_threshold(threshold);
            // Local runs are not bound by the HTTP request cap.
            let config = CompareConfig::default().with_max_images(files.len().max(1));
            let comparator = local_comparator(perceptual, config, reference_root)?;

            let urls = files.iter().map(|p| p.display().to_string());
            let mut request = ComparisonRequest::new(urls);
            if let Some(id) = reference_id {
                request = request.with_reference(id);
            }

            let runtime = tokio::runtime::Runtime::new()?;
            let result = runtime.block_on(comparator.compare_images(request))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn reference_flags_require_each_other() {
        for args in [
            ["adfp", "compare", "a.png", "--reference-id", "camp-1"],
            ["adfp", "compare", "a.png", "--reference-root", "refs"],
        ] {
            let err = Cli::try_parse_from(args).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        }

        let cli = Cli::try_parse_from([
            "adfp",
            "compare",
            "a.png",
            "--reference-root",
            "refs",
            "--reference-id",
            "camp-1",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Compare { reference_id: Some(ref id), .. } if id == "camp-1"
        ));
    }
}

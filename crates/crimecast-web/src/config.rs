//! Command-line and environment configuration for the web server.

use std::path::PathBuf;

use clap::Parser;
use crimecast_model::ArtifactPaths;

#[derive(Debug, Parser)]
#[command(name = "crimecast-web", version, about = "Serve crime category predictions from a web form")]
pub struct Args {
    /// Address to listen on.
    #[arg(long, env = "CRIMECAST_BIND", default_value = "127.0.0.1:5000")]
    pub bind: String,

    /// Directory holding xgb_model.json, col_names.json and crime_categories.json.
    #[arg(long, env = "CRIMECAST_ARTIFACTS", default_value = ".")]
    pub artifacts: PathBuf,

    /// Override the model path.
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Override the column-name list path.
    #[arg(long)]
    pub columns: Option<PathBuf>,

    /// Override the category map path.
    #[arg(long)]
    pub categories: Option<PathBuf>,

    /// HTTP worker threads (defaults to the number of CPUs).
    #[arg(long, env = "CRIMECAST_WORKERS")]
    pub workers: Option<usize>,
}

impl Args {
    /// Artifact locations, with per-file overrides applied over the directory defaults.
    pub fn artifact_paths(&self) -> ArtifactPaths {
        let mut paths = ArtifactPaths::in_dir(&self.artifacts);
        if let Some(p) = &self.model {
            paths.model = p.clone();
        }
        if let Some(p) = &self.columns {
            paths.columns = p.clone();
        }
        if let Some(p) = &self.categories {
            paths.categories = p.clone();
        }
        paths
    }
}

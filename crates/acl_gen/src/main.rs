use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use acl_gen::prelude::*;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "acl-gen")]
#[command(about = "Add an access control entry to LoopBack model definitions")]
#[command(version)]
struct Cli {
    /// Project root (default: current directory)
    #[arg(long, default_value = ".")]
    project: PathBuf,

    /// Model directories, relative to the project root
    #[arg(long, value_delimiter = ',')]
    model_dirs: Option<Vec<PathBuf>>,

    /// Component configuration file, relative to the project root
    #[arg(long)]
    component_config: Option<PathBuf>,

    /// Method discovery helper command (e.g. "node bin/list-methods.js")
    #[arg(long)]
    discovery_helper: Option<String>,

    /// Seconds to wait for method discovery
    #[arg(long, default_value_t = 5)]
    discovery_timeout: u64,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> GeneratorOptions {
        let mut builder = GeneratorOptions::builder()
            .project_root(&self.project)
            .discovery_timeout(Duration::from_secs(self.discovery_timeout));

        if let Some(dirs) = &self.model_dirs {
            builder = builder.model_dirs(dirs.clone());
        }
        if let Some(path) = &self.component_config {
            builder = builder.component_config_path(path);
        }
        if let Some(helper) = &self.discovery_helper {
            let command: Vec<String> = helper.split_whitespace().map(String::from).collect();
            if !command.is_empty() {
                builder = builder.discovery_helper(command);
            }
        }
        builder.build()
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "acl_gen=debug" } else { "acl_gen=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let generator = AclGenerator::new(cli.options(), Arc::new(TerminalPrompter));

    match generator.run().await {
        Ok(summary) => {
            for model in &summary.written {
                println!("Added ACL entry to {}", model);
            }
            if let Some(server) = &summary.auth_server_added {
                println!("Registered auth server {}", server.display());
            }
            ExitCode::SUCCESS
        }
        // Already reported while writing
        Err(AclGenError::Validation { .. }) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "krmgen")]
#[command(about = "Synthesize and merge Kubernetes manifests from declarative intent")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Input ResourceList file (reads stdin when omitted)
    #[arg(short, long, global = true)]
    pub input: Option<PathBuf>,

    /// Output file (writes stdout when omitted)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Log level filter (RUST_LOG takes precedence)
    #[arg(long, global = true, env = "KRMGEN_LOG", default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inject derived route entries into existing routing resources
    InjectRoutes,
    /// Regenerate the networking resources: routes, service, certificate
    Networking,
    /// Expand workload intent documents into controllers, services and autoscalers
    Workloads,
}

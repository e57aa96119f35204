use anyhow::Context;
use chaldeploy::{
    cluster::{credentials, ClusterClient, KubeCluster},
    config::ManagerConfig,
    resources::{self, TeamIdentity},
    telemetry, utils,
};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "chaldeploy")]
#[command(about = "Inspect the per-team challenge instances chaldeploy manages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the manifests a team's instance is created from
    Render {
        team_id: String,

        /// Recorded as an annotation only
        #[arg(long)]
        display_name: Option<String>,
    },

    /// Ask the cluster whether a team's instance namespace exists
    Probe { team_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    let config = ManagerConfig::load().context("loading configuration")?;
    info!("Configuration loaded");

    match cli.command {
        Commands::Render {
            team_id,
            display_name,
        } => {
            let mut team = TeamIdentity::new(team_id);
            if let Some(name) = display_name {
                team = team.with_display_name(name);
            }
            let descriptors = resources::build_descriptors(&team, &config)?;
            let documents = [
                serde_yaml::to_string(&descriptors.namespace)?,
                serde_yaml::to_string(&descriptors.workload.deployment)?,
                serde_yaml::to_string(&descriptors.workload.service)?,
            ];
            print!("{}", documents.join("---\n"));
        }
        Commands::Probe { team_id } => {
            let client = credentials::connect(&config).await?;
            info!("Connected to Kubernetes cluster");
            let cluster = KubeCluster::new(client);

            let name = utils::resource_name(&config.challenge_name, &team_id);
            let lookup = tokio::time::timeout(
                config.cluster_call_timeout(),
                cluster.get_namespace(&name),
            )
            .await
            .context("namespace lookup timed out")??;
            println!("{}: {:?}", name, lookup);
        }
    }

    Ok(())
}

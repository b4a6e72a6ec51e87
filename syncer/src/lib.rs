use std::path::PathBuf;
use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use url::Url;

pub mod client;
pub mod convert;
pub mod feed;
pub mod marker;
pub mod syncer;

pub use syncer::{CveSyncer, SyncError};

#[derive(clap::Args, Debug)]
#[command(
    about = "Mirror the NVD CVE API into legacy 1.1 feed files",
    args_conflicts_with_subcommands = true
)]
pub struct Run {
    /// Directory holding the feed files and the sync marker.
    #[arg(long, env = "NVD_DB_DIR")]
    pub db_dir: PathBuf,

    #[arg(long, env = "NVD_API_URL", default_value = client::NVD_API_URL)]
    pub api_url: Url,

    /// Raises the NVD rate limit when set.
    #[arg(long, env = "NVD_API_KEY")]
    pub api_key: Option<String>,

    /// Minimum wait between page requests.
    #[arg(long, default_value = "6s")]
    pub page_interval: humantime::Duration,
}

impl Run {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let client = reqwest::Client::new();
        let nvd = client::NvdClient::new(client, self.api_url, self.api_key);

        let mut syncer = CveSyncer::new(nvd, self.db_dir);
        syncer.page_interval = self.page_interval.into();

        let cancel = CancellationToken::new();
        {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("Shutdown requested, stopping after the current operation");
                    cancel.cancel();
                }
            });
        }

        syncer.run(&cancel).await?;

        Ok(ExitCode::SUCCESS)
    }
}

//! CLI subcommand implementations.

pub mod backfill_vendor_prices;
pub mod export_addon;
pub mod export_recipes;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use frugalforge_lib::wowhead_api::user_agent::DEFAULT_USER_AGENT;
use frugalforge_lib::wowhead_api::Client;
use frugalforge_lib::{CachedClient, DiskCache};
use indicatif::{ProgressBar, ProgressStyle};

/// Network options shared by the scraping subcommands.
#[derive(Args)]
pub struct FetchArgs {
    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Override the Wowhead base URL
    #[arg(long, default_value = "https://www.wowhead.com", hide = true)]
    pub pages_base_url: String,

    /// Override the wago.tools base URL
    #[arg(long, default_value = "https://wago.tools", hide = true)]
    pub db_base_url: String,
}

impl FetchArgs {
    /// Disk-cached client rooted at `cache_dir`, sleeping `delay_seconds` after each network fetch.
    pub fn cached_client(
        &self,
        cache_dir: &std::path::Path,
        delay_seconds: f64,
    ) -> Result<CachedClient<DiskCache>> {
        let Ok(delay) = Duration::try_from_secs_f64(delay_seconds) else {
            bail!("request delay must be a non-negative number of seconds");
        };
        let client =
            Client::with_base_urls(&self.pages_base_url, &self.db_base_url, &self.user_agent)
                .context("Failed to create page client")?;
        Ok(CachedClient::new(client, DiskCache::new(cache_dir)).with_request_delay(delay))
    }
}

pub fn progress_bar(len: usize, message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} ({eta}) {msg}",
    ) {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb
}

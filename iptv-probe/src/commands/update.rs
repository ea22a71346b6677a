use super::browser::{self, BrowserArgs};
use crate::{channels::Channels, sniffer::Sniffer};
use anyhow::Result;
use clap::Args;
use log::info;
use std::path::PathBuf;

/// Probe the web page of every channel and store the detected streams.
#[derive(Args, Clone, Debug)]
pub struct Update {
    /// Channel list in json format.
    #[arg(long, default_value = "channels.json")]
    channels: PathBuf,

    /// Keep the query string of detected urls.
    #[arg(long)]
    keep_query: bool,

    #[command(flatten)]
    browser: BrowserArgs,
}

impl Update {
    pub fn execute(self) -> Result<()> {
        browser::handle_ctrlc();

        let sniffer = Sniffer::launch(self.browser.sniffer_options()?)?;
        let (updated, total) =
            Channels::update_file(&self.channels, self.keep_query, |web| sniffer.sniff(web))?;

        info!(
            "Updated {} of {} channels in {}",
            updated,
            total,
            self.channels.display()
        );
        Ok(())
    }
}

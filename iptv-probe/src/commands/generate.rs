use crate::{
    channels::Channels,
    playlist::{self, PlaylistOptions},
};
use anyhow::Result;
use clap::Args;
use log::info;
use std::path::PathBuf;

/// Write an extended M3U playlist from the channel list.
#[derive(Args, Clone, Debug)]
pub struct Generate {
    /// Channel list in json format.
    #[arg(long, default_value = "channels.json")]
    channels: PathBuf,

    /// Path of the generated playlist.
    #[arg(short, long, default_value = "playlist.m3u")]
    output: PathBuf,

    /// Electronic program guide advertised in the playlist header.
    #[arg(long, default_value = playlist::TVG_URL)]
    tvg_url: String,

    /// Group title given to every channel.
    #[arg(long, default_value = playlist::GROUP)]
    group: String,

    /// Base url which channel logo file names are appended to.
    #[arg(long, default_value = playlist::LOGO_BASE)]
    logo_base: String,
}

impl Generate {
    pub fn execute(self) -> Result<()> {
        let channels = Channels::load(&self.channels)?;
        let options = PlaylistOptions {
            tvg_url: self.tvg_url,
            group: self.group,
            logo_base: self.logo_base,
        };

        playlist::write(&self.output, &channels, &options)?;
        info!(
            "Wrote {} channels to {}",
            channels.iter().filter(|x| x.stream().is_some()).count(),
            self.output.display()
        );
        Ok(())
    }
}

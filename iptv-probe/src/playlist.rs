use crate::channels::{Channel, Channels};
use anyhow::{Context, Result};
use log::warn;
use std::{fmt::Write, fs, path::Path};

pub const TVG_URL: &str = "https://github.com/GreekTVApp/EPG-GRCY/releases/download/EPG/epg.xml.gz";
pub const GROUP: &str = "Greece";
pub const LOGO_BASE: &str = "https://raw.githubusercontent.com/jonian/greek-iptv/master/logos";

#[derive(Clone, Debug)]
pub struct PlaylistOptions {
    pub tvg_url: String,
    pub group: String,
    pub logo_base: String,
}

impl Default for PlaylistOptions {
    fn default() -> Self {
        Self {
            tvg_url: TVG_URL.to_owned(),
            group: GROUP.to_owned(),
            logo_base: LOGO_BASE.to_owned(),
        }
    }
}

impl PlaylistOptions {
    fn logo(&self, channel: &Channel) -> String {
        format!("{}/{}", self.logo_base.trim_end_matches('/'), channel.logo)
    }

    fn info(&self, channel: &Channel) -> String {
        format!(
            "#EXTINF:-1 group-title=\"{}\" tvg-name=\"{}\" tvg-logo=\"{}\",{}",
            self.group,
            channel.name,
            self.logo(channel),
            channel.title
        )
    }
}

/// Renders an extended M3U playlist. Channels without a stream are left out.
pub fn render(channels: &Channels, options: &PlaylistOptions) -> String {
    let mut playlist = format!("#EXTM3U url-tvg=\"{}\"\n", options.tvg_url);

    for channel in channels.iter() {
        let Some(m3u) = channel.stream() else {
            warn!("{}: no stream known, leaving it out of the playlist", channel.title);
            continue;
        };

        let _ = writeln!(playlist, "{}", options.info(channel));
        let _ = writeln!(playlist, "{}", m3u);
    }

    playlist
}

pub fn write<P: AsRef<Path>>(
    path: P,
    channels: &Channels,
    options: &PlaylistOptions,
) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, render(channels, options))
        .with_context(|| format!("could not write {}.", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let channels = Channels(vec![
            Channel {
                title: "ERT 1".to_owned(),
                name: "ERT1.gr".to_owned(),
                logo: "ert1.png".to_owned(),
                web: "https://ertflix.gr/ert1".to_owned(),
                m3u: Some("https://cdn.example.com/ert1/index.m3u8".to_owned()),
            },
            Channel {
                title: "Offline".to_owned(),
                name: "Offline.gr".to_owned(),
                logo: "offline.png".to_owned(),
                web: "https://offline.gr".to_owned(),
                m3u: None,
            },
        ]);

        assert_eq!(
            render(&channels, &PlaylistOptions::default()),
            "#EXTM3U url-tvg=\"https://github.com/GreekTVApp/EPG-GRCY/releases/download/EPG/epg.xml.gz\"\n\
             #EXTINF:-1 group-title=\"Greece\" tvg-name=\"ERT1.gr\" \
             tvg-logo=\"https://raw.githubusercontent.com/jonian/greek-iptv/master/logos/ert1.png\",ERT 1\n\
             https://cdn.example.com/ert1/index.m3u8\n"
        );
    }

    #[test]
    fn test_render_custom_options() {
        let options = PlaylistOptions {
            tvg_url: "http://epg/guide.xml".to_owned(),
            group: "News".to_owned(),
            logo_base: "http://logos/".to_owned(),
        };
        let channels = Channels(vec![Channel {
            title: "A".to_owned(),
            name: "a".to_owned(),
            logo: "a.png".to_owned(),
            web: String::new(),
            m3u: Some("http://a.m3u8".to_owned()),
        }]);

        let playlist = render(&channels, &options);
        assert!(playlist.starts_with("#EXTM3U url-tvg=\"http://epg/guide.xml\"\n"));
        assert!(
            playlist.contains(
                "group-title=\"News\" tvg-name=\"a\" tvg-logo=\"http://logos/a.png\",A\n"
            )
        );
        assert!(playlist.ends_with("http://a.m3u8\n"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(
            render(&Channels::default(), &PlaylistOptions::default()).lines().count(),
            1
        );
    }

    #[test]
    fn test_render_skips_empty_stream() {
        let channels = Channels(vec![Channel {
            title: "A".to_owned(),
            m3u: Some(String::new()),
            ..Default::default()
        }]);

        let playlist = render(&channels, &PlaylistOptions::default());
        assert!(!playlist.contains("#EXTINF"));
        assert_eq!(channels.iter().filter(|x| x.stream().is_some()).count(), 0);
    }
}

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Channel {
    pub title: String,
    pub name: String,
    pub logo: String,
    pub web: String,
    #[serde(default)]
    pub m3u: Option<String>,
}

impl Channel {
    /// Known stream url, empty values count as unknown.
    pub fn stream(&self) -> Option<&str> {
        self.m3u.as_deref().filter(|x| !x.is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Channels(pub Vec<Channel>);

impl Channels {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("could not read {}.", path.display()))?;
        let channels = serde_json::from_slice(&data)
            .with_context(|| format!("could not deserialize channels from {}.", path.display()))?;
        Ok(Self(channels))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut data = serde_json::to_string_pretty(&self.0)?;
        data.push('\n');
        fs::write(path, data).with_context(|| format!("could not write {}.", path.display()))
    }

    /// Runs `probe` against every channel's web page and stores the stream it finds.
    ///
    /// A channel keeps its previous stream when the probe finds nothing. Probe errors abort
    /// the whole update, leaving channels after the failing one untouched.
    pub fn update_with<F>(&mut self, keep_query: bool, mut probe: F) -> Result<usize>
    where
        F: FnMut(&str) -> Result<Option<String>>,
    {
        let mut updated = 0;

        for channel in &mut self.0 {
            if channel.web.trim().is_empty() {
                warn!("{}: no web page to probe, skipping", channel.title);
                continue;
            }

            match probe(&channel.web)? {
                Some(url) => {
                    let url = if keep_query {
                        url
                    } else {
                        strip_query(&url).to_owned()
                    };

                    channel.m3u = Some(url);
                    updated += 1;
                }
                None => warn!("{}: no stream detected, keeping previous one", channel.title),
            }

            info!(
                "{}: {}",
                channel.title,
                channel.m3u.as_deref().unwrap_or_default()
            );
        }

        Ok(updated)
    }

    /// Loads `path`, updates it with `probe` and writes it back.
    ///
    /// The file is written even when a probe error aborts the update, so streams found
    /// before the failing channel are kept.
    pub fn update_file<P, F>(path: P, keep_query: bool, probe: F) -> Result<(usize, usize)>
    where
        P: AsRef<Path>,
        F: FnMut(&str) -> Result<Option<String>>,
    {
        let path = path.as_ref();
        let mut channels = Self::load(path)?;
        info!("Loaded {} channels from {}", channels.len(), path.display());

        let result = channels.update_with(keep_query, probe);
        channels.save(path)?;
        Ok((result?, channels.len()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

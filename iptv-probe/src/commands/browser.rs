use crate::{
    cookie::{self, CookieParams},
    mime::{HLS_MIME_TYPES, MimeTypes},
    sniffer::{self, Filters, ResourceTypeCopy, SnifferOptions},
};
use anyhow::Result;
use clap::Args;
use log::warn;
use std::{path::PathBuf, sync::Once, time::Duration};

static CTRLC: Once = Once::new();

/// Browser options shared by the commands which load web pages.
#[derive(Args, Clone, Debug)]
pub struct BrowserArgs {
    /// Stop waiting for a stream after this many seconds, 0 waits forever.
    #[arg(long, default_value_t = 60, value_name = "SECONDS")]
    timeout: u64,

    /// Show the browser window instead of running headless.
    #[arg(long)]
    window: bool,

    /// Launch browser with a proxy.
    #[arg(long)]
    proxy: Option<String>,

    /// Path of the chrome or chromium executable, detected automatically by default.
    #[arg(long)]
    chrome: Option<PathBuf>,

    /// Disable the chrome sandbox, required when running as root.
    #[arg(long)]
    no_sandbox: bool,

    /// Fill browser with some existing cookies value.
    /// Cookies value can be same as document.cookie or in json format same as puppeteer.
    #[arg(long, default_value = "", hide_default_value = true, value_parser = cookie::parse_cookies)]
    cookies: CookieParams,

    /// Response mime types which are reported as streams, seperated by comma.
    #[arg(
        long,
        default_values_t = HLS_MIME_TYPES.map(|x| x.to_owned()),
        value_delimiter = ','
    )]
    mime_types: Vec<String>,

    /// Also report responses whose url ends with one of these extensions, seperated by comma.
    #[arg(long, value_delimiter = ',')]
    extensions: Vec<String>,

    /// List of resource types to be watched seperated by commas.
    #[arg(long, value_enum, default_values_t = [ResourceTypeCopy::All], value_delimiter = ',')]
    resource_types: Vec<ResourceTypeCopy>,
}

impl BrowserArgs {
    pub fn sniffer_options(self) -> Result<SnifferOptions> {
        let mime_types = MimeTypes::new(&self.mime_types);

        if mime_types.is_empty() && self.extensions.is_empty() {
            anyhow::bail!("at least one mime type or extension is required.");
        }

        Ok(SnifferOptions {
            headless: !self.window,
            proxy: self.proxy,
            chrome: self.chrome,
            sandbox: !self.no_sandbox,
            timeout: match self.timeout {
                0 => None,
                x => Some(Duration::from_secs(x)),
            },
            cookies: self.cookies,
            filters: Filters {
                mime_types,
                extensions: self.extensions,
                resource_types: self.resource_types,
            },
        })
    }
}

/// Routes CTRL+C to the sniffer. Safe to call more than once.
pub fn handle_ctrlc() {
    CTRLC.call_once(|| {
        if let Err(e) = ctrlc::set_handler(sniffer::interrupt) {
            warn!("could not set CTRL+C handler: {}", e);
        }
    });
}

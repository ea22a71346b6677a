use super::browser::{self, BrowserArgs};
use crate::{channels, sniffer::Sniffer};
use anyhow::{Result, bail};
use clap::Args;

/// Print the first HLS playlist url requested by a web page.
#[derive(Args, Clone, Debug)]
#[clap(long_about = "Print the first HLS playlist url requested by a web page.\n\n\
Requires any one of these browser to be installed:\n\
1. chrome - https://www.google.com/chrome\n\
2. chromium - https://www.chromium.org/getting-involved/download-chromium\n\n\
Loads the page in an incognito browser context and watches the responses it receives.\n\
The url of the first response served with an HLS mime type is printed on stdout and the browser exits.\n\
No requests are intercepted or modified.")]
pub struct Probe {
    /// http(s)://
    #[arg(required = true)]
    url: String,

    /// Remove the query string from the detected url.
    #[arg(long)]
    strip_query: bool,

    #[command(flatten)]
    browser: BrowserArgs,
}

impl Probe {
    pub fn execute(self) -> Result<()> {
        browser::handle_ctrlc();

        let options = self.browser.sniffer_options()?;
        let timeout = options.timeout;
        let sniffer = Sniffer::launch(options)?;

        match sniffer.sniff(&self.url)? {
            Some(url) if self.strip_query => println!("{}", channels::strip_query(&url)),
            Some(url) => println!("{}", url),
            None => bail!(
                "no stream detected within {} seconds.",
                timeout.map(|x| x.as_secs()).unwrap_or_default()
            ),
        }

        Ok(())
    }
}

use crate::{cookie, mime::MimeTypes};
use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use headless_chrome::{
    Browser, LaunchOptionsBuilder, Tab,
    browser::tab::NavigationFailed,
    protocol::cdp::{
        Network::{
            CookieParam, GetResponseBodyReturnObject, ResourceType,
            events::ResponseReceivedEventParams,
        },
        Target::DisposeBrowserContext,
    },
};
use log::{debug, info, trace, warn};
use std::{
    ffi::OsStr,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvTimeoutError},
    },
    time::{Duration, Instant},
};

const HANDLER_NAME: &str = "iptv-probe";
const POLL_INTERVAL: Duration = Duration::from_millis(200);
const WINDOW_SIZE: (u32, u32) = (1024, 576);

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Makes every running and future [`Sniffer::sniff`] call fail.
pub fn interrupt() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

#[derive(Clone, Debug)]
pub struct SnifferOptions {
    pub headless: bool,
    pub proxy: Option<String>,
    pub chrome: Option<PathBuf>,
    pub sandbox: bool,
    /// `None` waits until a stream shows up or CTRL+C is pressed.
    pub timeout: Option<Duration>,
    pub cookies: Vec<CookieParam>,
    pub filters: Filters,
}

impl Default for SnifferOptions {
    fn default() -> Self {
        Self {
            headless: true,
            proxy: None,
            chrome: None,
            sandbox: true,
            timeout: Some(Duration::from_secs(60)),
            cookies: Vec::new(),
            filters: Filters::default(),
        }
    }
}

impl SnifferOptions {
    fn idle_browser_timeout(&self) -> Duration {
        // The browser is torn down when it stays silent for this long.
        match self.timeout {
            Some(timeout) => timeout + Duration::from_secs(30),
            None => Duration::from_secs(60 * 60 * 24),
        }
    }
}

pub struct Sniffer {
    browser: Browser,
    /// Lives in the default context, used for browser level commands.
    control: Arc<Tab>,
    options: SnifferOptions,
}

impl Sniffer {
    pub fn launch(options: SnifferOptions) -> Result<Self> {
        info!(
            "Launching browser in {} mode",
            if options.headless {
                "headless (no window)"
            } else {
                "headful (window)"
            }
        );

        let launch_options = LaunchOptionsBuilder::default()
            .headless(options.headless)
            .sandbox(options.sandbox)
            .window_size(Some(WINDOW_SIZE))
            .ignore_certificate_errors(true)
            .path(options.chrome.clone())
            .proxy_server(options.proxy.as_deref())
            .idle_browser_timeout(options.idle_browser_timeout())
            .args(vec![OsStr::new("--mute-audio")])
            .build()?;

        let browser = Browser::new(launch_options)
            .context("could not launch chrome or chromium, is one of them installed?")?;
        let control = browser.new_tab()?;

        Ok(Self {
            browser,
            control,
            options,
        })
    }

    /// Loads `url` in a fresh incognito context and returns the first response url that
    /// passes the filters, or `None` once the timeout elapses or the page cannot be loaded.
    pub fn sniff(&self, url: &str) -> Result<Option<String>> {
        let context = self.browser.new_context()?;
        let result = self.sniff_in(&*context.new_tab()?, url);

        if let Err(e) = self.control.call_method(DisposeBrowserContext {
            browser_context_id: context.get_id().to_owned(),
        }) {
            debug!("could not dispose browser context: {}", e);
        }

        result
    }

    fn sniff_in(&self, tab: &Tab, url: &str) -> Result<Option<String>> {
        if !self.options.cookies.is_empty() {
            debug!("Setting {} cookies", self.options.cookies.len());
            tab.set_cookies(cookie::bind_to(&self.options.cookies, url))?;
        }

        let (tx, rx) = mpsc::channel();
        let filters = self.options.filters.clone();

        debug!("Registering response listener");
        tab.register_response_handling(
            HANDLER_NAME,
            Box::new(
                move |params: ResponseReceivedEventParams,
                      _: &dyn Fn() -> Result<GetResponseBodyReturnObject>| {
                    let response = params.response;
                    trace!("{:?} {} {}", params.Type, response.mime_type, response.url);

                    if filters.pass(&params.Type, &response.mime_type, &response.url) {
                        let _ = tx.send(response.url);
                    }
                },
            ),
        )?;

        info!("Navigating to {}", url);
        let result = match tab.navigate_to(url) {
            Ok(_) => wait(&rx, self.options.timeout, &INTERRUPTED),
            Err(e) if e.is::<NavigationFailed>() => {
                warn!("{}: {}", url, e);
                Ok(None)
            }
            Err(e) => Err(e.context(format!("could not navigate to {}.", url))),
        };

        debug!("Deregistering response listener and closing tab");
        let _ = tab.deregister_response_handling(HANDLER_NAME);
        let _ = tab.close(false);

        result
    }
}

/// Blocks until the first url arrives on `rx`, `timeout` elapses or `interrupted` is set.
fn wait(
    rx: &mpsc::Receiver<String>,
    timeout: Option<Duration>,
    interrupted: &AtomicBool,
) -> Result<Option<String>> {
    let deadline = timeout.map(|x| Instant::now() + x);

    loop {
        if interrupted.load(Ordering::SeqCst) {
            bail!("interrupted by CTRL+C signal.");
        }

        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(url) => {
                debug!("Detected {}", url);
                return Ok(Some(url));
            }
            Err(RecvTimeoutError::Timeout) => {
                if deadline.is_some_and(|x| Instant::now() >= x) {
                    return Ok(None);
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                bail!("browser stopped reporting responses before a stream was detected.")
            }
        }
    }
}

/// Decides which responses count as a detected stream.
#[derive(Clone, Debug)]
pub struct Filters {
    pub mime_types: MimeTypes,
    pub extensions: Vec<String>,
    pub resource_types: Vec<ResourceTypeCopy>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            mime_types: MimeTypes::default(),
            extensions: Vec::new(),
            resource_types: vec![ResourceTypeCopy::All],
        }
    }
}

impl Filters {
    pub fn pass(&self, resource_type: &ResourceType, mime_type: &str, url: &str) -> bool {
        let splitted_url = url.split('?').next().unwrap_or(url);
        let mime_matched = self.mime_types.matches(mime_type);
        let extension_matched = self
            .extensions
            .iter()
            .any(|x| splitted_url.ends_with(&(".".to_owned() + x.trim_start_matches('.'))));
        let resource_type_matched = self
            .resource_types
            .iter()
            .any(|x| match x.as_resource_type() {
                Some(_type) => &_type == resource_type,
                None => true,
            });

        (mime_matched || extension_matched) && resource_type_matched
    }
}

#[derive(Clone, Debug, PartialEq, ValueEnum)]
pub enum ResourceTypeCopy {
    All,
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    TextTrack,
    Xhr,
    Fetch,
    EventSource,
    WebSocket,
    Manifest,
    SignedExchange,
    Ping,
    CspViolationReport,
    Preflight,
    Other,
}

impl ResourceTypeCopy {
    fn as_resource_type(&self) -> Option<ResourceType> {
        Some(match self {
            ResourceTypeCopy::All => return None,
            ResourceTypeCopy::Document => ResourceType::Document,
            ResourceTypeCopy::Stylesheet => ResourceType::Stylesheet,
            ResourceTypeCopy::Image => ResourceType::Image,
            ResourceTypeCopy::Media => ResourceType::Media,
            ResourceTypeCopy::Font => ResourceType::Font,
            ResourceTypeCopy::Script => ResourceType::Script,
            ResourceTypeCopy::TextTrack => ResourceType::TextTrack,
            ResourceTypeCopy::Xhr => ResourceType::Xhr,
            ResourceTypeCopy::Fetch => ResourceType::Fetch,
            ResourceTypeCopy::EventSource => ResourceType::EventSource,
            ResourceTypeCopy::WebSocket => ResourceType::WebSocket,
            ResourceTypeCopy::Manifest => ResourceType::Manifest,
            ResourceTypeCopy::SignedExchange => ResourceType::SignedExchange,
            ResourceTypeCopy::Ping => ResourceType::Ping,
            ResourceTypeCopy::CspViolationReport => ResourceType::CspViolationReport,
            ResourceTypeCopy::Preflight => ResourceType::Preflight,
            ResourceTypeCopy::Other => ResourceType::Other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HLS_URL: &str = "https://cdn.example.com/live/index.m3u8?token=abc";

    #[test]
    fn test_default_filters_match_mime_type() {
        let filters = Filters::default();
        assert!(filters.pass(&ResourceType::Xhr, "application/vnd.apple.mpegurl", HLS_URL));
        assert!(filters.pass(&ResourceType::Media, "application/x-mpegURL", "https://a/b"));
        assert!(!filters.pass(&ResourceType::Xhr, "text/plain", HLS_URL));
        assert!(!filters.pass(&ResourceType::Document, "text/html", "https://a/"));
    }

    #[test]
    fn test_extension_fallback() {
        let filters = Filters {
            extensions: vec!["m3u8".to_owned(), ".m3u".to_owned()],
            ..Default::default()
        };
        assert!(filters.pass(&ResourceType::Xhr, "text/plain", HLS_URL));
        assert!(filters.pass(&ResourceType::Xhr, "", "https://a/list.m3u"));
        assert!(!filters.pass(&ResourceType::Xhr, "text/plain", "https://a/b.ts?x=.m3u8"));
    }

    #[test]
    fn test_resource_types() {
        let filters = Filters {
            resource_types: vec![ResourceTypeCopy::Xhr, ResourceTypeCopy::Fetch],
            ..Default::default()
        };
        assert!(filters.pass(&ResourceType::Fetch, "application/x-mpegURL", HLS_URL));
        assert!(!filters.pass(&ResourceType::Media, "application/x-mpegURL", HLS_URL));
    }

    #[test]
    fn test_idle_browser_timeout() {
        let options = SnifferOptions {
            timeout: Some(Duration::from_secs(10)),
            ..Default::default()
        };
        assert_eq!(options.idle_browser_timeout(), Duration::from_secs(40));

        let options = SnifferOptions {
            timeout: None,
            ..Default::default()
        };
        assert!(options.idle_browser_timeout() >= Duration::from_secs(60 * 60));
    }

    #[test]
    fn test_wait_returns_first_url() {
        let (tx, rx) = mpsc::channel();
        tx.send("https://a/first.m3u8".to_owned()).unwrap();
        tx.send("https://a/second.m3u8".to_owned()).unwrap();

        let url = wait(&rx, Some(Duration::from_secs(5)), &AtomicBool::new(false)).unwrap();
        assert_eq!(url.as_deref(), Some("https://a/first.m3u8"));
    }

    #[test]
    fn test_wait_times_out() {
        let (_tx, rx) = mpsc::channel::<String>();
        let started = Instant::now();

        let url = wait(&rx, Some(Duration::from_millis(50)), &AtomicBool::new(false)).unwrap();
        assert_eq!(url, None);
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_wait_disconnected() {
        let (tx, rx) = mpsc::channel::<String>();
        drop(tx);
        assert!(wait(&rx, None, &AtomicBool::new(false)).is_err());
    }

    #[test]
    fn test_wait_interrupted() {
        let (_tx, rx) = mpsc::channel::<String>();
        let error = wait(&rx, None, &AtomicBool::new(true)).unwrap_err();
        assert!(error.to_string().contains("CTRL+C"));
    }
}

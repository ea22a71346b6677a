/*
    REFERENCES
    ----------

    1. https://docs.rs/headless_chrome/1.0.17/headless_chrome/protocol/cdp/Network/struct.CookieParam.html

*/

use cookie::Cookie;
use headless_chrome::protocol::cdp::Network::CookieParam;
use std::{fs, path::Path};

pub type CookieParams = Vec<CookieParam>;

/// Parses cookies from a puppeteer style json file or a `document.cookie` string.
pub fn parse_cookies(s: &str) -> Result<CookieParams, String> {
    if s.is_empty() {
        Ok(Vec::new())
    } else if Path::new(s).exists() {
        serde_json::from_slice::<CookieParams>(
            &fs::read(s).map_err(|_| format!("could not read {}.", s))?,
        )
        .map_err(|_| format!("could not deserialize cookies from {}.", s))
    } else {
        Cookie::split_parse(s)
            .map(|cookie| {
                cookie
                    .map(|x| param(x.name(), x.value()))
                    .map_err(|_| "could not split parse cookies.".to_owned())
            })
            .collect()
    }
}

/// Chrome refuses cookies that have neither an url nor a domain.
pub fn bind_to(cookies: &[CookieParam], url: &str) -> CookieParams {
    cookies
        .iter()
        .cloned()
        .map(|mut x| {
            if x.url.is_none() && x.domain.is_none() {
                x.url = Some(url.to_owned());
            }
            x
        })
        .collect()
}

fn param(name: &str, value: &str) -> CookieParam {
    CookieParam {
        name: name.to_owned(),
        value: value.to_owned(),
        url: None,
        domain: None,
        path: None,
        secure: None,
        http_only: None,
        same_site: None,
        expires: None,
        priority: None,
        same_party: None,
        source_scheme: None,
        source_port: None,
        partition_key: None,
    }
}

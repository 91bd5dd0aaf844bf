// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

/// Root of the accident archive. Detail pages live at
/// `{BASE_URL}/{year}/{year}-{page}.htm`, one accident per page,
/// numbered from 1.
pub const BASE_URL: &str = "https://www.planecrashinfo.com";

/// Build the detail-page URL for a (year, page) pair.
pub fn page_url(year: i32, page: u32) -> String {
    format!("{}/{}/{}-{}.htm", BASE_URL, year, year, page)
}

/// Outcome of fetching one detail page.
#[derive(Debug)]
pub enum PageFetch {
    /// HTTP 200; the raw HTML body.
    Body(String),
    /// The year has no page with this number. Ends pagination for the year.
    Exhausted,
}

/// Fetch a single detail page. Any non-success status maps to
/// [`PageFetch::Exhausted`]; a server error is indistinguishable from
/// running past the last page, so it ends the year the same way (logged
/// at warn so a premature truncation shows up in the logs). Transport
/// errors propagate.
pub async fn fetch_page(client: &Client, year: i32, page: u32) -> Result<PageFetch> {
    let url = page_url(year, page);
    debug!(%url, "fetching page");

    let resp = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("GET {}", url))?;

    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        debug!(%url, "page does not exist; year exhausted");
        return Ok(PageFetch::Exhausted);
    }
    if !status.is_success() {
        warn!(%url, %status, "non-success status; treating year as exhausted");
        return Ok(PageFetch::Exhausted);
    }

    let body = resp
        .text()
        .await
        .with_context(|| format!("reading body from {}", url))?;
    Ok(PageFetch::Body(body))
}

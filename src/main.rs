use anyhow::Result;
use crashscraper::{
    fetch::{self, PageFetch},
    geocode::{Geocoder, Nominatim},
    output,
    process::{self, FieldValue, Record},
};
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

const START_YEAR: i32 = 2000;
const END_YEAR: i32 = 2025;
/// Pause between requests, both page fetches and geocode lookups, to
/// bound the request rate against either server.
const REQUEST_DELAY: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!(start_year = START_YEAR, end_year = END_YEAR, "startup");

    let client = Client::new();

    // ─── 2) scrape detail pages, years then pages ascending ──────────
    let mut records: Vec<Record> = Vec::new();
    for year in START_YEAR..=END_YEAR {
        let mut page = 1u32;
        loop {
            let body = match fetch::fetch_page(&client, year, page).await? {
                PageFetch::Body(body) => body,
                PageFetch::Exhausted => {
                    info!(year, page, "no more pages for this year");
                    break;
                }
            };

            let mut record = match process::extract_record(&body) {
                Some(record) => record,
                None => {
                    info!(year, page, "no crash table found; year exhausted");
                    break;
                }
            };
            if record.is_empty() {
                debug!(year, page, "table carried no recognized fields");
            } else {
                record.insert("Url", FieldValue::Text(fetch::page_url(year, page)));
                info!(year, page, fields = record.len(), "scraped record");
                records.push(record);
            }

            page += 1;
            sleep(REQUEST_DELAY).await;
        }
    }
    info!(records = records.len(), "scrape pass complete");

    // ─── 3) geocode locations, records in scrape order ───────────────
    let mut geocoder = Geocoder::new(Nominatim::new(client), REQUEST_DELAY);
    for record in &mut records {
        let location = match record.get("Location") {
            Some(FieldValue::Text(location)) if !location.is_empty() => location.clone(),
            _ => continue,
        };
        let (lat, lon) = geocoder.locate(&location).await.coords();
        record.insert("Latitude", lat.map_or(FieldValue::Null, FieldValue::Float));
        record.insert("Longitude", lon.map_or(FieldValue::Null, FieldValue::Float));
    }

    // ─── 4) write the dataset ────────────────────────────────────────
    let path = output::dataset_path(START_YEAR, END_YEAR);
    output::write_dataset(&records, &path)?;
    info!(path = %path.display(), "scraping complete");

    Ok(())
}

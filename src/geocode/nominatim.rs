// src/geocode/nominatim.rs

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::Deserialize;
use url::Url;

use super::Lookup;

const SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Nominatim's usage policy requires an identifying User-Agent.
const APP_USER_AGENT: &str = concat!("crashscraper/", env!("CARGO_PKG_VERSION"));

/// One search result. Nominatim encodes coordinates as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub lat: String,
    pub lon: String,
}

/// Geocoding lookups against the public Nominatim instance.
pub struct Nominatim {
    client: Client,
}

impl Nominatim {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Lookup for Nominatim {
    async fn search(&self, query: &str) -> Result<Vec<Place>> {
        let url = Url::parse_with_params(
            SEARCH_URL,
            &[("q", query), ("format", "json"), ("limit", "1")],
        )
        .with_context(|| format!("building search URL for {:?}", query))?;

        let places = self
            .client
            .get(url.as_str())
            .header(header::USER_AGENT, APP_USER_AGENT)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?
            .error_for_status()
            .with_context(|| format!("non-success status from {}", url))?
            .json::<Vec<Place>>()
            .await
            .with_context(|| format!("decoding response from {}", url))?;

        Ok(places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_nominatim_response_shape() {
        let body = r#"[{"place_id":225453,"lat":"41.8781136","lon":"-87.6297982","display_name":"Chicago, Cook County, Illinois, United States"}]"#;
        let places: Vec<Place> = serde_json::from_str(body).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].lat, "41.8781136");
        assert_eq!(places[0].lon, "-87.6297982");
    }

    #[test]
    fn empty_array_decodes_to_no_places() {
        let places: Vec<Place> = serde_json::from_str("[]").unwrap();
        assert!(places.is_empty());
    }
}

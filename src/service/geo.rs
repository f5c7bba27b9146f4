use crate::config::GeoConfig;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

/// A medical facility returned by the nearby-places query.
#[derive(Debug, Clone, Deserialize)]
pub struct NearbyPlace {
    pub lat: f64,
    #[serde(rename = "lon")]
    pub lng: f64,
    #[serde(default)]
    pub tags: PlaceTags,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceTags {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<NearbyPlace>,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    display_name: Option<String>,
}

/// Thin client over the public OpenStreetMap endpoints used for the map
/// widgets: tile URLs, nearby medical facilities via Overpass and
/// reverse geocoding via Nominatim. All requests are unauthenticated
/// GETs; failures are logged and degrade to empty results.
pub struct GeoClient {
    client: Client,
    config: GeoConfig,
}

impl GeoClient {
    pub fn new(config: GeoConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Fills the slippy-map tile template for the given coordinates.
    pub fn tile_url(&self, subdomain: &str, zoom: u32, x: u32, y: u32) -> String {
        self.config
            .tile_url_template
            .replace("{s}", subdomain)
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }

    /// Queries Overpass for doctors' practices within `radius_km` of the
    /// given point. Network or decode failures return an empty list.
    pub async fn nearby_doctors(&self, lat: f64, lng: f64, radius_km: f64) -> Vec<NearbyPlace> {
        let radius_m = (radius_km * 1000.0) as u32;
        let query = format!("[out:json];node[\"amenity\"=\"doctors\"](around:{radius_m},{lat},{lng});out;");

        let response = self
            .client
            .get(&self.config.overpass_url)
            .query(&[("data", query.as_str())])
            .send()
            .await;

        match response {
            Ok(response) => match response.json::<OverpassResponse>().await {
                Ok(body) => body.elements,
                Err(err) => {
                    warn!(%err, "failed to decode nearby doctors response");
                    Vec::new()
                }
            },
            Err(err) => {
                warn!(%err, "nearby doctors lookup failed");
                Vec::new()
            }
        }
    }

    /// Resolves coordinates to a display name. `None` on any failure.
    pub async fn reverse_geocode(&self, lat: f64, lng: f64) -> Option<String> {
        let response = self
            .client
            .get(&self.config.nominatim_url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
            ])
            .send()
            .await;

        match response {
            Ok(response) => match response.json::<NominatimResponse>().await {
                Ok(body) => body.display_name,
                Err(err) => {
                    warn!(%err, "failed to decode reverse geocode response");
                    None
                }
            },
            Err(err) => {
                warn!(%err, "reverse geocode failed");
                None
            }
        }
    }
}

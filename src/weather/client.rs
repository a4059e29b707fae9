//! NCDC Climate Data Online client.
//!
//! Calls are strictly sequential and each one is followed by a fixed pause,
//! which keeps a polling session under the API's request rate limit.
//! There is no retry and no pagination: only the first page of any listing
//! is read.

use super::types::{Dataset, Observation, ResultSet, Station};
use crate::config::WeatherConfig;
use crate::constants::{DEFAULT_DATASET, NCDC_DATE_FORMAT, NCDC_TOKEN_HEADER, NCDC_UNITS};
use crate::error::{EtlError, Result};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result of one polling session
#[derive(Debug, Clone)]
pub struct WeatherReport {
    pub zip_code: String,
    pub station: Station,
    pub dataset_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub observations: Vec<Observation>,
}

/// Client for the NCDC CDO v2 REST API
#[derive(Debug, Clone)]
pub struct NcdcClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    request_delay: Duration,
}

impl NcdcClient {
    /// Build a client from a validated configuration
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| EtlError::Http {
                url: config.base_url.clone(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
            request_delay: config.request_delay,
        })
    }

    pub fn request_delay(&self) -> Duration {
        self.request_delay
    }

    pub fn stations_url(&self, zip_code: &str) -> String {
        format!(
            "{}stations?locationcategoryid=ZIP&locationid=ZIP:{}",
            self.base_url, zip_code
        )
    }

    pub fn datasets_url(&self, station_id: &str) -> String {
        format!("{}datasets?stationid={}", self.base_url, station_id)
    }

    pub fn data_url(
        &self,
        dataset_id: &str,
        station_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> String {
        format!(
            "{}data?datasetid={}&stationid={}&units={}&startdate={}&enddate={}",
            self.base_url,
            dataset_id,
            station_id,
            NCDC_UNITS,
            start_date.format(NCDC_DATE_FORMAT),
            end_date.format(NCDC_DATE_FORMAT)
        )
    }

    /// Issue a GET, pause for the request delay, then decode the body
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<ResultSet<T>> {
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .header(NCDC_TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|source| EtlError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| EtlError::Http {
            url: url.to_string(),
            source,
        })?;

        tokio::time::sleep(self.request_delay).await;

        if !status.is_success() {
            warn!("HTTP {} for {}", status, url);
            return Err(EtlError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let set: ResultSet<T> = serde_json::from_str(&body).map_err(|source| EtlError::Decode {
            url: url.to_string(),
            source,
        })?;

        if set.is_truncated() {
            warn!(
                "Only {} of {} results returned for {}",
                set.results.len(),
                set.total_count().unwrap_or_default(),
                url
            );
        }

        Ok(set)
    }

    /// Stations located in a ZIP code
    pub async fn stations_for_zip(&self, zip_code: &str) -> Result<Vec<Station>> {
        let url = self.stations_url(zip_code);
        let stations = self.get_json::<Station>(&url).await?.results;

        if stations.is_empty() {
            return Err(EtlError::NoResults {
                what: "stations",
                query: format!("ZIP:{}", zip_code),
            });
        }

        let ids: Vec<&str> = stations.iter().map(|s| s.id.as_str()).collect();
        info!("Found stations: {:?}", ids);
        Ok(stations)
    }

    /// Datasets offered by a station
    pub async fn available_datasets(&self, station_id: &str) -> Result<Vec<Dataset>> {
        let url = self.datasets_url(station_id);
        let datasets = self.get_json::<Dataset>(&url).await?.results;

        if datasets.is_empty() {
            return Err(EtlError::NoResults {
                what: "datasets",
                query: station_id.to_string(),
            });
        }

        info!(
            "Found datasets: {:?}",
            datasets
                .iter()
                .map(|d| (d.id.as_str(), d.name.as_str()))
                .collect::<Vec<_>>()
        );
        Ok(datasets)
    }

    /// Readings of one dataset at one station, in metric units.
    ///
    /// `None` requests the 15-minute precipitation dataset. An empty window
    /// yields an empty list.
    pub async fn get_data(
        &self,
        station_id: &str,
        dataset_id: Option<&str>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Observation>> {
        let dataset_id = dataset_id.unwrap_or(DEFAULT_DATASET);
        if start_date > end_date {
            return Err(EtlError::InvalidDateWindow {
                start: start_date,
                end: end_date,
            });
        }

        info!("Requesting {} for {}", dataset_id, station_id);
        let url = self.data_url(dataset_id, station_id, start_date, end_date);
        Ok(self.get_json::<Observation>(&url).await?.results)
    }

    /// Full session: first station for the ZIP code, its first dataset unless
    /// one is configured, then the readings window
    pub async fn poll(&self, config: &WeatherConfig, today: NaiveDate) -> Result<WeatherReport> {
        let (start_date, end_date) = config.date_window(today)?;

        // Both listings are non-empty on success
        let mut stations = self.stations_for_zip(&config.zip_code).await?;
        let station = stations.swap_remove(0);

        let dataset_id = match &config.dataset {
            Some(dataset) => dataset.clone(),
            None => self.available_datasets(&station.id).await?.swap_remove(0).id,
        };

        let observations = self
            .get_data(&station.id, Some(&dataset_id), start_date, end_date)
            .await?;

        Ok(WeatherReport {
            zip_code: config.zip_code.clone(),
            station,
            dataset_id,
            start_date,
            end_date,
            observations,
        })
    }
}

//! Response types of the NCDC Climate Data Online v2 API.
//!
//! Every listing endpoint wraps its rows in a `results` array next to a
//! `metadata.resultset` block. The API answers an empty query with `{}`,
//! so both keys are optional.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Envelope shared by all listing endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResultSet<T> {
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> ResultSet<T> {
    /// Total rows the server reports for the query, when known
    pub fn total_count(&self) -> Option<u64> {
        self.metadata.as_ref().map(|m| m.resultset.count)
    }

    /// True when the server holds more rows than this page returned
    pub fn is_truncated(&self) -> bool {
        self.total_count()
            .is_some_and(|count| count > self.results.len() as u64)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Metadata {
    pub resultset: ResultSetInfo,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResultSetInfo {
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub limit: u64,
}

/// Observation station
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Station {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub elevation: Option<f64>,
    #[serde(default, rename = "elevationUnit")]
    pub elevation_unit: Option<String>,
    #[serde(default)]
    pub mindate: Option<String>,
    #[serde(default)]
    pub maxdate: Option<String>,
    #[serde(default)]
    pub datacoverage: Option<f64>,
}

/// Category of observations offered by a station
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mindate: Option<String>,
    #[serde(default)]
    pub maxdate: Option<String>,
    #[serde(default)]
    pub datacoverage: Option<f64>,
}

/// Single reading
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Observation {
    pub date: NaiveDateTime,
    pub datatype: String,
    pub station: String,
    #[serde(default)]
    pub attributes: String,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATIONS_JSON: &str = r#"{
        "metadata": {"resultset": {"offset": 1, "count": 2, "limit": 25}},
        "results": [
            {"elevation": 202.7, "mindate": "1938-01-01", "maxdate": "2024-06-14",
             "latitude": 42.955, "name": "MILWAUKEE MITCHELL AIRPORT, WI US",
             "datacoverage": 1, "id": "GHCND:USW00014839", "elevationUnit": "METERS",
             "longitude": -87.9044},
            {"id": "COOP:475479", "name": "MILWAUKEE 3 SW, WI US"}
        ]
    }"#;

    #[test]
    fn test_decode_stations() {
        let set: ResultSet<Station> = serde_json::from_str(STATIONS_JSON).unwrap();
        assert_eq!(set.results.len(), 2);
        assert_eq!(set.results[0].id, "GHCND:USW00014839");
        assert_eq!(set.results[0].elevation_unit.as_deref(), Some("METERS"));
        assert_eq!(set.results[1].latitude, None);
        assert_eq!(set.total_count(), Some(2));
        assert!(!set.is_truncated());
    }

    #[test]
    fn test_empty_object_is_empty_listing() {
        let set: ResultSet<Dataset> = serde_json::from_str("{}").unwrap();
        assert!(set.results.is_empty());
        assert_eq!(set.total_count(), None);
        assert!(!set.is_truncated());
    }

    #[test]
    fn test_decode_observations() {
        let json = r#"{
            "metadata": {"resultset": {"offset": 1, "count": 40, "limit": 25}},
            "results": [
                {"date": "2024-06-08T00:15:00", "datatype": "QPCP",
                 "station": "COOP:475479", "attributes": ",,C,", "value": 0.3},
                {"date": "2024-06-08T00:30:00", "datatype": "QPCP",
                 "station": "COOP:475479", "value": 0}
            ]
        }"#;
        let set: ResultSet<Observation> = serde_json::from_str(json).unwrap();
        assert_eq!(set.results.len(), 2);
        assert_eq!(set.results[0].attributes, ",,C,");
        assert_eq!(set.results[1].attributes, "");
        assert_eq!(set.results[1].value, 0.0);
        assert_eq!(
            set.results[0].date.format("%Y-%m-%d %H:%M").to_string(),
            "2024-06-08 00:15"
        );
        assert!(set.is_truncated());
    }

    #[test]
    fn test_dataset_requires_name() {
        let result: Result<ResultSet<Dataset>, _> =
            serde_json::from_str(r#"{"results": [{"id": "PRECIP_15"}]}"#);
        assert!(result.is_err());
    }
}

// feed_client.rs
// Purpose: Materialize the fleet data feeds (fuel logs, vessels, inspections)
// from JSON files or the dashboard REST API, normalized to canonical records

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config_loader::FeedConfig;
use crate::errors::{FuelError, FuelResult};
use crate::fleet_records::{
    normalize_inspections, normalize_logs, normalize_vessels, InspectionRecord, VesselRecord,
    VoyageLogPoint,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetFeeds {
    pub logs: Vec<VoyageLogPoint>,
    pub vessels: Vec<VesselRecord>,
    pub inspections: Vec<InspectionRecord>,
}

/// Parse a JSON document that should be an array. Anything else is treated
/// as an empty feed.
pub fn parse_array(text: &str, feed: &str) -> FuelResult<Vec<Value>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| FuelError::serialization(format!("parse {feed} feed"), e))?;
    match value {
        Value::Array(items) => Ok(items),
        other => {
            warn!(feed, kind = %json_kind(&other), "feed is not a JSON array; treating as empty");
            Ok(Vec::new())
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn read_array(path: &Path, feed: &str) -> FuelResult<Vec<Value>> {
    let text = fs::read_to_string(path)
        .map_err(|e| FuelError::io(format!("read {feed} feed {}", path.display()), e))?;
    parse_array(&text, feed)
}

/// Optional registry feeds degrade to empty on any failure.
fn read_optional(path: Option<&Path>, feed: &str) -> Vec<Value> {
    let Some(path) = path else {
        return Vec::new();
    };
    match read_array(path, feed) {
        Ok(items) => items,
        Err(e) => {
            warn!(feed, error = %e, "optional feed unavailable; using defaults");
            Vec::new()
        }
    }
}

impl FleetFeeds {
    pub fn new(logs: Vec<VoyageLogPoint>, vessels: Vec<VesselRecord>, inspections: Vec<InspectionRecord>) -> Self {
        Self {
            logs,
            vessels,
            inspections,
        }
    }

    /// The log file is required; vessel and inspection files are optional.
    pub fn from_files(logs: &Path, vessels: Option<&Path>, inspections: Option<&Path>) -> FuelResult<Self> {
        let feeds = Self {
            logs: normalize_logs(&read_array(logs, "fuel_logs")?),
            vessels: normalize_vessels(&read_optional(vessels, "vessels")),
            inspections: normalize_inspections(&read_optional(inspections, "inspections")),
        };
        debug!(
            logs = feeds.logs.len(),
            vessels = feeds.vessels.len(),
            inspections = feeds.inspections.len(),
            "loaded fleet feeds from files"
        );
        Ok(feeds)
    }

    /// Files when `logs_path` is configured, otherwise the REST API. With
    /// `tank_id` set only that tank's logs are kept.
    pub fn from_config(cfg: &FeedConfig) -> FuelResult<Self> {
        if let Some(logs) = &cfg.logs_path {
            let mut feeds = Self::from_files(logs, cfg.vessels_path.as_deref(), cfg.inspections_path.as_deref())?;
            if let Some(tank) = &cfg.tank_id {
                feeds.retain_tank(tank);
            }
            return Ok(feeds);
        }
        let Some(url) = &cfg.base_url else {
            return Err(FuelError::config(
                "no fuel-log source: set feeds.logs_path or feeds.base_url",
            ));
        };
        let client = FeedClient::new(url)?;
        match &cfg.tank_id {
            Some(tank) => client.fetch_tank(tank),
            None => client.fetch_all(),
        }
    }

    pub fn retain_tank(&mut self, tank_id: &str) {
        self.logs.retain(|p| p.tank_id == tank_id);
    }
}

/// Blocking HTTP client for the dashboard API.
pub struct FeedClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl FeedClient {
    pub fn new(base_url: &str) -> FuelResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| FuelError::network("build http client", e))?;
        Ok(Self::with_client(base_url, http))
    }

    pub fn with_client(base_url: &str, http: reqwest::blocking::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn url(&self, route: &str) -> String {
        format!("{}/{}", self.base_url, route.trim_start_matches('/'))
    }

    fn get_array(&self, route: &str) -> FuelResult<Vec<Value>> {
        self.get_url(&self.url(route), route)
    }

    fn get_url(&self, url: &str, feed: &str) -> FuelResult<Vec<Value>> {
        let resp = self
            .http
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| FuelError::network(format!("GET {url}"), e))?;
        let text = resp
            .text()
            .map_err(|e| FuelError::network(format!("read body of {url}"), e))?;
        parse_array(&text, feed)
    }

    fn get_optional(&self, route: &str) -> Vec<Value> {
        self.get_array(route).unwrap_or_else(|e| {
            warn!(route, error = %e, "optional feed unavailable; using defaults");
            Vec::new()
        })
    }

    pub fn fuel_logs(&self) -> FuelResult<Vec<VoyageLogPoint>> {
        Ok(normalize_logs(&self.get_array("/fuelLogs")?))
    }

    /// Logs for one tank: query-string route, then path route, then the
    /// filtered full list.
    pub fn tank_logs(&self, tank_id: &str) -> FuelResult<Vec<VoyageLogPoint>> {
        for url in self.tank_urls(tank_id)? {
            match self.get_url(url.as_str(), "fuel_logs") {
                Ok(items) => return Ok(normalize_logs(&items)),
                Err(e) => debug!(%url, error = %e, "tank log route failed"),
            }
        }
        Ok(self
            .fuel_logs()?
            .into_iter()
            .filter(|p| p.tank_id == tank_id)
            .collect())
    }

    fn tank_urls(&self, tank_id: &str) -> FuelResult<[Url; 2]> {
        let base = Url::parse(&self.url("/fuelLogs"))
            .map_err(|e| FuelError::config(format!("invalid feed base url {}: {e}", self.base_url)))?;

        let mut by_query = base.clone();
        by_query.query_pairs_mut().append_pair("tankId", tank_id);

        let mut by_path = base;
        by_path
            .path_segments_mut()
            .map_err(|_| FuelError::config(format!("feed base url {} cannot carry a path", self.base_url)))?
            .push(tank_id);

        Ok([by_query, by_path])
    }

    pub fn vessels(&self) -> Vec<VesselRecord> {
        normalize_vessels(&self.get_optional("/vessels"))
    }

    pub fn inspections(&self) -> Vec<InspectionRecord> {
        normalize_inspections(&self.get_optional("/fuel/inspections"))
    }

    pub fn fetch_all(&self) -> FuelResult<FleetFeeds> {
        Ok(FleetFeeds::new(self.fuel_logs()?, self.vessels(), self.inspections()))
    }

    pub fn fetch_tank(&self, tank_id: &str) -> FuelResult<FleetFeeds> {
        Ok(FleetFeeds::new(self.tank_logs(tank_id)?, self.vessels(), self.inspections()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[test]
    fn non_array_feed_is_empty() {
        assert!(parse_array(r#"{"error":"nope"}"#, "vessels").unwrap().is_empty());
        assert!(parse_array("not json", "vessels").is_err());
    }

    #[test]
    fn missing_optional_files_degrade_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let logs_path = dir.path().join("logs.json");
        let mut f = fs::File::create(&logs_path).unwrap();
        write!(
            f,
            r#"[{{"tankId":"A","time":"2024-01-01T00:00:00Z","liters":1000}},
                {{"tankId":"A","time":"2024-01-01T02:00:00Z","liters":900,"distance":24}}]"#
        )
        .unwrap();

        let feeds = FleetFeeds::from_files(&logs_path, Some(&dir.path().join("missing.json")), None).unwrap();
        assert_eq!(feeds.logs.len(), 2);
        assert!(feeds.vessels.is_empty());
        assert!(feeds.inspections.is_empty());
    }

    #[test]
    fn config_without_sources_is_a_config_error() {
        let err = FleetFeeds::from_config(&FeedConfig::default()).unwrap_err();
        assert!(matches!(err, FuelError::Config { .. }));
    }

    #[test]
    fn urls_join_cleanly() {
        let client = FeedClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.url("/vessels"), "http://localhost:5000/vessels");
        assert_eq!(client.url("fuel/inspections"), "http://localhost:5000/fuel/inspections");
    }

    /// Serves fixed JSON bodies by request target; anything else is a 404.
    /// Returns the base URL and the log of requested targets.
    fn serve(routes: &[(&'static str, &'static str)]) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let routes = routes.to_vec();
        let log = Arc::clone(&seen);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                loop {
                    let mut header = String::new();
                    if reader.read_line(&mut header).unwrap() == 0 || header == "\r\n" {
                        break;
                    }
                }
                let target = request_line.split_whitespace().nth(1).unwrap_or_default().to_string();
                log.lock().unwrap().push(target.clone());

                let (status, body) = match routes.iter().find(|(route, _)| *route == target) {
                    Some((_, body)) => ("200 OK", *body),
                    None => ("404 Not Found", "{}"),
                };
                let _ = write!(
                    stream,
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
            }
        });
        (base, seen)
    }

    fn client(base: &str) -> FeedClient {
        let http = reqwest::blocking::Client::builder().no_proxy().build().unwrap();
        FeedClient::with_client(base, http)
    }

    const TANK_T1: &str = r#"[{"tankId":"T1","time":"2024-01-01T00:00:00Z","liters":500}]"#;
    const ALL_TANKS: &str = r#"[
        {"tankId":"T1","time":"2024-01-01T00:00:00Z","liters":500},
        {"tankId":"T2","time":"2024-01-01T00:00:00Z","liters":800},
        {"tankId":"T1","time":"2024-01-01T01:00:00Z","liters":480}
    ]"#;

    #[test]
    fn tank_logs_prefer_query_route() {
        let (base, seen) = serve(&[("/fuelLogs?tankId=T1", TANK_T1), ("/fuelLogs/T1", ALL_TANKS)]);
        let logs = client(&base).tank_logs("T1").unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["/fuelLogs?tankId=T1"]);
    }

    #[test]
    fn tank_logs_fall_back_to_path_route() {
        let (base, seen) = serve(&[("/fuelLogs/T1", TANK_T1)]);
        let logs = client(&base).tank_logs("T1").unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["/fuelLogs?tankId=T1", "/fuelLogs/T1"]);
    }

    #[test]
    fn tank_logs_finally_filter_full_list() {
        let (base, seen) = serve(&[("/fuelLogs", ALL_TANKS)]);
        let logs = client(&base).tank_logs("T1").unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|p| p.tank_id == "T1"));
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["/fuelLogs?tankId=T1", "/fuelLogs/T1", "/fuelLogs"]
        );
    }

    #[test]
    fn tank_logs_fail_when_no_route_answers() {
        let (base, _) = serve(&[]);
        let err = client(&base).tank_logs("T1").unwrap_err();
        assert!(matches!(err, FuelError::Network { .. }));
    }

    #[test]
    fn fetch_tank_degrades_missing_registries() {
        let (base, seen) = serve(&[("/fuelLogs/T1", TANK_T1)]);
        let feeds = client(&base).fetch_tank("T1").unwrap();
        assert_eq!(feeds.logs.len(), 1);
        assert!(feeds.vessels.is_empty() && feeds.inspections.is_empty());
        assert!(seen.lock().unwrap().iter().any(|t| t == "/vessels"));
    }

    #[test]
    fn configured_tank_filters_file_logs() {
        let dir = tempfile::tempdir().unwrap();
        let logs_path = dir.path().join("logs.json");
        fs::write(&logs_path, ALL_TANKS).unwrap();
        let cfg = FeedConfig {
            logs_path: Some(logs_path),
            tank_id: Some("T2".into()),
            ..FeedConfig::default()
        };
        let feeds = FleetFeeds::from_config(&cfg).unwrap();
        assert_eq!(feeds.logs.len(), 1);
        assert_eq!(feeds.logs[0].tank_id, "T2");
    }
}

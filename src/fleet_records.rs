// fleet_records.rs
// Purpose: Canonical fuel-log / vessel / inspection records and the single
// normalization step that maps every accepted feed shape onto them.
//
// Nothing past this module sees raw JSON. A record that cannot be normalized
// is skipped with a warning; the rest of the batch still goes through.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::feature_builder::clamp_finite;

pub const UNKNOWN_TANK: &str = "unknown";

/// A point-in-time fuel tank reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoyageLogPoint {
    pub tank_id: String,
    pub time: DateTime<Utc>,
    pub liters: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_nm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vessel_id: Option<String>,
    #[serde(default, rename = "vessel", skip_serializing_if = "Option::is_none")]
    pub vessel_name: Option<String>,
    /// Externally reported speed over ground, used when no distance is known.
    #[serde(default, rename = "speed", skip_serializing_if = "Option::is_none")]
    pub speed_knots: Option<f64>,
    /// Severity 0..5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<f64>,
}

impl VoyageLogPoint {
    pub fn new(tank_id: impl Into<String>, time: DateTime<Utc>, liters: f64) -> Self {
        Self {
            tank_id: tank_id.into(),
            time,
            liters,
            distance_nm: None,
            lat: None,
            lon: None,
            location: None,
            vessel_id: None,
            vessel_name: None,
            speed_knots: None,
            weather: None,
        }
    }

    pub fn position(&self) -> (Option<f64>, Option<f64>) {
        (self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VesselRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cargo_tons: Option<f64>,
    #[serde(default)]
    pub dwt_tons: Option<f64>,
}

impl VesselRecord {
    /// cargo / deadweight clamped to [0, 1]; `None` without a positive DWT.
    pub fn load_factor(&self) -> Option<f64> {
        let dwt = self.dwt_tons.filter(|d| d.is_finite() && *d > 0.0)?;
        let cargo = self.cargo_tons.filter(|c| c.is_finite()).unwrap_or(0.0);
        Some(clamp_finite(cargo / dwt, 0.0, 1.0))
    }
}

/// Hull / propeller / engine condition, each 0 (good) .. 5 (bad).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRecord {
    #[serde(default)]
    pub vessel_id: Option<String>,
    #[serde(default, rename = "vessel")]
    pub vessel_name: Option<String>,
    pub hull_fouling: f64,
    pub propeller: f64,
    pub engine: f64,
    #[serde(default = "default_true")]
    pub trim_ok: bool,
    #[serde(default)]
    pub excess_ballast: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl InspectionRecord {
    /// Equipment badness: `(hull + propeller + engine) / 15` clamped to [0, 1].
    pub fn equipment_score(&self) -> f64 {
        let sum = finite_or_zero(self.hull_fouling)
            + finite_or_zero(self.propeller)
            + finite_or_zero(self.engine);
        clamp_finite(sum / 15.0, 0.0, 1.0)
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Raw feed shapes
// ---------------------------------------------------------------------------

/// A JSON scalar that may be a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Flex {
    Num(f64),
    Text(String),
    Bool(bool),
}

impl Flex {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Flex::Num(n) if n.is_finite() => Some(*n),
            Flex::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    fn as_id(&self) -> Option<String> {
        match self {
            Flex::Num(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            Flex::Num(n) => Some(n.to_string()),
            Flex::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            Flex::Bool(b) => Some(*b),
            Flex::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            Flex::Num(n) => Some(*n != 0.0),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLog {
    tank_id: Option<Flex>,
    #[serde(rename = "tankID")]
    tank_id_upper: Option<Flex>,
    #[serde(rename = "tank_id")]
    tank_id_snake: Option<Flex>,
    time: Option<Flex>,
    created_at: Option<Flex>,
    timestamp: Option<Flex>,
    liters: Option<Flex>,
    distance_nm: Option<Flex>,
    distance: Option<Flex>,
    #[serde(rename = "distance_Nm")]
    distance_nm_snake: Option<Flex>,
    lat: Option<Flex>,
    lon: Option<Flex>,
    location: Option<String>,
    vessel_id: Option<Flex>,
    vessel: Option<String>,
    speed: Option<Flex>,
    weather: Option<Flex>,
    sea_state: Option<Flex>,
    severity: Option<Flex>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVessel {
    id: Option<Flex>,
    name: Option<String>,
    cargo_tons: Option<Flex>,
    cargo: Option<Flex>,
    dwt_tons: Option<Flex>,
    dwt: Option<Flex>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInspection {
    vessel_id: Option<Flex>,
    vessel: Option<String>,
    hull_fouling: Option<Flex>,
    propeller: Option<Flex>,
    engine: Option<Flex>,
    trim_ok: Option<Flex>,
    excess_ballast: Option<Flex>,
    created_at: Option<Flex>,
}

fn first_f64(candidates: &[&Option<Flex>]) -> Option<f64> {
    candidates.iter().find_map(|c| c.as_ref().and_then(Flex::as_f64))
}

fn first_id(candidates: &[&Option<Flex>]) -> Option<String> {
    candidates.iter().find_map(|c| c.as_ref().and_then(Flex::as_id))
}

/// RFC 3339, naive ISO timestamps (taken as UTC), bare dates (midnight UTC),
/// or epoch milliseconds.
pub fn parse_time_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_time(value: &Flex) -> Option<DateTime<Utc>> {
    match value {
        Flex::Text(s) => parse_time_str(s),
        Flex::Num(ms) if ms.is_finite() => Utc.timestamp_millis_opt(*ms as i64).single(),
        _ => None,
    }
}

fn normalize_log(raw: RawLog) -> Option<VoyageLogPoint> {
    let time = [&raw.time, &raw.created_at, &raw.timestamp]
        .iter()
        .find_map(|c| c.as_ref().and_then(parse_time))?;
    let liters = first_f64(&[&raw.liters])?;
    let tank_id = first_id(&[&raw.tank_id, &raw.tank_id_upper, &raw.tank_id_snake])
        .unwrap_or_else(|| UNKNOWN_TANK.to_string());

    Some(VoyageLogPoint {
        tank_id,
        time,
        liters,
        distance_nm: first_f64(&[&raw.distance_nm, &raw.distance, &raw.distance_nm_snake]),
        lat: first_f64(&[&raw.lat]),
        lon: first_f64(&[&raw.lon]),
        location: raw.location,
        vessel_id: first_id(&[&raw.vessel_id]),
        vessel_name: raw.vessel.filter(|v| !v.trim().is_empty()),
        speed_knots: first_f64(&[&raw.speed]),
        weather: first_f64(&[&raw.weather, &raw.sea_state, &raw.severity])
            .map(|w| clamp_finite(w, 0.0, 5.0)),
    })
}

fn normalize_vessel(raw: RawVessel) -> Option<VesselRecord> {
    Some(VesselRecord {
        id: first_id(&[&raw.id])?,
        name: raw.name,
        cargo_tons: first_f64(&[&raw.cargo_tons, &raw.cargo]),
        dwt_tons: first_f64(&[&raw.dwt_tons, &raw.dwt]),
    })
}

fn normalize_inspection(raw: RawInspection) -> Option<InspectionRecord> {
    let vessel_id = first_id(&[&raw.vessel_id]);
    let vessel_name = raw.vessel.filter(|v| !v.trim().is_empty());
    if vessel_id.is_none() && vessel_name.is_none() {
        return None;
    }
    let score = |f: &Option<Flex>| first_f64(&[f]).map(|v| clamp_finite(v, 0.0, 5.0)).unwrap_or(0.0);

    Some(InspectionRecord {
        vessel_id,
        vessel_name,
        hull_fouling: score(&raw.hull_fouling),
        propeller: score(&raw.propeller),
        engine: score(&raw.engine),
        trim_ok: raw.trim_ok.as_ref().and_then(Flex::as_bool).unwrap_or(true),
        excess_ballast: raw.excess_ballast.as_ref().and_then(Flex::as_bool).unwrap_or(false),
        created_at: raw.created_at.as_ref().and_then(parse_time),
    })
}

fn normalize_each<R, T>(kind: &str, values: &[Value], f: impl Fn(R) -> Option<T>) -> Vec<T>
where
    R: for<'de> Deserialize<'de>,
{
    let mut out = Vec::with_capacity(values.len());
    let mut skipped = 0usize;
    for value in values {
        match serde_json::from_value::<R>(value.clone()) {
            Ok(raw) => match f(raw) {
                Some(rec) => out.push(rec),
                None => skipped += 1,
            },
            Err(e) => {
                debug!(kind, error = %e, "unparseable record");
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        warn!(kind, skipped, kept = out.len(), "skipped records during normalization");
    }
    out
}

/// Fuel-log feed. Entries without a parseable time or liters reading are dropped.
pub fn normalize_logs(values: &[Value]) -> Vec<VoyageLogPoint> {
    normalize_each("fuel_log", values, normalize_log)
}

/// Vessel registry feed. Entries without an id are dropped.
pub fn normalize_vessels(values: &[Value]) -> Vec<VesselRecord> {
    normalize_each("vessel", values, normalize_vessel)
}

/// Inspection feed. Entries naming no vessel are dropped.
pub fn normalize_inspections(values: &[Value]) -> Vec<InspectionRecord> {
    normalize_each("inspection", values, normalize_inspection)
}

//! Telemetry ingestion: CSV files, JSON-lines feed and the built-in demo run

use crate::types::{Destination, RoadStatus, TelemetryReading};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Read cargo telemetry from a CSV file
///
/// Expected CSV format:
/// timestamp,temperature_c,humidity_pct,vibration_g[,distance_remaining_km]
///
/// Lines that fail to parse or validate are logged and skipped.
pub fn read_csv_data(path: &str) -> Vec<TelemetryReading> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Failed to open CSV file");
            return Vec::new();
        }
    };

    let reader = BufReader::new(file);
    let mut readings = Vec::new();
    let mut line_num = 0;

    for line_result in reader.lines() {
        line_num += 1;

        let line = match line_result {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(line = line_num, error = %e, "Error reading CSV line");
                continue;
            }
        };

        // Skip header line
        if line_num == 1 && line.starts_with("timestamp") {
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }

        match parse_csv_line(&line, line_num) {
            Ok(reading) => readings.push(reading),
            Err(e) => {
                tracing::warn!(line = line_num, error = %e, "Error parsing CSV line");
                continue;
            }
        }
    }

    tracing::info!(count = readings.len(), path = %path, "Loaded telemetry readings from CSV");
    readings
}

/// Parse a single CSV line into a validated TelemetryReading
fn parse_csv_line(line: &str, line_num: usize) -> Result<TelemetryReading, String> {
    let fields: Vec<&str> = line.split(',').collect();

    if fields.len() < 4 {
        return Err(format!(
            "Expected at least 4 fields, got {} on line {}",
            fields.len(),
            line_num
        ));
    }

    let timestamp = parse_timestamp(fields[0])?;
    let temperature_c = parse_f64(fields[1], "temperature_c")?;
    let humidity_pct = parse_f64(fields[2], "humidity_pct")?;
    let vibration_g = parse_f64(fields[3], "vibration_g")?;
    let distance_remaining_km = match fields.get(4) {
        Some(f) if !f.trim().is_empty() => parse_f64(f, "distance_remaining_km")?,
        _ => 0.0,
    };

    TelemetryReading::new(
        temperature_c,
        humidity_pct,
        vibration_g,
        distance_remaining_km,
        timestamp,
    )
    .map_err(|e| e.to_string())
}

/// Parse an RFC 3339 timestamp or Unix epoch seconds
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();

    if let Ok(epoch) = s.parse::<i64>() {
        return DateTime::from_timestamp(epoch, 0)
            .ok_or_else(|| format!("Epoch timestamp out of range: {}", epoch));
    }

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            format!("{}Z", s.trim_end_matches('Z'))
                .parse::<DateTime<Utc>>()
                .map_err(|e| format!("Cannot parse timestamp '{}': {}", s, e))
        })
}

/// Parse a string to f64 with field name for error messages
fn parse_f64(s: &str, field: &str) -> Result<f64, String> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| format!("Cannot parse {} as f64: '{}'", field, s))
}

// ============================================================================
// JSON-lines feed
// ============================================================================

/// Partial update to one destination in the runner's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadUpdate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road_status: Option<RoadStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_time_hrs: Option<f64>,
}

impl RoadUpdate {
    /// Apply to the matching destination. Returns false for an unknown name.
    pub fn apply(&self, destinations: &mut [Destination]) -> bool {
        let Some(dest) = destinations.iter_mut().find(|d| d.name == self.name) else {
            return false;
        };
        if let Some(status) = self.road_status {
            dest.road_status = status;
        }
        if let Some(capacity) = self.capacity_pct {
            dest.capacity_pct = capacity;
        }
        if let Some(travel) = self.travel_time_hrs {
            dest.travel_time_hrs = travel;
        }
        true
    }
}

/// One line of the telemetry feed.
///
/// ```text
/// {"chaos_event": "cooling_failure"}
/// {"road_update": {"name": "Center_A", "road_status": "blocked"}}
/// {"temperature_c": 3.1, "humidity_pct": 52, "vibration_g": 0.1, "timestamp": "..."}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedMessage {
    Chaos {
        chaos_event: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<DateTime<Utc>>,
    },
    Road {
        road_update: RoadUpdate,
    },
    Reading(TelemetryReading),
}

/// Parse one feed line. Blank lines yield `None`.
pub fn parse_feed_line(line: &str) -> Result<Option<FeedMessage>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

// ============================================================================
// Demo scenario
// ============================================================================

/// Cooling failure on a three-stop delivery run
///
/// 1. 12 nominal readings at 3°C
/// 2. Cooling failure: temperature climbs to 38°C with rising vibration
/// 3. Premium_Supermarket road blocked, Center_A overbooked
/// 4. Center_B road blocked, leaving only salvage
pub fn demo_scenario() -> Vec<FeedMessage> {
    let base_timestamp: i64 = 1_737_187_200; // 2025-01-18T08:00:00Z
    let at = |minutes: i64| DateTime::from_timestamp(base_timestamp + minutes * 60, 0).unwrap_or_default();
    let reading = |minutes: i64, temperature_c: f64, humidity_pct: f64, vibration_g: f64, distance_remaining_km: f64| {
        FeedMessage::Reading(TelemetryReading {
            temperature_c,
            humidity_pct,
            vibration_g,
            distance_remaining_km,
            timestamp: at(minutes),
        })
    };

    let mut feed = Vec::new();
    let mut distance = 320.0;

    // Phase 1: Nominal transport
    for i in 0..12 {
        let wobble = if i % 2 == 0 { 0.1 } else { -0.1 };
        feed.push(reading(i * 10, 3.0 + wobble, 50.0 + 2.0 * wobble, 0.12, distance));
        distance -= 8.0;
    }

    // Phase 2: Cooling failure
    feed.push(FeedMessage::Chaos {
        chaos_event: "cooling_failure".to_string(),
        timestamp: Some(at(120)),
    });
    for i in 0..10 {
        let minutes = 120 + i * 10;
        let step = i as f64;
        feed.push(reading(minutes, 6.0 + step * 3.5, 58.0 + step * 2.0, 0.2 + step * 0.07, distance));
        distance -= 8.0;

        // Phase 3: Route disruption
        if i == 4 {
            feed.push(FeedMessage::Road {
                road_update: RoadUpdate {
                    name: "Premium_Supermarket".to_string(),
                    road_status: Some(RoadStatus::Blocked),
                    capacity_pct: None,
                    travel_time_hrs: None,
                },
            });
            feed.push(FeedMessage::Road {
                road_update: RoadUpdate {
                    name: "Center_A".to_string(),
                    road_status: None,
                    capacity_pct: Some(96.0),
                    travel_time_hrs: None,
                },
            });
        }
    }

    // Phase 4: Last open route lost
    feed.push(FeedMessage::Road {
        road_update: RoadUpdate {
            name: "Center_B".to_string(),
            road_status: Some(RoadStatus::Blocked),
            capacity_pct: None,
            travel_time_hrs: None,
        },
    });
    for i in 0..4 {
        feed.push(reading(220 + i * 10, 38.0, 78.0, 0.85, distance));
    }

    tracing::debug!(count = feed.len(), "Generated demo cooling-failure feed");
    feed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_timestamp_iso8601() {
        let ts = parse_timestamp("2025-01-18T08:00:00Z").unwrap();
        assert_eq!(ts.timestamp(), 1737187200);
    }

    #[test]
    fn test_parse_timestamp_epoch() {
        let ts = parse_timestamp("1705564800").unwrap();
        assert_eq!(ts.timestamp(), 1705564800);
    }

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64("1.234", "test").unwrap(), 1.234);
        assert!(parse_f64("invalid", "test").is_err());
    }

    #[test]
    fn test_read_csv_skips_bad_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timestamp,temperature_c,humidity_pct,vibration_g,distance_remaining_km").unwrap();
        writeln!(file, "2025-01-18T08:00:00Z,3.2,51,0.1,120").unwrap();
        writeln!(file, "2025-01-18T08:10:00Z,not-a-number,51,0.1,118").unwrap();
        writeln!(file, "2025-01-18T08:20:00Z,3.4,140,0.1,116").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "1737189000,3.5,52,0.2").unwrap();

        let readings = read_csv_data(file.path().to_str().unwrap());
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].temperature_c, 3.2);
        assert_eq!(readings[1].distance_remaining_km, 0.0);
    }

    #[test]
    fn test_read_missing_csv_is_empty() {
        assert!(read_csv_data("/nonexistent/telemetry.csv").is_empty());
    }

    #[test]
    fn test_parse_feed_lines() {
        let chaos = parse_feed_line(r#"{"chaos_event": "door_open"}"#).unwrap().unwrap();
        assert!(matches!(chaos, FeedMessage::Chaos { ref chaos_event, timestamp: None } if chaos_event == "door_open"));

        let road = parse_feed_line(r#"{"road_update": {"name": "Center_A", "road_status": "blocked"}}"#)
            .unwrap()
            .unwrap();
        let FeedMessage::Road { road_update } = road else {
            panic!("expected road update");
        };
        assert_eq!(road_update.road_status, Some(RoadStatus::Blocked));

        let reading = parse_feed_line(
            r#"{"temperature_c": 3.1, "humidity_pct": 52, "vibration_g": 0.1, "timestamp": "2025-01-18T08:00:00Z"}"#,
        )
        .unwrap()
        .unwrap();
        assert!(matches!(reading, FeedMessage::Reading(r) if r.distance_remaining_km == 0.0));

        assert!(parse_feed_line("   ").unwrap().is_none());
        assert!(parse_feed_line("{\"nonsense\": 1}").is_err());
    }

    #[test]
    fn test_road_update_apply() {
        let mut dests = vec![Destination::new("Center_A", RoadStatus::Open, 75.0, 6.0)];
        let update = RoadUpdate {
            name: "Center_A".to_string(),
            road_status: Some(RoadStatus::Blocked),
            capacity_pct: None,
            travel_time_hrs: Some(9.0),
        };
        assert!(update.apply(&mut dests));
        assert_eq!(dests[0].road_status, RoadStatus::Blocked);
        assert_eq!(dests[0].capacity_pct, 75.0);
        assert_eq!(dests[0].travel_time_hrs, 9.0);

        let unknown = RoadUpdate { name: "Nowhere".to_string(), ..update };
        assert!(!unknown.apply(&mut dests));
    }

    #[test]
    fn test_demo_scenario_readings_are_valid() {
        let feed = demo_scenario();
        let readings: Vec<&TelemetryReading> = feed
            .iter()
            .filter_map(|m| match m {
                FeedMessage::Reading(r) => Some(r),
                _ => None,
            })
            .collect();
        assert_eq!(readings.len(), 26);
        assert!(readings.iter().all(|r| r.validate().is_ok()));
        assert!(readings.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert!(feed.iter().any(|m| matches!(m, FeedMessage::Chaos { .. })));
    }
}

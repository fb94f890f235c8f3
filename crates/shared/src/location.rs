use serde::{Deserialize, Serialize};

/// Decimal-degree coordinates for a frame's capture location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

/// Degrees/minutes/seconds decomposition used by the EXIF renderings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DmsCoordinates {
    pub latitude_ref: char,
    pub latitude_degrees: u32,
    pub latitude_minutes: u32,
    pub latitude_seconds: f64,
    pub longitude_ref: char,
    pub longitude_degrees: u32,
    pub longitude_minutes: u32,
    pub longitude_seconds: f64,
}

impl LatLng {
    /// Parses the stored "lat lng" decimal string. Comma decimal separators
    /// are tolerated. Returns `None` for anything malformed.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split_whitespace();
        let latitude: f64 = parts.next()?.replace(',', ".").parse().ok()?;
        let longitude: f64 = parts.next()?.replace(',', ".").parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
        })
    }

    /// The storage format: "lat lng" in decimal degrees.
    pub fn decimal_string(&self) -> String {
        format!("{} {}", self.latitude, self.longitude)
    }

    pub fn dms(&self) -> DmsCoordinates {
        let (latitude_ref, lat) = if self.latitude < 0.0 {
            ('S', -self.latitude)
        } else {
            ('N', self.latitude)
        };
        let (longitude_ref, lng) = if self.longitude < 0.0 {
            ('W', -self.longitude)
        } else {
            ('E', self.longitude)
        };
        let (latitude_degrees, latitude_minutes, latitude_seconds) = to_dms(lat);
        let (longitude_degrees, longitude_minutes, longitude_seconds) = to_dms(lng);
        DmsCoordinates {
            latitude_ref,
            latitude_degrees,
            latitude_minutes,
            latitude_seconds,
            longitude_ref,
            longitude_degrees,
            longitude_minutes,
            longitude_seconds,
        }
    }

    /// Human-readable DMS rendering, e.g. `61° 29' 52.1" N 23° 47' 26.9" E`.
    pub fn readable(&self) -> String {
        let c = self.dms();
        format!(
            "{}\u{b0} {}' {:.1}\" {} {}\u{b0} {}' {:.1}\" {}",
            c.latitude_degrees,
            c.latitude_minutes,
            c.latitude_seconds,
            c.latitude_ref,
            c.longitude_degrees,
            c.longitude_minutes,
            c.longitude_seconds,
            c.longitude_ref,
        )
    }

    /// GPS arguments for an exiftool invocation.
    pub fn exiftool_args(&self) -> String {
        let c = self.dms();
        format!(
            "-GPSLatitude=\"{} {} {:.2}\" -GPSLatitudeRef=\"{}\" \
             -GPSLongitude=\"{} {} {:.2}\" -GPSLongitudeRef=\"{}\"",
            c.latitude_degrees,
            c.latitude_minutes,
            c.latitude_seconds,
            c.latitude_ref,
            c.longitude_degrees,
            c.longitude_minutes,
            c.longitude_seconds,
            c.longitude_ref,
        )
    }
}

fn to_dms(decimal_degrees: f64) -> (u32, u32, f64) {
    let degrees = decimal_degrees.trunc();
    let minutes = ((decimal_degrees - degrees) * 60.0).trunc();
    let seconds = (decimal_degrees - degrees) * 3600.0 - minutes * 60.0;
    (degrees as u32, minutes as u32, seconds)
}

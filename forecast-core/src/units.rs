//! Unit conversions and derived meteorological quantities.
//!
//! Everything here is a pure function over plain numbers.

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

pub const MPH_TO_KMH: f64 = 1.60934;
pub const KMH_TO_MPH: f64 = 0.621371;
pub const MPS_TO_MPH: f64 = 2.23694;
pub const KNOTS_TO_MPH: f64 = 1.15078;
pub const METERS_PER_MILE: f64 = 1609.34;
pub const PA_TO_INHG: f64 = 0.0002953;

/// Apparent temperature in °F.
///
/// Wind chill applies at or below 50 °F with at least 3 mph of wind, the
/// simplified Rothfusz heat index at or above 80 °F with at least 40 % relative
/// humidity. Anything else returns the air temperature unchanged. Missing
/// humidity counts as 50 %.
pub fn feels_like(temp_f: f64, wind_mph: f64, rh_pct: Option<f64>) -> f64 {
    let t = temp_f;
    let v = wind_mph.max(0.0);
    let rh = rh_pct.unwrap_or(50.0).clamp(0.0, 100.0);

    if t <= 50.0 && v >= 3.0 {
        let v16 = v.powf(0.16);
        return 35.74 + 0.6215 * t - 35.75 * v16 + 0.4275 * t * v16;
    }

    if t >= 80.0 && rh >= 40.0 {
        return -42.379 + 2.04901523 * t + 10.14333127 * rh
            - 0.22475541 * t * rh
            - 6.83783e-3 * t * t
            - 5.481717e-2 * rh * rh
            + 1.22874e-3 * t * t * rh
            + 8.5282e-4 * t * rh * rh
            - 1.99e-6 * t * t * rh * rh;
    }

    t
}

/// Parse an NWS wind speed text such as `"5 mph"`, `"5 to 10 mph"` or
/// `"Calm"` into whole mph. Ranges are averaged; km/h values are converted.
pub fn wind_speed_from_text(text: &str) -> i64 {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("calm") {
        return 0;
    }

    let lower = trimmed.to_ascii_lowercase();
    let is_kmh = lower.contains("km/h") || lower.contains("kmh");

    let numbers: Vec<f64> = lower
        .split(|c: char| !c.is_ascii_digit())
        .filter(|chunk| !chunk.is_empty())
        .filter_map(|chunk| chunk.parse::<f64>().ok())
        .collect();

    if numbers.is_empty() {
        return 0;
    }

    let avg = numbers.iter().sum::<f64>() / numbers.len() as f64;
    let mph = if is_kmh { avg * KMH_TO_MPH } else { avg };

    mph.round() as i64
}

/// Map a bearing in degrees onto one of the 16 compass points.
pub fn compass_from_degrees(deg: Option<f64>) -> Option<&'static str> {
    let deg = deg.filter(|d| d.is_finite())?;
    let normalized = deg.rem_euclid(360.0);
    let idx = ((normalized + 11.25) / 22.5).floor() as usize % COMPASS_POINTS.len();
    Some(COMPASS_POINTS[idx])
}

pub fn f_to_c(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

pub fn c_to_f(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn mph_to_kmh(mph: f64) -> f64 {
    mph * MPH_TO_KMH
}

pub fn kmh_to_mph(kmh: f64) -> f64 {
    kmh * KMH_TO_MPH
}

pub fn mps_to_mph(mps: f64) -> f64 {
    mps * MPS_TO_MPH
}

pub fn knots_to_mph(kt: f64) -> f64 {
    kt * KNOTS_TO_MPH
}

pub fn meters_to_miles(m: f64) -> f64 {
    m / METERS_PER_MILE
}

pub fn pa_to_inhg(pa: f64) -> f64 {
    pa * PA_TO_INHG
}

/// Round to the nearest whole number; missing or non-finite input stays missing.
pub fn round_opt(value: Option<f64>) -> Option<i64> {
    value.filter(|v| v.is_finite()).map(|v| v.round() as i64)
}

/// Format a speed as `"X mph (Y km/h)"`.
pub fn format_speed(mph: f64) -> String {
    format!("{} mph ({} km/h)", mph.round() as i64, mph_to_kmh(mph).round() as i64)
}

//! Integration tests for the NWS adapter using wiremock.

use chrono::{Duration, SecondsFormat, Utc};
use forecast_core::{ForecastError, SourceAdapter, provider::nws::NwsProvider};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> NwsProvider {
    NwsProvider::new(
        &server.uri(),
        "forecast-tests (test@example.com)",
        std::time::Duration::from_secs(5),
        chrono_tz::America::New_York,
        3,
    )
    .unwrap()
}

async fn mount_points(server: &MockServer) {
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/points/44.35,-73.86"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "properties": {
                "gridId": "BTV",
                "gridX": 68,
                "gridY": 42,
                "forecastHourly": format!("{base}/gridpoints/BTV/68,42/forecast/hourly"),
                "forecastGridData": format!("{base}/gridpoints/BTV/68,42"),
                "observationStations": format!("{base}/gridpoints/BTV/68,42/stations")
            }
        })))
        .mount(server)
        .await;
}

fn observation(timestamp: &str) -> serde_json::Value {
    serde_json::json!({
        "properties": {
            "timestamp": timestamp,
            "textDescription": "Mostly Cloudy",
            "temperature": { "unitCode": "wmoUnit:degC", "value": -2.8 },
            "relativeHumidity": { "unitCode": "wmoUnit:percent", "value": 78.4 },
            "windSpeed": { "unitCode": "wmoUnit:km_h-1", "value": 16.0 },
            "windGust": { "unitCode": "wmoUnit:km_h-1", "value": null },
            "windDirection": { "unitCode": "wmoUnit:degree_(angle)", "value": 290 },
            "visibility": { "unitCode": "wmoUnit:m", "value": 16090 },
            "barometricPressure": { "unitCode": "wmoUnit:Pa", "value": 101600 }
        }
    })
}

async fn mount_stations(server: &MockServer, ids: &[&str]) {
    let features: Vec<_> = ids
        .iter()
        .map(|id| serde_json::json!({ "properties": { "stationIdentifier": id } }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/gridpoints/BTV/68,42/stations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "features": features
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn resolve_site_reads_grid_links() {
    let server = MockServer::start().await;
    mount_points(&server).await;

    let handle = provider(&server).resolve_site(44.35, -73.86).await.unwrap();

    assert_eq!(handle.grid_id.as_deref(), Some("BTV"));
    assert_eq!(handle.grid_x, Some(68));
    assert!(handle.forecast_hourly_url.ends_with("/forecast/hourly"));
}

#[tokio::test]
async fn resolve_site_failure_is_source_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = provider(&server).resolve_site(44.35, -73.86).await.unwrap_err();

    assert!(matches!(err, ForecastError::SourceUnavailable { .. }));
    assert!(err.to_string().contains("upstream down"));
}

#[tokio::test]
async fn garbage_body_is_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = provider(&server).resolve_site(44.35, -73.86).await.unwrap_err();
    assert!(matches!(err, ForecastError::MalformedResponse { .. }));
}

#[tokio::test]
async fn hourly_periods_are_parsed_sorted_and_deduplicated() {
    let server = MockServer::start().await;
    mount_points(&server).await;

    Mock::given(method("GET"))
        .and(path("/gridpoints/BTV/68,42/forecast/hourly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "properties": {
                "periods": [
                    {
                        "startTime": "2025-01-15T11:00:00-05:00",
                        "temperature": 30,
                        "temperatureUnit": "F",
                        "windSpeed": "10 mph",
                        "windGust": "20 mph",
                        "windDirection": "W",
                        "relativeHumidity": { "value": 65 },
                        "probabilityOfPrecipitation": { "value": 40 }
                    },
                    {
                        "startTime": "2025-01-15T10:00:00-05:00",
                        "temperature": 28,
                        "temperatureUnit": "F",
                        "windSpeed": "5 to 10 mph",
                        "windDirection": "NW",
                        "relativeHumidity": { "value": 70 },
                        "probabilityOfPrecipitation": { "value": 20 }
                    },
                    {
                        "startTime": "not a time",
                        "temperature": 99,
                        "windSpeed": "1 mph"
                    },
                    {
                        "startTime": "2025-01-15T15:00:00+00:00",
                        "temperature": 29,
                        "temperatureUnit": "F",
                        "windSpeed": "Calm"
                    }
                ]
            }
        })))
        .mount(&server)
        .await;

    let p = provider(&server);
    let handle = p.resolve_site(44.35, -73.86).await.unwrap();
    let hourly = p.fetch_hourly(&handle).await.unwrap();

    assert_eq!(hourly.len(), 2);
    assert_eq!(hourly[0].time.format("%H:%M").to_string(), "10:00");
    // 15:00Z and 10:00 EST are the same hour; the later period wins.
    assert_eq!(hourly[0].temp_f, Some(29.0));
    assert_eq!(hourly[0].wind_mph, 0.0);
    assert_eq!(hourly[0].gust_mph, None);
    assert_eq!(hourly[1].wind_mph, 10.0);
    assert_eq!(hourly[1].gust_mph, Some(20.0));
    assert_eq!(hourly[1].pop_pct, Some(40.0));
}

#[tokio::test]
async fn grid_layers_are_normalised_and_bad_entries_dropped() {
    let server = MockServer::start().await;
    mount_points(&server).await;

    Mock::given(method("GET"))
        .and(path("/gridpoints/BTV/68,42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "properties": {
                "skyCover": {
                    "uom": "wmoUnit:percent",
                    "values": [
                        { "validTime": "2025-01-15T15:00:00+00:00/PT3H", "value": 75 },
                        { "validTime": "2025-01-15T18:00:00+00:00/bogus", "value": 80 },
                        { "validTime": "2025-01-15T19:00:00+00:00/PT1H", "value": null }
                    ]
                },
                "apparentTemperature": {
                    "uom": "wmoUnit:degC",
                    "values": [
                        { "validTime": "2025-01-15T15:00:00+00:00/PT1H", "value": -10 }
                    ]
                },
                "windGust": {
                    "uom": "wmoUnit:km_h-1",
                    "values": [
                        { "validTime": "2025-01-15T15:00:00+00:00/P1DT6H", "value": 32.18680 }
                    ]
                }
            }
        })))
        .mount(&server)
        .await;

    let p = provider(&server);
    let handle = p.resolve_site(44.35, -73.86).await.unwrap();
    let grid = p.fetch_grid(&handle).await.unwrap();

    assert_eq!(grid.len(), 3);

    let sky = grid.iter().find(|g| g.sky_cover_pct.is_some()).unwrap();
    assert_eq!(sky.hours, 3);
    assert_eq!(sky.sky_cover_pct, Some(75.0));

    let apparent = grid.iter().find_map(|g| g.apparent_temp_f).unwrap();
    assert!((apparent - 14.0).abs() < 1e-9);

    let gust = grid.iter().find(|g| g.wind_gust_mph.is_some()).unwrap();
    assert_eq!(gust.hours, 30);
    assert!((gust.wind_gust_mph.unwrap() - 20.0).abs() < 0.01);
}

#[tokio::test]
async fn current_conditions_from_first_reporting_station() {
    let server = MockServer::start().await;
    mount_points(&server).await;
    mount_stations(&server, &["KBAD", "KSLK"]).await;

    Mock::given(method("GET"))
        .and(path("/stations/KBAD/observations/latest"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let recent = (Utc::now() - Duration::minutes(20)).to_rfc3339_opts(SecondsFormat::Secs, true);
    Mock::given(method("GET"))
        .and(path("/stations/KSLK/observations/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(observation(&recent)))
        .mount(&server)
        .await;

    let p = provider(&server);
    let handle = p.resolve_site(44.35, -73.86).await.unwrap();
    let current = p.fetch_current(&handle).await.unwrap().expect("observation present");

    assert_eq!(current.station_id, "KSLK");
    assert_eq!(current.conditions, "Mostly Cloudy");
    assert_eq!(current.temp_c, Some(-3));
    assert_eq!(current.temp_f, Some(27));
    assert_eq!(current.rh_pct, Some(78));
    assert_eq!(current.wind_mph, Some(10));
    assert_eq!(current.gust_mph, None);
    assert_eq!(current.wind_dir_deg, Some(290.0));
    assert!((current.visibility_mi.unwrap() - 10.0).abs() < 0.01);
    assert!((current.pressure_inhg.unwrap() - 30.0).abs() < 0.01);
}

#[tokio::test]
async fn stale_observations_yield_none() {
    let server = MockServer::start().await;
    mount_points(&server).await;
    mount_stations(&server, &["KSLK"]).await;

    let stale = (Utc::now() - Duration::hours(12)).to_rfc3339_opts(SecondsFormat::Secs, true);
    Mock::given(method("GET"))
        .and(path("/stations/KSLK/observations/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(observation(&stale)))
        .mount(&server)
        .await;

    let p = provider(&server);
    let handle = p.resolve_site(44.35, -73.86).await.unwrap();

    assert!(p.fetch_current(&handle).await.unwrap().is_none());
}

//! End-to-end lookups against mock geocoding and forecast servers.

use std::time::{Duration, Instant};

use serde_json::{Value, json};
use weather_core::{
    Config, Coordinates, FixedLocator, LookupOutcome, LookupSource, Orchestrator, Position,
    ProviderId, Status,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HUMIDITY: &str = "relative_humidity_2m";

/// Open-Meteo style body with `hours` hourly and `days` daily points.
fn forecast_body(hours: usize, days: usize, humidity_key: &str) -> Value {
    let times: Vec<String> = (0..hours)
        .map(|h| format!("2026-10-17T{:02}:00", h % 24))
        .collect();
    let dates: Vec<String> = (0..days)
        .map(|d| format!("2026-10-{:02}", 17 + d))
        .collect();

    let mut hourly = json!({
        "time": times,
        "temperature_2m": vec![14.3; hours],
        "wind_speed_10m": vec![9.0; hours],
        "precipitation_probability": vec![20; hours],
        "weather_code": vec![2; hours]
    });
    hourly[humidity_key] = json!(vec![71; hours]);

    json!({
        "latitude": 48.86,
        "longitude": 2.35,
        "timezone": "Europe/Paris",
        "hourly": hourly,
        "daily": {
            "time": dates,
            "weather_code": vec![2; days],
            "temperature_2m_max": vec![18.0; days],
            "temperature_2m_min": vec![9.0; days]
        }
    })
}

fn full_week() -> Value {
    forecast_body(24, 7, HUMIDITY)
}

fn config_for(server: &MockServer) -> Config {
    let mut cfg = Config::default();
    let uri = server.uri();
    cfg.upsert_provider_base_url(ProviderId::Nominatim, uri);
    cfg.forecast_url = Some(server.uri());
    cfg
}

fn orchestrator(server: &MockServer) -> Orchestrator {
    Orchestrator::from_config(&config_for(server)).unwrap()
}

async fn mount_forecast(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn paris_lookup_reaches_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "lat": "48.8566",
                "lon": "2.3522",
                "display_name": "Paris, Île-de-France, France"
            }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "48.8566"))
        .and(query_param("longitude", "2.3522"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_week()))
        .mount(&server)
        .await;

    let orch = orchestrator(&server);
    let outcome = orch.lookup(LookupSource::place("Paris")).await;

    assert_eq!(outcome, LookupOutcome::Applied(Status::Ready));
    let session = orch.session();
    assert_eq!(session.status, Status::Ready);
    assert!(session.error_message.is_none());
    let coords = session.coordinates.unwrap();
    assert!(coords.display_name.contains("Paris"));
    let forecast = session.forecast.unwrap();
    assert_eq!(forecast.hourly.temperature.len(), 24);
    assert_eq!(forecast.daily.time.len(), 7);
    assert!(forecast.is_populated());
}

#[tokio::test]
async fn unknown_place_degrades_with_full_week() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let orch = orchestrator(&server);
    let outcome = orch.lookup(LookupSource::place("Zzyzx123")).await;

    assert_eq!(outcome, LookupOutcome::Applied(Status::Degraded));
    let session = orch.session();
    let message = session.error_message.unwrap_or_default();
    assert!(message.contains("Zzyzx123"));
    assert_eq!(session.forecast.unwrap().daily.time.len(), 7);
}

#[tokio::test]
async fn legacy_humidity_spelling_is_accepted() {
    let server = MockServer::start().await;
    let legacy = forecast_body(24, 7, "relativehumidity_2m");
    mount_forecast(&server, legacy).await;

    let orch = orchestrator(&server);
    let coords = Coordinates::new(48.8566, 2.3522, "Paris");
    orch.lookup(LookupSource::Coordinates(coords)).await;

    let session = orch.session();
    assert_eq!(session.status, Status::Ready);
    let humidity = session.forecast.unwrap().hourly.humidity;
    assert_eq!(humidity, vec![Some(71.0); 24]);
}

#[tokio::test]
async fn null_hour_in_series_still_reaches_ready() {
    let server = MockServer::start().await;
    let mut body = full_week();
    body["hourly"]["precipitation_probability"][5] = Value::Null;
    mount_forecast(&server, body).await;

    let orch = orchestrator(&server);
    let coords = Coordinates::new(48.8566, 2.3522, "Paris");
    let outcome = orch.lookup(LookupSource::Coordinates(coords)).await;

    assert_eq!(outcome, LookupOutcome::Applied(Status::Ready));
    let forecast = orch.session().forecast.unwrap();
    let precipitation = &forecast.hourly.precipitation_probability;
    assert_eq!(precipitation.len(), 24);
    assert_eq!(precipitation[4], Some(20.0));
    assert_eq!(precipitation[5], None);
}

#[tokio::test]
async fn missing_field_degrades() {
    let server = MockServer::start().await;
    let mut body = full_week();
    let daily = body["daily"].as_object_mut().unwrap();
    daily.remove("temperature_2m_min");
    mount_forecast(&server, body).await;

    let orch = orchestrator(&server);
    let coords = Coordinates::new(1.0, 1.0, "Somewhere");
    orch.lookup(LookupSource::Coordinates(coords)).await;

    let session = orch.session();
    assert_eq!(session.status, Status::Degraded);
    assert!(session.forecast.unwrap().is_populated());
}

#[tokio::test]
async fn hanging_forecast_degrades_within_deadline() {
    let server = MockServer::start().await;
    let hanging = ResponseTemplate::new(200)
        .set_delay(Duration::from_secs(30))
        .set_body_json(full_week());
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(hanging)
        .mount(&server)
        .await;

    let cfg = Config {
        timeout_secs: 1,
        ..config_for(&server)
    };
    let orch = Orchestrator::from_config(&cfg).unwrap();

    let started = Instant::now();
    let coords = Coordinates::new(1.0, 1.0, "Slow");
    let outcome = orch.lookup(LookupSource::Coordinates(coords)).await;

    assert_eq!(outcome, LookupOutcome::Applied(Status::Degraded));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn geolocated_lookup_uses_reverse_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", "45.76"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": { "city": "Lyon", "country": "France" }
        })))
        .mount(&server)
        .await;
    mount_forecast(&server, full_week()).await;

    let orch = orchestrator(&server);
    let locator = FixedLocator::at(Position::new(45.76, 4.84));
    let outcome = orch.lookup_here(&locator).await;

    assert_eq!(outcome, LookupOutcome::Applied(Status::Ready));
    let marker = orch.session().marker().unwrap();
    assert_eq!(marker.label, "Lyon");
    assert_eq!(marker.temperature, Some(14.3));
}

#[tokio::test]
async fn open_meteo_geocoder_can_be_selected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "name": "Paris",
                    "latitude": 48.85341,
                    "longitude": 2.3488,
                    "admin1": "Île-de-France",
                    "country": "France"
                }
            ]
        })))
        .mount(&server)
        .await;
    mount_forecast(&server, full_week()).await;

    let mut cfg = Config::default();
    cfg.set_geocoder(ProviderId::OpenMeteo);
    let uri = server.uri();
    cfg.upsert_provider_base_url(ProviderId::OpenMeteo, uri);
    cfg.forecast_url = Some(server.uri());

    let orch = Orchestrator::from_config(&cfg).unwrap();
    orch.lookup(LookupSource::place("Paris")).await;

    let coords = orch.session().coordinates.unwrap();
    assert_eq!(coords.display_name, "Paris, Île-de-France, France");
}

//! Deutsch Daily: binary entrypoint.
//! Boots the Axum HTTP server on Shuttle with config, tracing and metrics wired.

use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    deutsch_daily::telemetry::init_tracing();

    let router = deutsch_daily::app().map_err(shuttle_runtime::Error::Custom)?;
    Ok(router.into())
}

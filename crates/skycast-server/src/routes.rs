use std::collections::HashMap;
use std::convert::Infallible;
use warp::{Filter, Reply};

use crate::error::recover;
use crate::{handlers, AppState};

/// All API routes, with rejections recovered into JSON error bodies.
pub fn routes(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let geocode = warp::path!("api" / "geocode")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_state(state.clone()))
        .and_then(handlers::geocode);

    let weather = warp::path!("api" / "weather")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_state(state))
        .and_then(handlers::weather);

    let health = warp::path!("api" / "health")
        .and(warp::get())
        .map(handlers::health);

    geocode
        .or(weather)
        .or(health)
        .recover(recover)
        .with(warp::trace::request())
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

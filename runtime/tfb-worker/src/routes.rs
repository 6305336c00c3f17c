//! HTTP routes. Store-backed endpoints hand their work to the
//! [`Dispatcher`] and render whatever comes back.

use std::num::IntErrorKind;

use actix_web::http::header::{self, ContentType};
use actix_web::middleware::DefaultHeaders;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use tfb_db::RandomKeys;

use crate::dispatch::{DispatchError, Dispatcher};
use crate::render::fortunes_html;

/// Value of the `Server` header on store-backed responses.
pub const SERVER_NAME: &str = "tfb-actix";

const HELLO: &str = "Hello, World!";

#[derive(Serialize)]
struct Message {
    message: &'static str,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Raw query-string pairs. Repeated keys are kept, so extraction never
/// rejects a request.
type QueryPairs = web::Query<Vec<(String, String)>>;

/// Register every endpoint.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/json", web::get().to(json))
        .route("/plaintext", web::get().to(plaintext))
        .service(
            web::scope("")
                .wrap(DefaultHeaders::new().add((header::SERVER, SERVER_NAME)))
                .route("/db", web::get().to(db))
                .route("/queries", web::get().to(queries))
                .route("/fortune", web::get().to(fortune))
                .route("/update", web::get().to(update)),
        );
}

/// First `queries` value in the query string, if any.
pub fn queries_value(pairs: &[(String, String)]) -> Option<&str> {
    pairs
        .iter()
        .find(|(key, _)| key == "queries")
        .map(|(_, value)| value.as_str())
}

/// Parse the raw `queries` value. Digit strings too large for `i64` saturate;
/// anything else unparsable is treated as absent.
pub fn parse_queries(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    match raw.parse::<i64>() {
        Ok(value) => Some(value),
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => Some(i64::MAX),
        Err(err) if *err.kind() == IntErrorKind::NegOverflow => Some(i64::MIN),
        Err(_) => None,
    }
}

async fn json() -> HttpResponse {
    HttpResponse::Ok().json(Message { message: HELLO })
}

async fn plaintext() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(HELLO)
}

async fn db(dispatcher: web::Data<Dispatcher>) -> HttpResponse {
    let result = dispatcher
        .run("db", |session| session.fetch_world(&mut RandomKeys::new()))
        .await;
    match result {
        Ok(world) => HttpResponse::Ok().json(world),
        Err(err) => json_failure("db", err),
    }
}

async fn queries(
    dispatcher: web::Data<Dispatcher>,
    params: QueryPairs,
) -> HttpResponse {
    let requested = parse_queries(queries_value(&params));
    let result = dispatcher
        .run("queries", move |session| {
            session.fetch_worlds(&mut RandomKeys::new(), requested)
        })
        .await;
    match result {
        Ok(worlds) => HttpResponse::Ok().json(worlds),
        Err(err) => json_failure("queries", err),
    }
}

async fn update(
    dispatcher: web::Data<Dispatcher>,
    params: QueryPairs,
) -> HttpResponse {
    let requested = parse_queries(queries_value(&params));
    let result = dispatcher
        .run("update", move |session| {
            session.update_worlds(&mut RandomKeys::new(), requested)
        })
        .await;
    match result {
        Ok(worlds) => HttpResponse::Ok().json(worlds),
        Err(err) => json_failure("update", err),
    }
}

async fn fortune(dispatcher: web::Data<Dispatcher>) -> HttpResponse {
    match dispatcher.run("fortune", |session| session.list_fortunes()).await {
        Ok(fortunes) => HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(fortunes_html(&fortunes)),
        Err(err) => {
            log_failure("fortune", &err);
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn log_failure(endpoint: &'static str, err: &DispatchError) {
    match err {
        DispatchError::Query(failure) => tracing::error!(
            endpoint,
            statement = failure.statement(),
            error = %failure,
            "query failed"
        ),
        DispatchError::Busy | DispatchError::PoolExhausted => {
            tracing::warn!(endpoint, error = %err, "request refused")
        }
        _ => tracing::error!(endpoint, error = %err, "request failed"),
    }
}

fn json_failure(endpoint: &'static str, err: DispatchError) -> HttpResponse {
    log_failure(endpoint, &err);
    let mut response = match err {
        DispatchError::Busy | DispatchError::PoolExhausted => HttpResponse::ServiceUnavailable(),
        _ => HttpResponse::InternalServerError(),
    };
    response.json(ErrorBody {
        error: err.to_string(),
    })
}

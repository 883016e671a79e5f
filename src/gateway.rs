//! HTTP transport over a [`DocumentStore`]: `GET` reads, `POST` replaces.
//!
//! Handlers run the blocking file I/O on actix's blocking pool. Store errors,
//! a missing data file included, become `500 {"error": ...}`; there are no
//! retries. Malformed JSON bodies get `400 {"error": ...}`.
//!
//! `GET /api/json` answers with an `ETag` holding the SHA-256 of the file
//! bytes. A `POST` that echoes it back in `If-Match` is applied only if the
//! file still hashes the same (`412` otherwise), which is how the bundled
//! client appends a row without losing a concurrent one. The tag survives a
//! restart and goes stale when the file is edited by hand.

use crate::error::Error;
use crate::store::DocumentStore;
use crate::Document;
use actix_web::error::InternalError;
use actix_web::http::header::{self, EntityTag, ETag};
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::{json, Value};

const INDEX_HTML: &str = include_str!("../public/index.html");
const SCRIPT_JS: &str = include_str!("../public/script.js");
const STYLE_CSS: &str = include_str!("../public/style.css");

/// Register the API and the static client on an app.
///
/// The app must carry a `web::Data<DocumentStore>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let msg = err.to_string();
        log::warn!("rejected request body: {msg}");
        InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(json!({ "error": msg })),
        )
        .into()
    }))
    .service(
        web::resource("/api/json")
            .route(web::get().to(get_document))
            .route(web::post().to(replace_document)),
    )
    .route("/", web::get().to(index))
    .route("/script.js", web::get().to(script))
    .route("/style.css", web::get().to(style));
}

/// `GET /api/json`: the whole document.
pub async fn get_document(store: web::Data<DocumentStore>) -> HttpResponse {
    let store = store.into_inner();
    match web::block(move || store.read_existing()).await {
        Ok(Ok((doc, tag))) => HttpResponse::Ok()
            .insert_header(ETag(EntityTag::new_strong(tag)))
            .json(doc),
        Ok(Err(e)) => store_error(&e),
        Err(e) => internal_error(e.to_string()),
    }
}

/// `POST /api/json`: replace the document with the request body.
pub async fn replace_document(
    req: HttpRequest,
    store: web::Data<DocumentStore>,
    body: web::Json<Value>,
) -> HttpResponse {
    let expected = match expected_tag(&req) {
        Ok(tag) => tag,
        Err(msg) => return HttpResponse::BadRequest().json(json!({ "error": msg })),
    };
    let doc = match into_document(body.into_inner()) {
        Ok(doc) => doc,
        Err(msg) => return HttpResponse::BadRequest().json(json!({ "error": msg })),
    };

    log::info!("POST /api/json - {} record(s), if-match {:?}", doc.len(), expected);
    let store = store.into_inner();
    let result = web::block(move || match expected {
        Some(tag) => store.replace_if_tag(&tag, &doc).map(|_| ()),
        None => store.replace(&doc),
    })
    .await;

    match result {
        Ok(Ok(())) => HttpResponse::Ok().json(json!({ "message": "Document updated" })),
        Ok(Err(e)) => store_error(&e),
        Err(e) => internal_error(e.to_string()),
    }
}

async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

async fn script() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/javascript; charset=utf-8")
        .body(SCRIPT_JS)
}

async fn style() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/css; charset=utf-8")
        .body(STYLE_CSS)
}

/// Arrays replace the document; a lone object becomes a one-row document.
fn into_document(body: Value) -> Result<Document, String> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(obj) => Ok(vec![Value::Object(obj)]),
        _ => Err("request body must be a JSON array or object".into()),
    }
}

/// `If-Match: "ab12"` -> `Some("ab12")`. Absent header or `*` means
/// unconditional.
fn expected_tag(req: &HttpRequest) -> Result<Option<String>, String> {
    let Some(raw) = req.headers().get(header::IF_MATCH) else {
        return Ok(None);
    };
    let raw = raw
        .to_str()
        .map_err(|_| "If-Match header is not valid text".to_string())?
        .trim();
    if raw == "*" {
        return Ok(None);
    }
    let tag = raw.trim_start_matches("W/").trim_matches('"');
    if tag.is_empty() {
        return Err(format!("If-Match must carry an entity tag, got {raw}"));
    }
    Ok(Some(tag.to_owned()))
}

fn store_error(err: &Error) -> HttpResponse {
    match err {
        Error::Conflict { .. } | Error::Stale { .. } => {
            log::warn!("replace rejected: {err}");
            HttpResponse::PreconditionFailed().json(json!({ "error": err.to_string() }))
        }
        _ => {
            log::error!("document store failure: {err}");
            HttpResponse::InternalServerError().json(json!({ "error": err.to_string() }))
        }
    }
}

fn internal_error(msg: String) -> HttpResponse {
    log::error!("blocking task failed: {msg}");
    HttpResponse::InternalServerError().json(json!({ "error": msg }))
}

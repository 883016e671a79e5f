use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use json_roster::config::ServerConfig;
use json_roster::{gateway, DocumentStore};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cfg = ServerConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let store = DocumentStore::builder(&cfg.data_file)
        .pretty(cfg.pretty)
        .build()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    // GET answers 500 on a missing file, so a fresh install starts from []
    if !store.path().exists() {
        store
            .replace(&[])
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        log::info!("created empty document at {}", store.path().display());
    }

    // surface a corrupt data file at startup rather than on the first request
    match store.read() {
        Ok(doc) => log::info!("{} holds {} record(s)", store.path().display(), doc.len()),
        Err(e) => log::warn!("{} is not readable yet: {e}", store.path().display()),
    }

    let store = web::Data::new(store);
    let (host, port) = cfg.bind_addr();
    log::info!("listening on http://{host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .wrap(Logger::default())
            .configure(gateway::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

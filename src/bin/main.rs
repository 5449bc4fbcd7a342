use std::sync::Arc;

use actix_web::cookie::Key;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clap::Parser;

use blotter::config::{RunArgs, Settings};
use blotter::core::db;
use blotter::mail::LogMailer;
use blotter::AppState;

fn session_key(args: &RunArgs) -> anyhow::Result<Key> {
    match &args.session_key {
        Some(secret) => Key::try_from(secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid session key: {}", e)),
        None => {
            log::warn!("no session key configured, sessions will not survive a restart");
            Ok(Key::generate())
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = RunArgs::parse();
    let key = session_key(&args)?;

    log::info!("opening database {}", args.database_url);
    let db = db::connect(&args.database_url, args.fresh)
        .await
        .context("database setup failed")?;

    let state = AppState::new(db, Arc::new(LogMailer), Settings::from_args(&args));
    let secure = args.secure_cookies;

    log::info!("listening on http://{}:{}", args.address, args.port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(blotter::session_middleware(key.clone(), secure))
            .wrap(Logger::default())
            .configure(blotter::configure)
            .default_service(web::route().to(blotter::not_found))
    })
    .bind((args.address.as_str(), args.port))?
    .run()
    .await?;

    Ok(())
}

use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::path::PathBuf;

use fiberlink_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    events::ChangeFeed,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    session::SessionStore,
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration file");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
        config.jwt.reset_token_expires_in,
    );

    let session_store = SessionStore::new(config.session.persist_path.clone().map(PathBuf::from));
    let change_feed = ChangeFeed::default();

    let auth_service = AuthService::new(pool.clone(), jwt_service.clone());
    let profile_service = ProfileService::new(pool.clone(), session_store.clone());
    let plan_service = PlanService::new(pool.clone());
    let subscription_service = SubscriptionService::new(pool.clone(), config.subscriptions.clone());
    let transaction_service = TransactionService::new(pool.clone());
    let ticket_service = TicketService::new(pool.clone(), change_feed.clone());
    let usage_service = UsageService::new(pool.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(profile_service.clone()))
            .app_data(web::Data::new(plan_service.clone()))
            .app_data(web::Data::new(subscription_service.clone()))
            .app_data(web::Data::new(transaction_service.clone()))
            .app_data(web::Data::new(ticket_service.clone()))
            .app_data(web::Data::new(usage_service.clone()))
            .app_data(web::Data::new(change_feed.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::account_config)
                    .configure(handlers::plan_config)
                    .configure(handlers::subscription_config)
                    .configure(handlers::transaction_config)
                    .configure(handlers::ticket_config)
                    .configure(handlers::usage_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}

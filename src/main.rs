use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;
use std::time::Duration;

use raffle_backend::{
    config::Config,
    database::{ConnectionPool, run_migrations},
    debounce::DebounceGuard,
    display::DisplayBoard,
    handlers,
    middlewares::create_cors,
    services::{DrawService, DrawSettings, ResponseCache},
    swagger::swagger_config,
    tasks,
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

    let config = Config::from_toml().expect("Failed to load configuration");

    let pool = ConnectionPool::new(config.database.clone());
    {
        let conn = pool
            .acquire()
            .await
            .expect("Failed to open the database");
        run_migrations(&conn)
            .await
            .expect("Failed to run database migrations");
    }

    let cache = Arc::new(ResponseCache::new());
    let debounce = Arc::new(DebounceGuard::new());
    let board = Arc::new(DisplayBoard::new(Duration::from_secs(
        config.display.ttl_secs,
    )));

    let draw_service = DrawService::new(
        pool.clone(),
        cache.clone(),
        debounce.clone(),
        DrawSettings::from(&config),
    );

    tasks::spawn_all(&config, cache, debounce, board.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let admin_token = config.admin.token.clone();
    let board_data = web::Data::from(board);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(draw_service.clone()))
            .app_data(board_data.clone())
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::participant_config)
                    .configure(handlers::session_config)
                    .configure(handlers::display_config)
                    .configure(handlers::admin_config(admin_token.clone())),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await;

    pool.close_all().await;
    server
}

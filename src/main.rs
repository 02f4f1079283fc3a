use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::info;

mod api;
mod cli;
mod config;
mod db;
mod logging;
mod shutdown;

use crate::api::{health::health_config, job::job_config, validation};
use crate::cli::{Cli, Command};
use crate::db::job_repository::JobRepository;
use crate::shutdown::ShutdownCoordinator;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    // Load configuration from environment
    let config::Config {
        database_url,
        host,
        port,
        max_payload_size,
        max_db_connections,
        log_dir,
    } = config::Config::from_env().expect("Failed to load configuration");

    std::fs::create_dir_all(&log_dir).expect("Failed to create logs directory");
    logging::init(&log_dir);

    let pool = db::connection::get_connection(&database_url, max_db_connections)
        .await
        .expect("Failed to connect to database");

    // Migrations run on every start; `migrate` just stops after them.
    db::migrations::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    if let Some(Command::Migrate) = cli.command {
        info!("Migrations applied, exiting");
        pool.close().await;
        return Ok(());
    }

    // No command provided - start the server
    info!("Starting job-tracker");
    info!("  - Listening on {}:{}", host, port);
    info!("  - Max payload size: {} bytes", max_payload_size);
    info!("  - Max database connections: {}", max_db_connections);

    let server_pool = pool.clone();

    let server = HttpServer::new(move || {
        // Each worker gets its own repository handle over the shared pool
        let repository = web::Data::new(JobRepository::new(server_pool.clone()));

        let payload_config = web::PayloadConfig::default().limit(max_payload_size);

        App::new()
            .app_data(web::Data::new(server_pool.clone())) // Pool for health checks
            .app_data(repository)
            .app_data(payload_config)
            .app_data(validation::json_config())
            .configure(health_config)
            .configure(job_config)
    });

    let server = server.bind((host.as_str(), port))?.run();
    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    let coordinator = ShutdownCoordinator::new(server_handle, server_task, pool);
    coordinator.wait_for_shutdown().await
}

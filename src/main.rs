use std::sync::Arc;

use nutrition_api::api::{create_routes, AppState};
use nutrition_api::auth::JwtService;
use nutrition_api::config::{run_migrations, AppConfig, ChatConfig, DatabaseConfig, FcmConfig};
use nutrition_api::logging::init_tracing;
use nutrition_api::repositories::{
    DeviceTokenRepository, PgCommentRepository, PgDeviceTokenRepository, PgNotificationRepository, PgUserDirectory,
    UserDirectory,
};
use nutrition_api::services::{
    spawn_dispatch_worker, ChatService, CommentService, FcmClient, NotificationEvents, NotificationService,
    PushDispatcher,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = AppConfig::from_env()?;
    init_tracing(&app_config);

    let db_config = DatabaseConfig::from_env()?;
    let fcm_config = FcmConfig::from_env()?;
    let chat_config = ChatConfig::from_env()?;

    info!(
        "Starting in {} mode (project: {})",
        app_config.environment,
        fcm_config.project_id.as_deref().unwrap_or("<unset>")
    );
    if app_config.is_production() && app_config.jwt_secret == "your-secret-key-change-in-production" {
        warn!("JWT_SECRET is the built-in default; set it before serving real users");
    }

    let pool = db_config.create_pool().await?;
    run_migrations(&pool).await?;
    info!("Database ready");

    let tokens: Arc<dyn DeviceTokenRepository> = Arc::new(PgDeviceTokenRepository::new(pool.clone()));
    let users: Arc<dyn UserDirectory> = Arc::new(PgUserDirectory::new(pool.clone()));

    let (events, worker) = match FcmClient::from_config(&fcm_config)? {
        Some(client) => {
            info!("Push delivery enabled for project {}", client.project_id());
            let (events, rx) = NotificationEvents::channel(app_config.push_queue_capacity);
            let dispatcher = PushDispatcher::new(tokens.clone(), Arc::new(client));
            (events, Some(spawn_dispatch_worker(rx, dispatcher, app_config.push_concurrency)))
        }
        None => {
            warn!("No FCM credentials configured; notifications are stored but not pushed");
            (NotificationEvents::disabled(), None)
        }
    };

    let chat_service = ChatService::new(chat_config)?;
    if chat_service.is_enabled() {
        info!("Chat proxy using model {}", chat_service.model());
    } else {
        warn!("CHAT_API_KEY not set; /chat will answer 503");
    }

    let state = AppState {
        jwt_service: JwtService::new(&app_config.jwt_secret)
            .with_issuer(app_config.jwt_issuer.clone())
            .with_audience(app_config.jwt_audience.clone()),
        comment_service: CommentService::new(Arc::new(PgCommentRepository::new(pool.clone())), users.clone()),
        notification_service: NotificationService::new(
            Arc::new(PgNotificationRepository::new(pool.clone())),
            tokens,
            users,
            events,
        ),
        chat_service,
    };

    let app = create_routes(state, app_config.body_limit_bytes);

    let listener = TcpListener::bind(app_config.server_address()).await?;
    info!("Nutrition API listening on http://{}", app_config.server_address());
    info!("Health check available at http://{}/health", app_config.server_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router owned every event producer; the worker stops once drained
    if let Some(worker) = worker {
        worker.await?;
    }

    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

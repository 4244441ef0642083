use std::{process, sync::Arc};

use axum_extra::extract::cookie::Key;
use pblog::{
    application::{
        bootstrap::{BootstrapOutcome, create_blog},
        error::AppError,
        repos::BlogsRepo,
    },
    config::{self, MIN_COOKIE_SECRET_BYTES},
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, HttpConfig, HttpRepositories, HttpState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Create(_) => run_create(settings).await,
    }
}

async fn connect(settings: &config::Settings) -> Result<Arc<PostgresRepositories>, AppError> {
    let url = settings.database.url.as_deref().ok_or_else(|| {
        AppError::from(InfraError::configuration(
            "database.url is not set; pass --database-url or PBLOG__DATABASE__URL",
        ))
    })?;

    let max_connections = settings.database.max_connections.get();
    let pool = PostgresRepositories::connect(url, max_connections)
        .await
        .map_err(|err| InfraError::database(format!("failed to connect: {err}")))?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::from)?;

    let repositories = Arc::new(PostgresRepositories::new(pool));
    repositories
        .health_check()
        .await
        .map_err(|err| InfraError::database(format!("health check failed: {err}")))?;
    Ok(repositories)
}

async fn run_create(settings: config::Settings) -> Result<(), AppError> {
    let repositories = connect(&settings).await?;

    let outcome = create_blog(
        repositories,
        &settings.blog.name,
        &settings.blog.bootstrap_password,
    )
    .await
    .map_err(|err| AppError::unexpected(format!("failed to create blog: {err}")))?;

    match outcome {
        BootstrapOutcome::Created(blog) => {
            info!(blog_id = blog.id, name = %blog.name, "blog ready");
        }
        BootstrapOutcome::AlreadyExists(blog) => {
            info!(blog_id = blog.id, name = %blog.name, "blog already present");
        }
    }
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = connect(&settings).await?;

    if repositories
        .find_blog_by_name(&settings.blog.name)
        .await
        .map_err(AppError::from)?
        .is_none()
    {
        return Err(InfraError::missing_blog(settings.blog.name.clone()).into());
    }

    let state = HttpState::new(
        HttpRepositories::from_postgres(&repositories),
        HttpConfig {
            blog_name: settings.blog.name.clone(),
            cookie_key: cookie_key(settings.session.cookie_secret.as_deref()),
            public_url: settings.server.public_url.clone(),
            trust_forwarded: settings.server.trust_forwarded,
            static_dir: settings.static_files.directory.clone(),
        },
    );

    let router = http::build_router(state);
    http::serve(
        settings.server.addr,
        router,
        settings.server.graceful_shutdown,
    )
    .await
    .map_err(AppError::from)?;

    info!("server stopped");
    Ok(())
}

/// Signing key for the session cookie. Without a secret a random key is used,
/// so sessions do not survive a restart.
fn cookie_key(secret: Option<&str>) -> Key {
    match secret.map(str::as_bytes) {
        Some(bytes) if bytes.len() >= MIN_COOKIE_SECRET_BYTES => match Key::try_from(bytes) {
            Ok(key) => key,
            Err(err) => {
                warn!(error = %err, "unusable cookie secret; generating a random key");
                Key::generate()
            }
        },
        Some(_) => {
            warn!(
                min_bytes = MIN_COOKIE_SECRET_BYTES,
                "cookie secret too short; generating a random key"
            );
            Key::generate()
        }
        None => {
            warn!("no cookie secret configured; sessions end when the server restarts");
            Key::generate()
        }
    }
}

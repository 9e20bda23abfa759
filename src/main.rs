use std::{net::IpAddr, path::PathBuf, process::exit};

use chrono::Utc;
use clap::Parser;
use entity::user;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, Set};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::{
    models::storage::DiskStorage,
    services::ServiceError,
    store::{Store, UserStore},
};

mod models;
mod routes;
mod services;
mod store;
#[cfg(test)]
mod testing;

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Args {
    #[clap(long, env = "DATABASE_URL", default_value = "sqlite://chirp.db?mode=rwc")]
    /// Database connection url
    database_url: String,

    #[clap(long, env = "UPLOAD_DIR", default_value = "uploads")]
    /// Directory uploaded media is written to
    upload_dir: PathBuf,

    #[clap(long, env = "MEDIA_PREFIX", default_value = "/media/")]
    /// Prefix of the media locations handed out to clients
    media_prefix: String,

    #[clap(long, default_value = "127.0.0.1")]
    /// Address to listen on
    address: IpAddr,

    #[clap(short, long, default_value_t = 8000)]
    /// Port to listen on
    port: u16,

    #[clap(long)]
    /// Run migrations and exit
    migrate_only: bool,

    #[clap(long, requires = "api_key")]
    /// Create a user with this name and exit
    create_user: Option<String>,

    #[clap(long, requires = "create_user")]
    /// Api key of the user created by --create-user
    api_key: Option<String>,
}

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let db = Database::connect(args.database_url.as_str()).await?;
    Migrator::up(&db, None).await?;

    if args.migrate_only {
        info!("migrations applied");
        exit(0);
    }

    if let (Some(name), Some(api_key)) = (args.create_user, args.api_key) {
        let created = UserStore::new(&db)
            .add(user::ActiveModel {
                name: Set(name),
                api_key: Set(api_key),
                created_at: Set(Utc::now()),
                ..Default::default()
            })
            .await
            .map_err(|e| ServiceError::on_duplicate(e, "api key is already taken"));

        match created {
            Ok(user) => info!(user_id = user.id, name = %user.name, "user created"),
            Err(e) => {
                error!(error = %e, "failed to create user");
                exit(1);
            }
        }

        exit(0);
    }

    let storage = DiskStorage::new(args.upload_dir, args.media_prefix);
    storage.prepare().await?;

    let _ = routes::build(db, storage)
        .configure(rocket::Config {
            address: args.address,
            port: args.port,
            ident: rocket::config::Ident::none(),
            ..Default::default()
        })
        .launch()
        .await?;

    Ok(())
}

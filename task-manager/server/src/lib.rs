pub mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
    pub struct Config {
        #[serde(default = "default_database_url")]
        pub database_url: String,
        #[serde(default = "default_port")]
        pub port: u16,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_environment(config::Environment::default())
        }

        /// Loads configuration from the given environment source.
        pub fn from_environment(environment: config::Environment) -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(environment.try_parsing(true))
                .build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }
    }

    fn default_database_url() -> String {
        "sqlite://tasks.db?mode=rwc".to_string()
    }

    fn default_port() -> u16 {
        8000
    }

}

pub mod database {
    use migration::MigratorTrait;
    use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

    /// Opens a connection pool for the given URL.
    #[tracing::instrument(skip(database_url))]
    pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
        let mut options = ConnectOptions::new(database_url);
        options.sqlx_logging(false);
        Database::connect(options).await
    }

    /// Creates the tasks table if it does not exist yet. Safe to call repeatedly.
    #[tracing::instrument(skip(db))]
    pub async fn initialize(db: &DatabaseConnection) -> Result<(), DbErr> {
        migration::Migrator::up(db, None).await?;
        tracing::info!("Database schema is up to date");
        Ok(())
    }
}

pub mod entities;
pub mod task;
pub mod web;

/// Configuration management for the API server
///
/// Configuration comes from environment variables, with a `.env` file loaded
/// first in development.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `PRODUCTION`: Enables HSTS (default: false)
/// - `JWT_SECRET`: Secret key for JWT signing (required, at least 32 chars)
/// - `STORE_BACKEND`: `memory`, `postgres` or `google-sheets` (default: memory)
/// - `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS`: postgres backend
/// - `SHEETS_SPREADSHEET_ID`, `SHEETS_ACCESS_TOKEN`, `SHEETS_API_BASE`:
///   google-sheets backend
/// - `CACHE_TTL_SECS`: Snapshot cache lifetime (default: 30)
/// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
///
/// # Example
///
/// ```no_run
/// use clubtask_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Sheet store configuration
    pub store: StoreConfig,

    /// Log output format
    pub log_format: LogFormat,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` allows any)
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// Sheet store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Selected backend
    pub backend: StoreBackend,

    /// Snapshot cache lifetime in seconds (0 disables caching)
    pub cache_ttl_secs: u64,
}

/// Backend holding the `Members` and `Tasks` tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local tables, lost on restart
    Memory,

    /// PostgreSQL tables
    Postgres { url: String, max_connections: u32 },

    /// A Google spreadsheet with `Members` and `Tasks` tabs
    GoogleSheets {
        spreadsheet_id: String,
        access_token: String,
        api_base: Option<String>,
    },
}

impl StoreBackend {
    /// Short label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Postgres { .. } => "postgres",
            StoreBackend::GoogleSheets { .. } => "google-sheets",
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing or shorter than 32 characters
    /// - The selected backend is missing its settings
    /// - A numeric or boolean variable does not parse
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| {
            lookup(key).ok_or_else(|| anyhow::anyhow!("{} environment variable is required", key))
        };

        let host = var("API_HOST", "0.0.0.0");
        let port = var("API_PORT", "8080").parse::<u16>()?;
        let cors_origins = var("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
        let production = var("PRODUCTION", "false").parse::<bool>()?;

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let backend = match var("STORE_BACKEND", "memory").as_str() {
            "memory" => StoreBackend::Memory,
            "postgres" => StoreBackend::Postgres {
                url: required("DATABASE_URL")?,
                max_connections: var("DATABASE_MAX_CONNECTIONS", "5").parse::<u32>()?,
            },
            "google-sheets" => StoreBackend::GoogleSheets {
                spreadsheet_id: required("SHEETS_SPREADSHEET_ID")?,
                access_token: required("SHEETS_ACCESS_TOKEN")?,
                api_base: lookup("SHEETS_API_BASE"),
            },
            other => anyhow::bail!(
                "Unknown STORE_BACKEND '{}' (expected memory, postgres or google-sheets)",
                other
            ),
        };

        let cache_ttl_secs = var("CACHE_TTL_SECS", "30").parse::<u64>()?;

        let log_format = match var("LOG_FORMAT", "pretty").as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            other => anyhow::bail!("Unknown LOG_FORMAT '{}' (expected pretty or json)", other),
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            jwt: JwtConfig { secret: jwt_secret },
            store: StoreConfig {
                backend,
                cache_ttl_secs,
            },
            log_format,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

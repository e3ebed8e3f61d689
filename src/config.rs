use serde::Deserialize;

/// Record key used when no prefix is configured.
pub const DEFAULT_RECORD_KEY: &str = "urls";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Server settings
    pub listen_addr: String,
    pub static_dir: String,
    pub debug: bool,

    // Access control
    pub password: Option<String>,

    // Durable store
    pub store_backend: StoreBackend,
    pub db_path: String,
    pub key_prefix: Option<String>,

    // Registration
    pub ignore_keywords: Vec<String>,

    // Dispatch and probing
    pub max_failures: u32,
    pub dispatch_timeout_ms: u64,
    pub probe_timeout_ms: u64,
    pub prune_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:1188".to_string(),
            static_dir: "static".to_string(),
            debug: false,
            password: None,
            store_backend: StoreBackend::Sqlite,
            db_path: "endpoints.db".to_string(),
            key_prefix: None,
            ignore_keywords: Vec::new(),
            max_failures: 3,
            dispatch_timeout_ms: 5000,
            probe_timeout_ms: 2000,
            prune_interval_secs: 0,
        }
    }
}

impl Config {
    /// Key under which all endpoint records are stored.
    pub fn record_key(&self) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, DEFAULT_RECORD_KEY),
            None => DEFAULT_RECORD_KEY.to_string(),
        }
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> anyhow::Result<Config> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Load configuration from an arbitrary key lookup.
pub fn load_config_from<F>(lookup: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = Config::default();
    // Empty values count as unset, matching how the variables are usually templated
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let listen_addr = match non_empty("PORT") {
        Some(port) => {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid PORT {:?}: {}", port, e))?;
            format!("0.0.0.0:{}", port)
        }
        None => defaults.listen_addr,
    };

    let static_dir = non_empty("STATIC_DIR").unwrap_or(defaults.static_dir);

    let debug = lookup("DEBUG").is_some();

    let password = non_empty("PASSWORD");

    let store_backend = match non_empty("STORE_BACKEND").map(|v| v.to_lowercase()) {
        None => defaults.store_backend,
        Some(v) if v == "sqlite" => StoreBackend::Sqlite,
        Some(v) if v == "memory" => StoreBackend::Memory,
        Some(v) => anyhow::bail!("unknown STORE_BACKEND {:?}", v),
    };

    let db_path = non_empty("DB_PATH").unwrap_or(defaults.db_path);

    let key_prefix = non_empty("PREFIX_KEY");

    let ignore_keywords = non_empty("IGNORE_KEYWORDS")
        .map(|v| {
            // Matched as raw substrings; only empty entries are dropped
            v.split(',')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let max_failures = non_empty("MAX_FAILURES")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(defaults.max_failures);

    let dispatch_timeout_ms = non_empty("DISPATCH_TIMEOUT_MS")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(defaults.dispatch_timeout_ms);

    let probe_timeout_ms = non_empty("PROBE_TIMEOUT_MS")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(defaults.probe_timeout_ms);

    let prune_interval_secs = non_empty("PRUNE_INTERVAL_SECS")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(defaults.prune_interval_secs);

    Ok(Config {
        listen_addr,
        static_dir,
        debug,
        password,
        store_backend,
        db_path,
        key_prefix,
        ignore_keywords,
        max_failures,
        dispatch_timeout_ms,
        probe_timeout_ms,
        prune_interval_secs,
    })
}

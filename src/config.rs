use std::env;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,dvcm=debug";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Runtime settings, read once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_address: String,
    pub port: u16,
    /// Public prefix under which stored ad content is served. Baked into
    /// content URLs and generated VAST wrappers.
    pub content_base_url: String,
    pub max_upload_bytes: usize,
    pub log_filter: String,
    pub seed_demo_data: bool,
}

impl Default for ApiConfig {
    fn default() -> ApiConfig {
        ApiConfig {
            bind_address: DEFAULT_BIND_ADDRESS.to_owned(),
            port: DEFAULT_PORT,
            content_base_url: format!("http://localhost:{}/v1", DEFAULT_PORT),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            seed_demo_data: false,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> ApiConfig {
        ApiConfig::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source, falling back to
    /// defaults for anything missing or unparseable.
    pub fn from_lookup<F>(lookup: F) -> ApiConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ApiConfig::default();
        let port = lookup_parsed(&lookup, "DVCM_PORT").unwrap_or(defaults.port);

        ApiConfig {
            bind_address: lookup_string(&lookup, "DVCM_BIND_ADDRESS")
                .unwrap_or(defaults.bind_address),
            port,
            content_base_url: lookup_string(&lookup, "DVCM_CONTENT_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_owned())
                .unwrap_or_else(|| format!("http://localhost:{}/v1", port)),
            max_upload_bytes: lookup_parsed(&lookup, "DVCM_MAX_UPLOAD_BYTES")
                .unwrap_or(defaults.max_upload_bytes),
            log_filter: lookup_string(&lookup, "DVCM_LOG")
                .or_else(|| lookup_string(&lookup, "RUST_LOG"))
                .unwrap_or(defaults.log_filter),
            seed_demo_data: lookup_bool(&lookup, "DVCM_SEED").unwrap_or(defaults.seed_demo_data),
        }
    }

    pub fn bind(&self) -> (String, u16) {
        (self.bind_address.clone(), self.port)
    }
}

fn lookup_string<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn lookup_parsed<F, T>(lookup: &F, name: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup_string(lookup, name).and_then(|value| value.parse().ok())
}

fn lookup_bool<F>(lookup: &F, name: &str) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    lookup_string(lookup, name).and_then(|value| match value.as_str() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> ApiConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config_from(&[]), ApiConfig::default());
    }

    #[test]
    fn content_base_follows_port_unless_set() {
        let config = config_from(&[("DVCM_PORT", "9000")]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.content_base_url, "http://localhost:9000/v1");

        let config = config_from(&[("DVCM_CONTENT_BASE_URL", "https://ads.example.com/v1/")]);
        assert_eq!(config.content_base_url, "https://ads.example.com/v1");
    }

    #[test]
    fn bad_values_fall_back() {
        let config = config_from(&[
            ("DVCM_PORT", "eighty"),
            ("DVCM_SEED", "maybe"),
            ("DVCM_MAX_UPLOAD_BYTES", "-1"),
        ]);

        assert_eq!(config.port, DEFAULT_PORT);
        assert!(!config.seed_demo_data);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn seed_flag_accepts_common_spellings() {
        assert!(config_from(&[("DVCM_SEED", "yes")]).seed_demo_data);
        assert!(config_from(&[("DVCM_SEED", "1")]).seed_demo_data);
    }
}

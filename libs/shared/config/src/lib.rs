use std::env;
use tracing::warn;

pub const DEFAULT_SEARCH_RADIUS_KM: f64 = 10.0;
pub const DEFAULT_PORT: u16 = 3000;

/// Source of the search defaults used by provider discovery.
///
/// Kept as a trait so the search service can be handed a fixed value in
/// tests instead of reading the environment.
pub trait SearchSettings: Send + Sync {
    fn default_radius_km(&self) -> f64;
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub default_search_radius_km: f64,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            default_search_radius_km: parse_radius(env::var("DEFAULT_SEARCH_RADIUS_KM").ok()),
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }
}

impl SearchSettings for AppConfig {
    fn default_radius_km(&self) -> f64 {
        self.default_search_radius_km
    }
}

impl SearchSettings for f64 {
    fn default_radius_km(&self) -> f64 {
        *self
    }
}

fn parse_radius(raw: Option<String>) -> f64 {
    match raw {
        None => DEFAULT_SEARCH_RADIUS_KM,
        Some(value) => match value.trim().parse::<f64>() {
            Ok(radius) if radius.is_finite() && radius > 0.0 => radius,
            _ => {
                warn!(
                    "DEFAULT_SEARCH_RADIUS_KM={:?} is not a positive number, using {} km",
                    value, DEFAULT_SEARCH_RADIUS_KM
                );
                DEFAULT_SEARCH_RADIUS_KM
            }
        },
    }
}

use std::env;

use log::*;
use wpg_common::{parse_boolean_flag, Secret};

const DEFAULT_WPG_HOST: &str = "127.0.0.1";
const DEFAULT_WPG_PORT: u16 = 8480;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub hotpay: HotPayConfig,
    pub payu: PayUConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_WPG_HOST.to_string(),
            port: DEFAULT_WPG_PORT,
            database_url: String::default(),
            hotpay: HotPayConfig::default(),
            payu: PayUConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("WPG_HOST").ok().unwrap_or_else(|| DEFAULT_WPG_HOST.into());
        let port = env::var("WPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for WPG_PORT. {e} Using the default, {DEFAULT_WPG_PORT}, instead."
                    );
                    DEFAULT_WPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_WPG_PORT);
        let database_url = env::var("WPG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ WPG_DATABASE_URL is not set. Please set it to the URL for the WPG database.");
            String::default()
        });
        let hotpay = HotPayConfig::from_env_or_default();
        let payu = PayUConfig::from_env_or_default();
        Self { host, port, database_url, hotpay, payu }
    }
}

//-------------------------------------------------  HotPayConfig  ----------------------------------------------------
/// HotPay signs requests out of two shared secrets: the notification password and the shop secret. Both
/// come from the gateway's merchant panel and are supplied via the environment, never hard-coded.
#[derive(Clone, Debug, Default)]
pub struct HotPayConfig {
    pub password: Secret<String>,
    pub secret: Secret<String>,
    /// The merchant-chosen service name that is part of the checkout hash.
    pub service_name: String,
    /// The callback URL the buyer is sent back to, also part of the checkout hash.
    pub return_url: String,
    /// When true (the default), a notification without a `HASH` field is rejected outright.
    pub strict: bool,
}

impl HotPayConfig {
    pub fn from_env_or_default() -> Self {
        let password = Secret::new(env::var("WPG_HOTPAY_PASSWORD").ok().unwrap_or_else(|| {
            error!("🪛️ WPG_HOTPAY_PASSWORD is not set. The HotPay webhook will reject all notifications.");
            String::default()
        }));
        let secret = Secret::new(env::var("WPG_HOTPAY_SECRET").ok().unwrap_or_else(|| {
            error!("🪛️ WPG_HOTPAY_SECRET is not set. The HotPay webhook will reject all notifications.");
            String::default()
        }));
        let service_name = env::var("WPG_HOTPAY_SERVICE_NAME").ok().unwrap_or_else(|| "Schronisko".to_string());
        let return_url = env::var("WPG_HOTPAY_RETURN_URL").ok().unwrap_or_default();
        let strict = parse_boolean_flag(env::var("WPG_HOTPAY_STRICT").ok(), true);
        if !strict {
            warn!("🚨️ WPG_HOTPAY_STRICT is disabled. Unsigned HotPay notifications will be accepted!");
        }
        Self { password, secret, service_name, return_url, strict }
    }

    pub fn is_configured(&self) -> bool {
        !self.password.is_unset() && !self.secret.is_unset()
    }
}

//-------------------------------------------------  PayUConfig  ------------------------------------------------------
#[derive(Clone, Debug, Default)]
pub struct PayUConfig {
    /// The "second key" (MD5 key) from the PayU merchant panel, used to verify notification signatures.
    pub second_key: Secret<String>,
    /// When false (the historical default), notifications without an `OpenPayu-Signature` header are
    /// accepted with a warning. Leaving this off is a documented risk; set WPG_PAYU_STRICT=1 to close it.
    pub strict: bool,
}

impl PayUConfig {
    pub fn from_env_or_default() -> Self {
        let second_key = Secret::new(env::var("WPG_PAYU_SECOND_KEY").ok().unwrap_or_else(|| {
            error!("🪛️ WPG_PAYU_SECOND_KEY is not set. The PayU webhook will reject all notifications.");
            String::default()
        }));
        let strict = parse_boolean_flag(env::var("WPG_PAYU_STRICT").ok(), false);
        if !strict {
            warn!(
                "🚨️ WPG_PAYU_STRICT is disabled. PayU notifications without a signature header will be accepted. Set \
                 WPG_PAYU_STRICT=1 to require signatures."
            );
        }
        Self { second_key, strict }
    }

    pub fn is_configured(&self) -> bool {
        !self.second_key.is_unset()
    }
}

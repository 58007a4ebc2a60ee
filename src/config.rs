use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use tracing::{info, warn};

use crate::calculator::CalculationConfig;
use crate::model::ContainerHeight;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub calculator: CalculatorConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            calculator: CalculatorConfig::from_env(),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;
    const HOST_VAR: &'static str = "PALLET_CALC_API_HOST";
    const PORT_VAR: &'static str = "PALLET_CALC_API_PORT";

    fn from_env() -> Self {
        Self::from_values(env_string(Self::HOST_VAR), env_string(Self::PORT_VAR))
    }

    fn from_values(host: Option<String>, port: Option<String>) -> Self {
        let default_ip = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
        let (bind_ip, display_host) = match host {
            Some(raw) => match raw.parse::<IpAddr>() {
                Ok(ip) => (ip, raw),
                Err(err) => {
                    warn!(
                        "⚠️ Could not parse {} ('{}'): {}. Using {}.",
                        Self::HOST_VAR,
                        raw,
                        err,
                        Self::DEFAULT_HOST
                    );
                    (default_ip, Self::DEFAULT_HOST.to_string())
                }
            },
            None => (default_ip, Self::DEFAULT_HOST.to_string()),
        };

        let port = port
            .and_then(|raw| parse_port(&raw, Self::PORT_VAR))
            .unwrap_or(Self::DEFAULT_PORT);

        Self {
            bind_ip,
            display_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    /// Configured port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }

    /// Checks whether the hostname matches the default value.
    pub fn uses_default_host(&self) -> bool {
        self.display_host == Self::DEFAULT_HOST
    }
}

/// Defaults for calculations and for the web form.
#[derive(Clone, Debug)]
pub struct CalculatorConfig {
    calculation: CalculationConfig,
    default_container: ContainerHeight,
    form_allow_mixed: bool,
}

impl CalculatorConfig {
    const BASE_HEIGHT_VAR: &'static str = "PALLET_CALC_DEFAULT_BASE_HEIGHT_CM";
    const CONTAINER_VAR: &'static str = "PALLET_CALC_DEFAULT_CONTAINER";
    const ALLOW_MIXED_VAR: &'static str = "PALLET_CALC_DEFAULT_ALLOW_MIXED";
    const FORM_ALLOW_MIXED_VAR: &'static str = "PALLET_CALC_FORM_ALLOW_MIXED";
    const DEFAULT_CONTAINER_CODE: &'static str = "40HQ";
    const DEFAULT_FORM_ALLOW_MIXED: bool = true;

    fn from_env() -> Self {
        Self::from_values(
            env_string(Self::BASE_HEIGHT_VAR),
            env_string(Self::CONTAINER_VAR),
            env_string(Self::ALLOW_MIXED_VAR),
            env_string(Self::FORM_ALLOW_MIXED_VAR),
        )
    }

    fn from_values(
        base_height: Option<String>,
        container: Option<String>,
        allow_mixed: Option<String>,
        form_allow_mixed: Option<String>,
    ) -> Self {
        let default_base_height_cm = parse_f64_with_warning(
            Self::BASE_HEIGHT_VAR,
            base_height.as_deref(),
            CalculationConfig::DEFAULT_BASE_HEIGHT_CM,
            |value| value > 0.0,
            "must be greater than 0",
        );

        let default_allow_mixed = allow_mixed
            .and_then(|raw| parse_bool(&raw, Self::ALLOW_MIXED_VAR))
            .unwrap_or(CalculationConfig::DEFAULT_ALLOW_MIXED);

        let form_allow_mixed = form_allow_mixed
            .and_then(|raw| parse_bool(&raw, Self::FORM_ALLOW_MIXED_VAR))
            .unwrap_or(Self::DEFAULT_FORM_ALLOW_MIXED);

        let fallback_container = Self::fallback_container();
        let default_container = match container {
            Some(raw) => ContainerHeight::from_code(&raw).unwrap_or_else(|err| {
                warn!(
                    "⚠️ {} is invalid: {}. Using {}.",
                    Self::CONTAINER_VAR,
                    err,
                    Self::DEFAULT_CONTAINER_CODE
                );
                fallback_container
            }),
            None => fallback_container,
        };

        let calculation = CalculationConfig::builder()
            .default_base_height_cm(default_base_height_cm)
            .default_allow_mixed(default_allow_mixed)
            .build();

        Self {
            calculation,
            default_container,
            form_allow_mixed,
        }
    }

    fn fallback_container() -> ContainerHeight {
        ContainerHeight::from_code(Self::DEFAULT_CONTAINER_CODE).unwrap_or(ContainerHeight {
            code: "40HQ",
            interior_height_cm: 269.0,
        })
    }

    /// Returns the configured CalculationConfig.
    pub fn calculation_config(&self) -> CalculationConfig {
        self.calculation
    }

    /// Container preselected in the web form.
    pub fn default_container(&self) -> ContainerHeight {
        self.default_container
    }

    /// Mixing choice preselected in the web form.
    ///
    /// Independent of the request default: the form always sends the flag.
    pub fn form_allow_mixed(&self) -> bool {
        self.form_allow_mixed
    }
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self::from_values(None, None, None, None)
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(
                "⚠️ Access to {} failed: {}. Using default value.",
                name, err
            );
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            warn!(
                "⚠️ Could not interpret {} ('{}') as boolean value. Using default value.",
                var_name, other
            );
            None
        }
    }
}

fn parse_port(raw: &str, var_name: &str) -> Option<u16> {
    match raw.trim().parse::<u16>() {
        Ok(0) => {
            warn!("⚠️ {} must not be 0. Using default port.", var_name);
            None
        }
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                "⚠️ Could not parse {} ('{}'): {}. Using default port.",
                var_name, raw, err
            );
            None
        }
    }
}

fn parse_f64_with_warning(
    var_name: &str,
    raw: Option<&str>,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
) -> f64 {
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && validator(value) => {
            let tolerance = (default.abs().max(1.0)) * 1e-9;
            if (value - default).abs() > tolerance {
                info!("{} overrides the default ({} = {}).", var_name, default, value);
            }
            value
        }
        Ok(_) => {
            warn!(
                "⚠️ {} contains invalid value '{}': {}. Using {}.",
                var_name, raw, invalid_hint, default
            );
            default
        }
        Err(err) => {
            warn!(
                "⚠️ Could not parse {} ('{}') as number: {}. Using {}.",
                var_name, raw, err, default
            );
            default
        }
    }
}

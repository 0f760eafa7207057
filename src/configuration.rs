use std::time::Duration;

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::site_rule::UnmatchedPolicy;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub renderer: RendererSettings,
    pub pool: PoolSettings,
    pub extraction: ExtractionSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

/// Everything the browser launcher needs, resolved once at startup.
#[derive(Deserialize, Clone, Debug)]
pub struct RendererSettings {
    pub webdriver_url: String,
    pub headless: bool,
    pub ignore_tls_errors: bool,
    #[serde(default)]
    pub binary_path: Option<String>,
    #[serde(default)]
    pub use_system_chrome: bool,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub page_load_timeout_secs: u64,
}

impl RendererSettings {
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    /// Explicit path first, then the locally installed Chrome when asked for.
    pub fn chrome_binary(&self) -> Option<String> {
        match (&self.binary_path, self.use_system_chrome) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(system_chrome_path().to_string()),
            (None, false) => None,
        }
    }
}

pub fn system_chrome_path() -> &'static str {
    if cfg!(target_os = "windows") {
        r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"
    } else if cfg!(target_os = "macos") {
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"
    } else {
        "/usr/bin/google-chrome"
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct PoolSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_sessions: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub queue_depth: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub request_timeout_secs: u64,
}

impl PoolSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ExtractionSettings {
    #[serde(default)]
    pub unmatched: UnmatchedPolicy,
    #[serde(default)]
    pub rules: Vec<RuleSettings>,
}

/// A site rule registered from configuration instead of code.
#[derive(Deserialize, Clone, Debug)]
pub struct RuleSettings {
    pub name: String,
    pub prefix: String,
    #[serde(default)]
    pub title: Option<String>,
    pub body: String,
    #[serde(default)]
    pub title_label: Option<String>,
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

/// `APP_RENDERER__ARGS="--no-sandbox --disable-gpu"` replaces the args list.
fn environment_source() -> config::Environment {
    config::Environment::with_prefix("APP")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(" ")
        .with_list_parse_key("renderer.args")
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("No current directory: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(environment_source())
        .build()?;

    settings.try_deserialize::<Settings>()
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub shop: ShopSettings,
    pub source: SourceSettings,
    #[serde(default)]
    pub dues: DuesSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShopSettings {
    pub name: String,
    /// Owner id the shop's records are stored under.
    pub tenant: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    File,
    Http,
}

impl SourceKind {
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::File => "file",
            SourceKind::Http => "http",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourceSettings {
    pub kind: SourceKind,
    /// Data file, relative to the config directory unless absolute.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DuesSettings {
    /// Customers owing more than this are listed by `tally dues`.
    #[serde(default)]
    pub threshold: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DashboardSettings {
    #[serde(default = "default_top_items")]
    pub top_items: usize,
    /// Trailing window, in days, for the period figures.
    #[serde(default = "default_period_days")]
    pub period_days: u32,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            top_items: default_top_items(),
            period_days: default_period_days(),
        }
    }
}

fn default_top_items() -> usize {
    5
}

fn default_period_days() -> u32 {
    30
}

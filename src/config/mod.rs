mod settings;

pub use settings::{Config, DashboardSettings, DuesSettings, ShopSettings, SourceKind, SourceSettings};

use crate::error::{Result, TallyError};
use crate::source::{Collection, HttpSource, JsonFileSource, RecordSource};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Get the config directory path (~/.tally/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "tally") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.tally/
    let home = dirs_home().ok_or_else(|| {
        TallyError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".tally"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    if !config_dir.exists() {
        return Err(TallyError::ConfigNotFound(config_dir.to_path_buf()));
    }
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(TallyError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| TallyError::ConfigParse { path, source: e })
}

/// Data file location; relative paths resolve against the config directory.
pub fn resolve_data_path(settings: &SourceSettings, config_dir: &Path) -> Result<PathBuf> {
    let raw = settings
        .path
        .as_deref()
        .ok_or_else(|| TallyError::SourceMisconfigured {
            kind: settings.kind.label().to_string(),
            field: "path",
        })?;
    let path = expand_path(raw);
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(config_dir.join(path))
    }
}

/// Build the record source described by `[source]`.
pub fn open_source<T: Collection>(
    config: &Config,
    config_dir: &Path,
) -> Result<Arc<dyn RecordSource<T>>> {
    let settings = &config.source;
    match settings.kind {
        SourceKind::File => {
            let path = resolve_data_path(settings, config_dir)?;
            Ok(Arc::new(JsonFileSource::new(path)))
        }
        SourceKind::Http => {
            let url = settings
                .url
                .clone()
                .ok_or_else(|| TallyError::SourceMisconfigured {
                    kind: settings.kind.label().to_string(),
                    field: "url",
                })?;
            let timeout = Duration::from_secs(settings.timeout_secs);
            Ok(Arc::new(HttpSource::new(url, timeout)))
        }
    }
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[shop]
name = "Sharma General Store"
tenant = "shop-001"          # owner id your records are stored under
currency_symbol = "₹"

[source]
kind = "file"                # file | http
path = "data.json"           # relative to this directory
# url = "https://api.example.com/v1"   # for kind = "http"
timeout_secs = 10

[dues]
threshold = 0.0              # list customers owing more than this

[dashboard]
top_items = 5
period_days = 30
"#;

/// Sample data.json written by `tally init`
pub const SAMPLE_DATA: &str = r#"{
  "bills": [
    {
      "id": "b-1001",
      "owner_id": "shop-001",
      "invoice_number": "INV-1001",
      "customer_id": "c-1",
      "customer_name": "Alice Cooper",
      "bill_date": "2024-03-10T10:15:00",
      "subtotal": 1200.0,
      "grand_total": 1200.0,
      "paid_amount": 1200.0,
      "status": "Paid",
      "payment_mode": "Cash",
      "items": [
        { "name": "Rice", "quantity": 10.0, "price": 60.0, "total": 600.0 },
        { "name": "Sugar", "quantity": 12.0, "price": 50.0, "total": 600.0 }
      ]
    },
    {
      "id": "b-1002",
      "owner_id": "shop-001",
      "invoice_number": "INV-1002",
      "customer_id": "c-2",
      "customer_name": "Bob Singh",
      "bill_date": "2024-03-11T18:40:00",
      "subtotal": 800.0,
      "grand_total": 800.0,
      "paid_amount": 300.0,
      "status": "Partial",
      "payment_mode": "Credit",
      "items": [
        { "name": "Rice", "quantity": 5.0, "price": 60.0, "total": 300.0 },
        { "name": "Oil", "quantity": 4.0, "price": 125.0, "total": 500.0 }
      ]
    },
    {
      "id": "b-1003",
      "owner_id": "shop-001",
      "invoice_number": "INV-1003",
      "customer_id": "c-1",
      "customer_name": "Alice Cooper",
      "bill_date": "2024-03-12T09:05:00",
      "subtotal": 450.0,
      "grand_total": 450.0,
      "paid_amount": 0.0,
      "status": "Unpaid",
      "items": [
        { "name": "Tea", "quantity": 3.0, "price": 150.0, "total": 450.0 }
      ]
    }
  ],
  "customers": [
    {
      "id": "c-1",
      "owner_id": "shop-001",
      "name": "Alice Cooper",
      "phone": "9800000001",
      "total_billed": 1650.0,
      "total_paid": 1200.0,
      "total_dues": 450.0,
      "created_at": "2024-01-05T11:00:00"
    },
    {
      "id": "c-2",
      "owner_id": "shop-001",
      "name": "Bob Singh",
      "phone": "9800000002",
      "total_billed": 800.0,
      "total_paid": 300.0,
      "total_dues": 500.0,
      "created_at": "2024-02-01T16:30:00"
    },
    {
      "id": "c-3",
      "owner_id": "shop-001",
      "name": "Chitra Rao",
      "total_billed": 200.0,
      "total_paid": 200.0,
      "total_dues": 0.0,
      "created_at": "2024-02-20T12:00:00"
    }
  ],
  "products": [
    {
      "id": "p-1",
      "owner_id": "shop-001",
      "name": "Rice",
      "category": "Grains",
      "unit": "kg",
      "selling_price": 60.0,
      "stock_quantity": 120.0,
      "created_at": "2024-01-01T09:00:00"
    },
    {
      "id": "p-2",
      "owner_id": "shop-001",
      "name": "Oil",
      "category": "Essentials",
      "unit": "ltr",
      "selling_price": 125.0,
      "stock_quantity": 4.0,
      "low_stock_threshold": 5.0,
      "created_at": "2024-01-01T09:00:00"
    },
    {
      "id": "p-3",
      "owner_id": "shop-001",
      "name": "Tea",
      "category": "Beverages",
      "unit": "pack",
      "selling_price": 150.0,
      "stock_quantity": 8.0,
      "created_at": "2024-01-01T09:00:00"
    }
  ]
}
"#;

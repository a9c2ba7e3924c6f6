use std::path::PathBuf;

pub const DEFAULT_LOG_FILTER: &str = "examdeskd=info";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub workspace: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workspace: None,
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

pub fn load_settings() -> Settings {
    from_lookup(|key| std::env::var(key).ok())
}

fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Some(v) = get("EXAMDESKD_WORKSPACE").filter(|v| !v.trim().is_empty()) {
        settings.workspace = Some(PathBuf::from(v.trim()));
    }

    if let Some(v) = get("EXAMDESKD_LOG").or_else(|| get("RUST_LOG")) {
        if !v.trim().is_empty() {
            settings.log_filter = v;
        }
    }

    settings
}

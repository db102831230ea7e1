use figment::providers::{Data, Format, Json, Toml, Yaml};
use figment::value::{Dict, Map};
use figment::{Metadata, Profile, Provider};
use std::path::Path;

/// Configuration file formats understood by `--config`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Pick a format from the file extension, sniffing the content for unknown ones
    pub fn detect(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "toml" => ConfigFormat::Toml,
            "json" => ConfigFormat::Json,
            "yaml" | "yml" => ConfigFormat::Yaml,
            _ => {
                let detected = std::fs::read_to_string(path)
                    .ok()
                    .and_then(|content| Self::from_content(&content));
                tracing::debug!(
                    path = %path.display(),
                    "config format for unknown extension: {:?}",
                    detected
                );
                detected.unwrap_or(ConfigFormat::Toml)
            }
        }
    }

    fn from_content(content: &str) -> Option<Self> {
        let trimmed = content.trim();

        if (trimmed.starts_with('{') && trimmed.ends_with('}'))
            || (trimmed.starts_with('[') && trimmed.ends_with(']') && !trimmed.contains('='))
        {
            return Some(ConfigFormat::Json);
        }

        // TOML before YAML: a `[section]` header or `key = value` settles it
        if trimmed.lines().any(|line| {
            let line = line.trim();
            (line.starts_with('[') && line.ends_with(']'))
                || (line.contains('=') && !line.contains(':'))
        }) {
            return Some(ConfigFormat::Toml);
        }

        if trimmed.starts_with("---") || trimmed.lines().any(|line| line.contains(':')) {
            return Some(ConfigFormat::Yaml);
        }

        None
    }
}

/// Provider for a single file whose format is chosen by [`ConfigFormat::detect`]
pub fn auto<P: AsRef<Path>>(path: P) -> impl Provider {
    let path = path.as_ref();
    match ConfigFormat::detect(path) {
        ConfigFormat::Toml => SmartProvider::Toml(Toml::file_exact(path)),
        ConfigFormat::Json => SmartProvider::Json(Json::file_exact(path)),
        ConfigFormat::Yaml => SmartProvider::Yaml(Yaml::file_exact(path)),
    }
}

enum SmartProvider {
    Toml(Data<Toml>),
    Json(Data<Json>),
    Yaml(Data<Yaml>),
}

impl Provider for SmartProvider {
    fn metadata(&self) -> Metadata {
        match self {
            SmartProvider::Toml(p) => p.metadata(),
            SmartProvider::Json(p) => p.metadata(),
            SmartProvider::Yaml(p) => p.metadata(),
        }
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        match self {
            SmartProvider::Toml(p) => p.data(),
            SmartProvider::Json(p) => p.data(),
            SmartProvider::Yaml(p) => p.data(),
        }
    }
}

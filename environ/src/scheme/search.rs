//! Search engine URLs: `elasticsearch://127.0.0.1:9200/index`, `whoosh:///var/index`.

use super::{int_or_string, BackendConfig, ParsedUrl};
use crate::cast::{cast, Spec};
use crate::error::{EnvironError, Result};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Elasticsearch,
    Elasticsearch2,
    Elasticsearch5,
    Elasticsearch7,
    Solr,
    Whoosh,
    Xapian,
    Simple,
}

/// Where an engine keeps its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Storage {
    Network,
    Filesystem,
    None,
}

impl Engine {
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        let engine = match scheme {
            "elasticsearch" => Engine::Elasticsearch,
            "elasticsearch2" => Engine::Elasticsearch2,
            "elasticsearch5" => Engine::Elasticsearch5,
            "elasticsearch7" => Engine::Elasticsearch7,
            "solr" => Engine::Solr,
            "whoosh" => Engine::Whoosh,
            "xapian" => Engine::Xapian,
            "simple" => Engine::Simple,
            _ => return None,
        };
        Some(engine)
    }

    pub fn id(self) -> &'static str {
        match self {
            Engine::Elasticsearch => {
                "haystack.backends.elasticsearch_backend.ElasticsearchSearchEngine"
            }
            Engine::Elasticsearch2 => {
                "haystack.backends.elasticsearch2_backend.Elasticsearch2SearchEngine"
            }
            Engine::Elasticsearch5 => {
                "haystack.backends.elasticsearch5_backend.Elasticsearch5SearchEngine"
            }
            Engine::Elasticsearch7 => {
                "haystack.backends.elasticsearch7_backend.Elasticsearch7SearchEngine"
            }
            Engine::Solr => "haystack.backends.solr_backend.SolrEngine",
            Engine::Whoosh => "haystack.backends.whoosh_backend.WhooshEngine",
            Engine::Xapian => "haystack.backends.xapian_backend.XapianEngine",
            Engine::Simple => "haystack.backends.simple_backend.SimpleEngine",
        }
    }

    fn is_elasticsearch(self) -> bool {
        matches!(
            self,
            Engine::Elasticsearch
                | Engine::Elasticsearch2
                | Engine::Elasticsearch5
                | Engine::Elasticsearch7
        )
    }

    fn storage(self) -> Storage {
        match self {
            Engine::Whoosh | Engine::Xapian => Storage::Filesystem,
            Engine::Simple => Storage::None,
            _ => Storage::Network,
        }
    }
}

/// Build a search config from `url`. `engine` replaces ENGINE.
///
/// With an unknown scheme and an `engine` override, a URL with a host is laid
/// out like a network engine and one without like a filesystem engine.
///
/// # Errors
///
/// - [`EnvironError::UnsupportedScheme`] for unknown schemes without `engine`
/// - [`EnvironError::InvalidUrl`] if `url` cannot be parsed
/// - [`EnvironError::InvalidCast`] for malformed `INCLUDE_SPELLING`,
///   `BATCH_SIZE`, `TIMEOUT` or `POST_LIMIT` values
pub fn parse(url: &str, engine: Option<&str>) -> Result<BackendConfig> {
    let parsed = ParsedUrl::parse(url)?;
    let kind = Engine::from_scheme(&parsed.scheme);
    let engine_id = match (engine, kind) {
        (Some(id), _) => id.to_string(),
        (None, Some(kind)) => kind.id().to_string(),
        (None, None) => return Err(EnvironError::unsupported_scheme("search", &parsed.scheme)),
    };
    let storage = match kind {
        Some(kind) => kind.storage(),
        None if parsed.host().is_empty() => Storage::Filesystem,
        None => Storage::Network,
    };

    let mut config = BackendConfig::new();
    config.set("ENGINE", engine_id);

    let path = super::decode(parsed.path.trim_end_matches('/'));
    match storage {
        Storage::Network => {
            let base = format!("http://{}{}", parsed.userinfo, parsed.netloc());
            match path.rsplit_once('/') {
                Some((prefix, index)) if kind.is_some_and(Engine::is_elasticsearch) => {
                    config.set("URL", format!("{base}{prefix}"));
                    config.set("INDEX_NAME", index);
                }
                _ => config.set("URL", format!("{base}{path}")),
            }
        }
        Storage::Filesystem => config.set("PATH", path),
        Storage::None => {}
    }

    for (key, value) in parsed.first_params() {
        let upper = key.to_uppercase();
        let field = match (upper.as_str(), storage, kind) {
            ("EXCLUDED_INDEXES", ..) => cast(value, &Spec::list(Spec::string()))?,
            ("INCLUDE_SPELLING", ..) => cast(value, &Spec::bool())?,
            ("BATCH_SIZE", ..) => cast(value, &Spec::int())?,
            ("TIMEOUT", Storage::Network, _) => cast(value, &Spec::int())?,
            ("KWARGS", Storage::Network, _) => Value::from(value),
            ("STORAGE", _, Some(Engine::Whoosh)) => Value::from(value),
            ("POST_LIMIT", _, Some(Engine::Whoosh)) => cast(value, &Spec::int())?,
            ("FLAGS", _, Some(Engine::Xapian)) => int_or_string(value),
            _ => {
                tracing::debug!(param = %key, "Ignoring unknown search URL parameter");
                continue;
            }
        };
        config.set(&upper, field);
    }

    Ok(config)
}

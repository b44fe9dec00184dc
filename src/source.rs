//! Resolution of imported schemas.
//!
//! The parser hands every `import` URL to a [`SchemaSource`] and receives the
//! definitions of the referenced schema.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};
use tracing::debug;

use crate::document::parse_typehub_uri;
use crate::error::SourceError;
use crate::loader::{is_url, load_value_auto};

/// Definitions of a schema, keyed by type name.
pub type Definitions = Map<String, Value>;

/// Looks up the definitions of an imported schema by URL.
pub trait SchemaSource {
    /// # Errors
    ///
    /// Returns `SourceError` if the URL can't be resolved or doesn't point
    /// at a schema with a `definitions` object.
    fn resolve(&self, url: &str) -> Result<Definitions, SourceError>;
}

impl<S: SchemaSource + ?Sized> SchemaSource for &S {
    fn resolve(&self, url: &str) -> Result<Definitions, SourceError> {
        (**self).resolve(url)
    }
}

/// Source that refuses every import.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

impl SchemaSource for OfflineSource {
    fn resolve(&self, url: &str) -> Result<Definitions, SourceError> {
        Err(SourceError::Unsupported {
            url: url.to_string(),
            message: "import resolution is disabled".to_string(),
        })
    }
}

/// Source backed by schemas registered up front.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    schemas: HashMap<String, Value>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `schema` under `url`.
    pub fn with(mut self, url: impl Into<String>, schema: Value) -> Self {
        self.insert(url, schema);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, schema: Value) {
        self.schemas.insert(url.into(), schema);
    }
}

impl SchemaSource for InMemorySource {
    fn resolve(&self, url: &str) -> Result<Definitions, SourceError> {
        let schema = self.schemas.get(url).ok_or_else(|| SourceError::NotFound {
            url: url.to_string(),
        })?;
        definitions_of(url, schema)
    }
}

/// Source that loads files and HTTP URLs.
///
/// TypeHub URIs are only resolvable once a base URL is configured:
/// `typehub://{user}:{document}@{version}` maps to
/// `{base}/{user}/{document}/{version}`. Relative file paths are joined
/// onto the base directory when one is set.
#[derive(Debug, Clone, Default)]
pub struct LoaderSource {
    typehub_base: Option<String>,
    base_dir: Option<PathBuf>,
}

impl LoaderSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL TypeHub URIs are resolved against.
    pub fn typehub_base(mut self, base: impl Into<String>) -> Self {
        self.typehub_base = Some(base.into());
        self
    }

    /// Set the directory relative file imports are resolved against,
    /// usually the directory of the importing specification.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Location to load for `url`.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Unsupported` for a TypeHub URI without a base.
    pub fn location(&self, url: &str) -> Result<String, SourceError> {
        let Some((user, document, version)) = parse_typehub_uri(url) else {
            return Ok(self.file_location(url));
        };

        match &self.typehub_base {
            Some(base) => Ok(format!(
                "{}/{}/{}/{}",
                base.trim_end_matches('/'),
                user,
                document,
                version
            )),
            None => Err(SourceError::Unsupported {
                url: url.to_string(),
                message: "no TypeHub base URL configured".to_string(),
            }),
        }
    }
}

impl LoaderSource {
    fn file_location(&self, url: &str) -> String {
        if is_url(url) {
            return url.to_string();
        }
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path).to_string_lossy().into_owned(),
            _ => url.to_string(),
        }
    }
}

impl SchemaSource for LoaderSource {
    fn resolve(&self, url: &str) -> Result<Definitions, SourceError> {
        let location = self.location(url)?;
        debug!(url, location = %location, "loading import");
        let schema = load_value_auto(&location)?;
        definitions_of(url, &schema)
    }
}

/// Memoizes another source per URL. Failures are not cached.
#[derive(Debug, Default)]
pub struct CachedSource<S> {
    inner: S,
    cache: Mutex<HashMap<String, Definitions>>,
}

impl<S: SchemaSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: SchemaSource> SchemaSource for CachedSource<S> {
    fn resolve(&self, url: &str) -> Result<Definitions, SourceError> {
        if let Some(hit) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
        {
            return Ok(hit.clone());
        }

        let definitions = self.inner.resolve(url)?;
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), definitions.clone());
        Ok(definitions)
    }
}

/// Extract the `definitions` object of a schema document.
///
/// # Errors
///
/// Returns `SourceError::Malformed` if there is none.
pub fn definitions_of(url: &str, schema: &Value) -> Result<Definitions, SourceError> {
    schema
        .get("definitions")
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| SourceError::Malformed {
            url: url.to_string(),
            message: "expected a \"definitions\" object".to_string(),
        })
}

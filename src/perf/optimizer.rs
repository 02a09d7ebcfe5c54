//! Backend selection for serialization, compression and hashing
//!
//! Backends are picked once at construction from what was compiled in
//! (`gzip` and `fast-hash` features) and what the config asks for. A
//! requested backend that is not compiled in falls back with a warning.

use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::{CompressionPreference, HashPreference, PerformanceConfig};
use crate::error::{DevsetupError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionBackend {
    Gzip,
    Identity,
}

impl CompressionBackend {
    pub fn is_available(&self) -> bool {
        match self {
            CompressionBackend::Gzip => cfg!(feature = "gzip"),
            CompressionBackend::Identity => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionBackend::Gzip => "gzip",
            CompressionBackend::Identity => "identity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HashBackend {
    Blake3,
    Sha256,
}

impl HashBackend {
    pub fn is_available(&self) -> bool {
        match self {
            HashBackend::Blake3 => cfg!(feature = "fast-hash"),
            HashBackend::Sha256 => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HashBackend::Blake3 => "blake3",
            HashBackend::Sha256 => "sha256",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonStyle {
    Compact,
    Pretty,
}

/// The backends an optimizer resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Backends {
    pub json: JsonStyle,
    pub compression: CompressionBackend,
    pub hash: HashBackend,
}

#[derive(Debug, Clone)]
pub struct PerformanceOptimizer {
    backends: Backends,
    fast_mode: bool,
}

impl PerformanceOptimizer {
    pub fn new(config: &PerformanceConfig) -> Self {
        let backends = Backends {
            json: if config.fast_mode { JsonStyle::Compact } else { JsonStyle::Pretty },
            compression: resolve_compression(config.compression),
            hash: resolve_hash(config.hash),
        };
        tracing::debug!(
            json = ?backends.json,
            compression = backends.compression.as_str(),
            hash = backends.hash.as_str(),
            fast_mode = config.fast_mode,
            "Resolved performance backends"
        );
        Self {
            backends,
            fast_mode: config.fast_mode,
        }
    }

    /// Process-wide optimizer built from default settings
    pub fn global() -> &'static PerformanceOptimizer {
        static GLOBAL: OnceLock<PerformanceOptimizer> = OnceLock::new();
        GLOBAL.get_or_init(|| PerformanceOptimizer::new(&PerformanceConfig::default()))
    }

    pub fn backends(&self) -> Backends {
        self.backends
    }

    pub fn fast_mode(&self) -> bool {
        self.fast_mode
    }

    pub fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let bytes = match self.backends.json {
            JsonStyle::Compact => serde_json::to_vec(value)?,
            JsonStyle::Pretty => serde_json::to_vec_pretty(value)?,
        };
        Ok(bytes)
    }

    pub fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self.backends.compression {
            CompressionBackend::Gzip => gzip_compress(data, self.fast_mode),
            CompressionBackend::Identity => Ok(data.to_vec()),
        }
    }

    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self.backends.compression {
            CompressionBackend::Gzip => gzip_decompress(data),
            CompressionBackend::Identity => Ok(data.to_vec()),
        }
    }

    /// Hex digest of `data` with the selected hash backend
    pub fn hash(&self, data: &[u8]) -> String {
        match self.backends.hash {
            HashBackend::Blake3 => blake3_hex(data),
            HashBackend::Sha256 => hex::encode(Sha256::digest(data)),
        }
    }

    /// Tokio runtime builder; fast mode gets the multi-thread scheduler
    pub fn runtime_builder(&self) -> tokio::runtime::Builder {
        let mut builder = if self.fast_mode {
            tokio::runtime::Builder::new_multi_thread()
        } else {
            tokio::runtime::Builder::new_current_thread()
        };
        builder.enable_all();
        builder
    }
}

fn resolve_compression(preference: CompressionPreference) -> CompressionBackend {
    match preference {
        CompressionPreference::Auto if CompressionBackend::Gzip.is_available() => CompressionBackend::Gzip,
        CompressionPreference::Auto | CompressionPreference::None => CompressionBackend::Identity,
        CompressionPreference::Gzip if CompressionBackend::Gzip.is_available() => CompressionBackend::Gzip,
        CompressionPreference::Gzip => {
            tracing::warn!("gzip requested but not compiled in, falling back to identity");
            CompressionBackend::Identity
        }
    }
}

fn resolve_hash(preference: HashPreference) -> HashBackend {
    match preference {
        HashPreference::Auto if HashBackend::Blake3.is_available() => HashBackend::Blake3,
        HashPreference::Auto | HashPreference::Sha256 => HashBackend::Sha256,
        HashPreference::Blake3 if HashBackend::Blake3.is_available() => HashBackend::Blake3,
        HashPreference::Blake3 => {
            tracing::warn!("blake3 requested but not compiled in, falling back to sha256");
            HashBackend::Sha256
        }
    }
}

#[cfg(feature = "gzip")]
fn gzip_compress(data: &[u8], fast: bool) -> Result<Vec<u8>> {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let level = if fast { Compression::fast() } else { Compression::default() };
    let mut encoder = GzEncoder::new(Vec::new(), level);
    encoder
        .write_all(data)
        .map_err(|e| DevsetupError::Compression(e.to_string()))?;
    encoder.finish().map_err(|e| DevsetupError::Compression(e.to_string()))
}

#[cfg(feature = "gzip")]
fn gzip_decompress(data: &[u8]) -> Result<Vec<u8>> {
    use std::io::Read;

    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| DevsetupError::Compression(e.to_string()))?;
    Ok(out)
}

#[cfg(not(feature = "gzip"))]
fn gzip_compress(_data: &[u8], _fast: bool) -> Result<Vec<u8>> {
    Err(DevsetupError::Compression("gzip support not compiled in".to_string()))
}

#[cfg(not(feature = "gzip"))]
fn gzip_decompress(_data: &[u8]) -> Result<Vec<u8>> {
    Err(DevsetupError::Compression("gzip support not compiled in".to_string()))
}

#[cfg(feature = "fast-hash")]
fn blake3_hex(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

#[cfg(not(feature = "fast-hash"))]
fn blake3_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

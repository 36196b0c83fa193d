use std::ops::RangeInclusive;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ImageConfig {
    /// Longest edge, in pixels, of an image sent to the model.
    pub max_edge: u32,
    pub jpeg_quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_edge: 512,
            jpeg_quality: 90,
        }
    }
}

impl ImageConfig {
    /// Out-of-range values fall back to the defaults: the edge must be at
    /// least 1 px and JPEG quality lies in 1..=100.
    pub fn from_env() -> Self {
        let Self { max_edge, jpeg_quality } = Self::default();
        Self {
            max_edge: bounded(
                "IMAGE_MAX_EDGE",
                env_or("IMAGE_MAX_EDGE", max_edge),
                1..=u32::MAX,
                max_edge,
            ),
            jpeg_quality: bounded(
                "IMAGE_JPEG_QUALITY",
                env_or("IMAGE_JPEG_QUALITY", jpeg_quality),
                1..=100,
                jpeg_quality,
            ),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub image: ImageConfig,
    pub max_upload_bytes: usize,
    pub plan_cuisine: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("GEMINI_API_KEY is not set; model calls will be rejected upstream");
        }
        let gemini = GeminiConfig {
            api_key,
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-flash-latest".into()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".into()),
        };
        let image = ImageConfig::from_env();
        Ok(Self {
            gemini,
            image,
            max_upload_bytes: env_or::<usize>("MAX_UPLOAD_MB", 20) * 1024 * 1024,
            plan_cuisine: std::env::var("PLAN_CUISINE")
                .unwrap_or_else(|_| "Indian Tamil Nadu".into()),
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn bounded<T>(key: &str, value: T, range: RangeInclusive<T>, default: T) -> T
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        value
    } else {
        tracing::warn!(%key, %value, %default, "out of range, using default");
        default
    }
}

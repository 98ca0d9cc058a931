//! Configuration types for extraction and compression jobs.
//!
//! Two small config structs — [`ExtractConfig`] and [`CompressConfig`] —
//! hold every knob for one job, built via their builders with validated
//! defaults. Device capability is modelled as an explicit
//! [`DeviceProfile`] resolved once by the caller and passed in, rather than
//! probed from the environment in the middle of the pipeline; both preset
//! resolution and multi-file validation consume the same value.

use crate::error::PdfPressError;
use serde::{Deserialize, Serialize};

/// Scale factor used by the extractor for every page (1.5× of the 72-dpi
/// base, i.e. 108 dpi).
pub const EXTRACT_SCALE: f32 = 1.5;

/// Highest render DPI allowed on a constrained device profile.
pub const CONSTRAINED_DPI_CAP: u32 = 144;

/// Client capability class, resolved once at startup.
///
/// `Constrained` corresponds to a memory-limited client (the original tool's
/// narrow-viewport check). It caps render DPI at
/// [`CONSTRAINED_DPI_CAP`] and refuses multi-file compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeviceProfile {
    /// Full-capability client (default).
    #[default]
    Standard,
    /// Memory-limited client: DPI capped, one file at a time.
    Constrained,
}

/// Named quality presets for the compressor.
///
/// Each preset maps to a `(dpi, jpeg quality)` pair. The pairs are fixed —
/// they are the contract of the tool, not tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityPreset {
    /// 96 dpi, quality 0.5 — small files for phone screens.
    Mobile,
    /// 144 dpi, quality 0.6 — general-purpose default.
    #[default]
    Pc,
    /// 300 dpi, quality 0.8 — high detail, standard clients only.
    PcHi,
    /// 200 dpi, quality 0.8 — print-oriented.
    Print,
    /// 72 dpi, quality 0.4 — smallest possible output.
    Min,
}

impl QualityPreset {
    /// The preset's nominal settings, before any device cap is applied.
    pub fn settings(self) -> RenderSettings {
        match self {
            QualityPreset::Mobile => RenderSettings { dpi: 96, jpeg_quality: 0.5 },
            QualityPreset::Pc => RenderSettings { dpi: 144, jpeg_quality: 0.6 },
            QualityPreset::PcHi => RenderSettings { dpi: 300, jpeg_quality: 0.8 },
            QualityPreset::Print => RenderSettings { dpi: 200, jpeg_quality: 0.8 },
            QualityPreset::Min => RenderSettings { dpi: 72, jpeg_quality: 0.4 },
        }
    }

    /// Parse a preset name. Unrecognised names fall back to the default
    /// `pc` settings (144 dpi / 0.6), matching the tool's historical
    /// behaviour of never rejecting a preset string.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "mobile" => QualityPreset::Mobile,
            "pc" => QualityPreset::Pc,
            "pc-hi" | "pchi" | "pc_hi" => QualityPreset::PcHi,
            "print" => QualityPreset::Print,
            "min" => QualityPreset::Min,
            _ => QualityPreset::default(),
        }
    }

    /// Resolve the effective settings for a device profile.
    ///
    /// On a constrained profile any preset above [`CONSTRAINED_DPI_CAP`]
    /// is silently forced down to `{144 dpi, 0.6}`.
    pub fn resolve(self, device: DeviceProfile) -> RenderSettings {
        let nominal = self.settings();
        if device == DeviceProfile::Constrained && nominal.dpi > CONSTRAINED_DPI_CAP {
            return RenderSettings {
                dpi: CONSTRAINED_DPI_CAP,
                jpeg_quality: 0.6,
            };
        }
        nominal
    }
}

/// Effective `(dpi, quality)` pair driving one compression run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Target render DPI. The page scale factor is `dpi / 72`.
    pub dpi: u32,
    /// JPEG quality factor in `0.0–1.0`.
    pub jpeg_quality: f32,
}

impl RenderSettings {
    /// Scale factor relative to the PDF's native 72-dpi point space.
    pub fn scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }

    /// The quality factor mapped onto the JPEG encoder's 1–100 scale.
    pub fn jpeg_quality_percent(&self) -> u8 {
        (self.jpeg_quality.clamp(0.01, 1.0) * 100.0).round() as u8
    }
}

// ── Extract ──────────────────────────────────────────────────────────────

/// Configuration for a page-extraction job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Render scale factor. Default: [`EXTRACT_SCALE`].
    pub scale: f32,

    /// JPEG quality 1–100, or `None` for the encoder default.
    ///
    /// The extractor historically never set a quality, so `None` is the
    /// faithful default.
    pub jpeg_quality: Option<u8>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            scale: EXTRACT_SCALE,
            jpeg_quality: None,
            password: None,
        }
    }
}

impl ExtractConfig {
    /// Create a new builder for `ExtractConfig`.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractConfig`].
#[derive(Debug)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    pub fn scale(mut self, scale: f32) -> Self {
        self.config.scale = scale;
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = Some(q.clamp(1, 100));
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractConfig, PdfPressError> {
        let c = &self.config;
        if !(0.1..=8.0).contains(&c.scale) {
            return Err(PdfPressError::InvalidConfig(format!(
                "Scale must be 0.1–8.0, got {}",
                c.scale
            )));
        }
        Ok(self.config)
    }
}

// ── Compress ─────────────────────────────────────────────────────────────

/// Configuration for a compression job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressConfig {
    /// Quality preset selecting the `(dpi, quality)` pair.
    pub preset: QualityPreset,

    /// Device profile resolved once at startup. Drives both the DPI cap
    /// and the multi-file restriction.
    pub device: DeviceProfile,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Pause between files in a multi-file run, in milliseconds.
    /// Default: 200.
    ///
    /// Gives interactive hosts a window to repaint progress between
    /// documents. Set to 0 for batch use.
    pub inter_file_delay_ms: u64,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            preset: QualityPreset::default(),
            device: DeviceProfile::default(),
            password: None,
            inter_file_delay_ms: 200,
        }
    }
}

impl CompressConfig {
    /// Create a new builder for `CompressConfig`.
    pub fn builder() -> CompressConfigBuilder {
        CompressConfigBuilder {
            config: Self::default(),
        }
    }

    /// The effective render settings for this config's preset and device.
    pub fn render_settings(&self) -> RenderSettings {
        self.preset.resolve(self.device)
    }
}

/// Builder for [`CompressConfig`].
#[derive(Debug)]
pub struct CompressConfigBuilder {
    config: CompressConfig,
}

impl CompressConfigBuilder {
    pub fn preset(mut self, preset: QualityPreset) -> Self {
        self.config.preset = preset;
        self
    }

    pub fn device(mut self, device: DeviceProfile) -> Self {
        self.config.device = device;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn inter_file_delay_ms(mut self, ms: u64) -> Self {
        self.config.inter_file_delay_ms = ms;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<CompressConfig, PdfPressError> {
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_table_values() {
        assert_eq!(
            QualityPreset::Mobile.settings(),
            RenderSettings { dpi: 96, jpeg_quality: 0.5 }
        );
        assert_eq!(
            QualityPreset::Pc.settings(),
            RenderSettings { dpi: 144, jpeg_quality: 0.6 }
        );
        assert_eq!(
            QualityPreset::PcHi.settings(),
            RenderSettings { dpi: 300, jpeg_quality: 0.8 }
        );
        assert_eq!(
            QualityPreset::Print.settings(),
            RenderSettings { dpi: 200, jpeg_quality: 0.8 }
        );
        assert_eq!(
            QualityPreset::Min.settings(),
            RenderSettings { dpi: 72, jpeg_quality: 0.4 }
        );
    }

    #[test]
    fn unrecognised_name_falls_back_to_default() {
        assert_eq!(QualityPreset::from_name("ultra"), QualityPreset::Pc);
        assert_eq!(QualityPreset::from_name(""), QualityPreset::Pc);
        assert_eq!(QualityPreset::from_name("PC-HI"), QualityPreset::PcHi);
    }

    #[test]
    fn constrained_profile_caps_high_dpi_presets() {
        let capped = RenderSettings { dpi: 144, jpeg_quality: 0.6 };
        assert_eq!(QualityPreset::PcHi.resolve(DeviceProfile::Constrained), capped);
        assert_eq!(QualityPreset::Print.resolve(DeviceProfile::Constrained), capped);
    }

    #[test]
    fn constrained_profile_leaves_low_dpi_presets_alone() {
        assert_eq!(
            QualityPreset::Mobile.resolve(DeviceProfile::Constrained),
            QualityPreset::Mobile.settings()
        );
        assert_eq!(
            QualityPreset::Min.resolve(DeviceProfile::Constrained),
            QualityPreset::Min.settings()
        );
        assert_eq!(
            QualityPreset::Pc.resolve(DeviceProfile::Constrained),
            QualityPreset::Pc.settings()
        );
    }

    #[test]
    fn standard_profile_honours_preset_as_is() {
        assert_eq!(
            QualityPreset::PcHi.resolve(DeviceProfile::Standard),
            QualityPreset::PcHi.settings()
        );
    }

    #[test]
    fn scale_is_dpi_over_72() {
        assert!((QualityPreset::Pc.settings().scale() - 2.0).abs() < f32::EPSILON);
        assert!((QualityPreset::Min.settings().scale() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn quality_percent_mapping() {
        assert_eq!(QualityPreset::Pc.settings().jpeg_quality_percent(), 60);
        assert_eq!(QualityPreset::Min.settings().jpeg_quality_percent(), 40);
        assert_eq!(QualityPreset::PcHi.settings().jpeg_quality_percent(), 80);
    }

    #[test]
    fn extract_builder_rejects_bad_scale() {
        assert!(ExtractConfig::builder().scale(0.0).build().is_err());
        assert!(ExtractConfig::builder().scale(1.5).build().is_ok());
    }

    #[test]
    fn extract_default_matches_fixed_scale() {
        let c = ExtractConfig::default();
        assert!((c.scale - 1.5).abs() < f32::EPSILON);
        assert!(c.jpeg_quality.is_none());
    }
}

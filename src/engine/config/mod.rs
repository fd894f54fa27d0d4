//! ### English
//! Compositor configuration loaded from TOML. Every field is optional in the file.
//!
//! ### 中文
//! 从 TOML 加载的合成器配置。文件中的每个字段都是可选的。

use std::fs;
use std::path::Path;
use std::time::Duration;

use dpi::PhysicalSize;
use serde::Deserialize;

use crate::engine::buffer::BufferMode;
use crate::engine::error::ConfigError;

/// ### English
/// Top-level compositor settings.
///
/// ### 中文
/// 合成器的顶层设置。
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// ### English
    /// Buffering strategy applied at startup.
    ///
    /// ### 中文
    /// 启动时使用的缓冲策略。
    pub buffer_mode: BufferMode,
    /// ### English
    /// Render tick interval in milliseconds.
    ///
    /// ### 中文
    /// 渲染 tick 间隔（毫秒）。
    pub tick_ms: u32,
    pub video_ms_per_frame: u32,
    /// ### English
    /// `0` means the fractal refreshes on every tick.
    ///
    /// ### 中文
    /// `0` 表示分形在每次 tick 都刷新。
    pub fractal_ms_per_frame: u32,
    pub initial_width: u32,
    pub initial_height: u32,
    /// ### English
    /// Worker thread names are `<prefix>-video` and `<prefix>-fractal`.
    ///
    /// ### 中文
    /// worker 线程名为 `<prefix>-video` 与 `<prefix>-fractal`。
    pub worker_name_prefix: String,
    pub fractal: FractalConfig,
}

/// ### English
/// Fractal generator settings.
///
/// ### 中文
/// 分形生成器设置。
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FractalConfig {
    pub animated: bool,
    pub seed: [f32; 2],
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            buffer_mode: BufferMode::Single,
            tick_ms: 16,
            video_ms_per_frame: 40,
            fractal_ms_per_frame: 0,
            initial_width: 640,
            initial_height: 480,
            worker_name_prefix: "fx-worker".to_string(),
            fractal: FractalConfig::default(),
        }
    }
}

impl Default for FractalConfig {
    fn default() -> Self {
        Self {
            animated: true,
            seed: [-0.372_867, 0.602_788],
        }
    }
}

impl CompositorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.tick_ms.max(1)))
    }

    /// ### English
    /// Initial output size, clamped to at least 1x1.
    ///
    /// ### 中文
    /// 初始输出尺寸，至少为 1x1。
    pub fn initial_size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.initial_width.max(1), self.initial_height.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = CompositorConfig::from_toml_str("").unwrap();
        assert_eq!(config, CompositorConfig::default());
        assert_eq!(config.tick_interval(), Duration::from_millis(16));
    }

    #[test]
    fn partial_file_overrides_named_fields() {
        let config = CompositorConfig::from_toml_str(
            r#"
            buffer_mode = "triple"
            fractal_ms_per_frame = 33

            [fractal]
            animated = false
            "#,
        )
        .unwrap();
        assert_eq!(config.buffer_mode, BufferMode::Triple);
        assert_eq!(config.fractal_ms_per_frame, 33);
        assert!(!config.fractal.animated);
        assert_eq!(config.fractal.seed, FractalConfig::default().seed);
        assert_eq!(config.video_ms_per_frame, 40);
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let err = CompositorConfig::from_toml_str(r#"buffer_mode = "quad""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = CompositorConfig::load("/nonexistent/fx-compositor.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn zero_sizes_are_clamped() {
        let config = CompositorConfig {
            initial_width: 0,
            initial_height: 0,
            ..CompositorConfig::default()
        };
        assert_eq!(config.initial_size(), PhysicalSize::new(1, 1));
    }
}

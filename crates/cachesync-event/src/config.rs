//! 事件编解码器配置。
//!
//! ```toml
//! version = "v1"             # 编码时使用的变体："default" 或 "v1"
//! unknown_version = "strict" # 未知版本："strict" 拒绝，"lenient" 按 default 解码
//! max_argument_len = 255     # 单个参数块的最大字节数，1..=255
//! ```

use cachesync_codec::{CodecError, Result};
use serde::{Deserialize, Serialize};

/// 内置线上变体。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireVersion {
    /// 名称式元数据，标签 0。
    #[default]
    Default,
    /// 序号式元数据，标签 1。
    V1,
}

impl WireVersion {
    /// 版本字节。
    pub fn tag(self) -> u8 {
        match self {
            WireVersion::Default => 0,
            WireVersion::V1 => 1,
        }
    }

    /// 由版本字节反查。
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(WireVersion::Default),
            1 => Some(WireVersion::V1),
            _ => None,
        }
    }
}

/// 解码时遇到未注册版本字节的处理策略。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownVersionPolicy {
    /// 返回 [`CodecError::UnsupportedVersion`]。
    #[default]
    Strict,
    /// 记录告警并按 [`WireVersion::Default`] 解码。
    Lenient,
}

/// [`EventCodec`](crate::EventCodec) 的配置。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventCodecConfig {
    /// 事件未自带版本时使用的变体。
    pub version: WireVersion,
    /// 未知版本策略。
    pub unknown_version: UnknownVersionPolicy,
    /// 单个参数块的最大字节数。
    pub max_argument_len: u8,
}

impl Default for EventCodecConfig {
    fn default() -> Self {
        Self {
            version: WireVersion::Default,
            unknown_version: UnknownVersionPolicy::Strict,
            max_argument_len: u8::MAX,
        }
    }
}

impl EventCodecConfig {
    /// 设置编码变体。
    pub fn with_version(mut self, version: WireVersion) -> Self {
        self.version = version;
        self
    }

    /// 设置未知版本策略。
    pub fn with_unknown_version(mut self, policy: UnknownVersionPolicy) -> Self {
        self.unknown_version = policy;
        self
    }

    /// 设置参数块上限。
    pub fn with_max_argument_len(mut self, limit: u8) -> Self {
        self.max_argument_len = limit;
        self
    }

    /// 校验取值：参数块上限不得为 0（否则任何非空参数都无法编码）。
    pub fn validate(&self) -> Result<()> {
        if self.max_argument_len == 0 {
            return Err(CodecError::Config {
                detail: "max_argument_len must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    /// 解析 TOML 文档并校验。缺省字段取默认值，未知字段报错。
    #[cfg(feature = "toml")]
    pub fn from_toml_str(document: &str) -> Result<Self> {
        let config: Self = toml::from_str(document).map_err(|err| CodecError::Config {
            detail: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strict_default_variant() {
        let config = EventCodecConfig::default();
        assert_eq!(config.version, WireVersion::Default);
        assert_eq!(config.unknown_version, UnknownVersionPolicy::Strict);
        assert_eq!(config.max_argument_len, 255);
        config.validate().unwrap();
    }

    #[test]
    fn tags_roundtrip() {
        for version in [WireVersion::Default, WireVersion::V1] {
            assert_eq!(WireVersion::from_tag(version.tag()), Some(version));
        }
        assert_eq!(WireVersion::from_tag(9), None);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn toml_documents() {
        let config = EventCodecConfig::from_toml_str(
            r#"
            version = "v1"
            unknown_version = "lenient"
            "#,
        )
        .unwrap();
        assert_eq!(
            config,
            EventCodecConfig::default()
                .with_version(WireVersion::V1)
                .with_unknown_version(UnknownVersionPolicy::Lenient)
        );

        let err = EventCodecConfig::from_toml_str("max_argument_len = 0").unwrap_err();
        assert_eq!(err.code(), cachesync_codec::codes::CONFIG_INVALID);
        assert!(EventCodecConfig::from_toml_str("max_argument_len = 300").is_err());
        assert!(EventCodecConfig::from_toml_str("compression = true").is_err());
    }
}

//! 版本化命令事件编解码器。

use core::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use cachesync_codec::{
    CodecError, CodecRegistry, Decoded, DynCodec, DynValue, PublishScope, Result,
};
use tracing::warn;

use crate::config::{EventCodecConfig, UnknownVersionPolicy, WireVersion};
use crate::event::{Arg, CommandEvent};
use crate::frame::{FrameReader, FrameWriter};
use crate::method::MethodRegistry;
use crate::variant::{IndexedVariant, NamedVariant, WireVariant};

/// 命令事件编解码器。
///
/// # 行为逻辑（How）
/// - **编码**：确定版本（事件自带或配置默认）→ 写版本字节 → 应用名 → 变体元数据 →
///   按声明顺序写参数块，每个参数的编解码器由注册中心按参数声明类型给出；
/// - **解码**：读帧首版本字节选出变体 → 应用名 → 变体解析方法 → 按解析出的参数声明类型逐个解码 →
///   确认无尾随字节。
///
/// # 契约说明（What）
/// - 参数个数必须与方法声明一致，否则返回 [`CodecError::ArgumentCountMismatch`]；
/// - 空参数写为零长度块，解码为 `None`；
/// - 单个参数块超过 `max_argument_len` 时拒绝编码（[`CodecError::ArgumentTooLarge`]），不会截断；
/// - 未知版本按 [`UnknownVersionPolicy`] 处理。
pub struct EventCodec {
    codecs: Arc<CodecRegistry>,
    methods: Arc<dyn MethodRegistry>,
    variants: BTreeMap<u8, Arc<dyn WireVariant>>,
    config: EventCodecConfig,
}

impl EventCodec {
    /// 以默认配置构造，内置 [`NamedVariant`] 与 [`IndexedVariant`]。
    pub fn new(codecs: Arc<CodecRegistry>, methods: Arc<dyn MethodRegistry>) -> Self {
        let mut variants: BTreeMap<u8, Arc<dyn WireVariant>> = BTreeMap::new();
        variants.insert(NamedVariant.tag(), Arc::new(NamedVariant));
        variants.insert(IndexedVariant.tag(), Arc::new(IndexedVariant));
        Self {
            codecs,
            methods,
            variants,
            config: EventCodecConfig::default(),
        }
    }

    /// 替换配置；配置非法时返回 [`CodecError::Config`]。
    pub fn with_config(mut self, config: EventCodecConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// 接入自定义变体；与已有变体标签相同时替换之。
    pub fn with_variant(mut self, variant: Arc<dyn WireVariant>) -> Self {
        self.variants.insert(variant.tag(), variant);
        self
    }

    /// 当前配置。
    pub fn config(&self) -> &EventCodecConfig {
        &self.config
    }

    /// 编解码器注册中心。
    pub fn codecs(&self) -> &Arc<CodecRegistry> {
        &self.codecs
    }

    /// 编码事件。
    pub fn encode(&self, event: &CommandEvent) -> Result<Bytes> {
        self.encode_with(event, |codec, value| codec.encode_dyn(Some(&**value)))
    }

    /// 在发布作用域内编码事件：同一个参数 `Arc` 在作用域内只编码一次。
    pub fn encode_in(&self, event: &CommandEvent, scope: &PublishScope) -> Result<Bytes> {
        self.encode_with(event, |codec, value| scope.encode_dyn(codec, value))
    }

    /// 解码帧。
    pub fn decode(&self, frame: &[u8]) -> Result<CommandEvent> {
        let mut reader = FrameReader::new(frame);
        let version = reader.read_u8("version")?;
        let variant = self.variant_for_decode(version)?;
        let application = reader.read_name("application")?;
        let method = variant.read_metadata(&mut reader, self.methods.as_ref())?;

        let mut args: Vec<Arg> = Vec::with_capacity(method.params().len());
        for (index, param) in method.params().iter().enumerate() {
            let Some(bytes) = reader.read_block("argument")? else {
                args.push(None);
                continue;
            };
            let codec = self.codecs.lookup(param.token());
            let value: Arg = match codec.decode_dyn(Some(bytes))? {
                Decoded::Value(value) => Some(Arc::from(value)),
                Decoded::Absent => None,
                Decoded::Skipped => {
                    return Err(CodecError::CodecNotApplicable {
                        codec: codec.codec_name(),
                        field: format!("argument #{index}"),
                    });
                }
            };
            args.push(value);
        }
        reader.finish()?;

        Ok(CommandEvent::new(application, method, args).with_version(variant.tag()))
    }

    fn encode_with(
        &self,
        event: &CommandEvent,
        mut encode_arg: impl FnMut(&dyn DynCodec, &Arc<DynValue>) -> Result<Option<Vec<u8>>>,
    ) -> Result<Bytes> {
        let version = event.version().unwrap_or(self.config.version.tag());
        let variant = self
            .variants
            .get(&version)
            .ok_or(CodecError::UnsupportedVersion { version })?;
        let method = event.method();
        let params = method.params();
        if params.len() != event.args().len() {
            return Err(CodecError::ArgumentCountMismatch {
                method: method.signature(),
                expected: params.len(),
                actual: event.args().len(),
            });
        }

        let mut out = FrameWriter::with_capacity(64);
        out.put_u8(version);
        out.put_name("application", event.application())?;
        variant.write_metadata(method, self.methods.as_ref(), &mut out)?;
        for (index, (param, arg)) in params.iter().zip(event.args()).enumerate() {
            let payload = match arg {
                None => None,
                Some(value) => encode_arg(self.codecs.lookup(param.token()).as_ref(), value)?,
            };
            out.put_block(index, payload.as_deref(), self.config.max_argument_len)?;
        }
        Ok(out.finish())
    }

    fn variant_for_decode(&self, version: u8) -> Result<&Arc<dyn WireVariant>> {
        if let Some(variant) = self.variants.get(&version) {
            return Ok(variant);
        }
        match self.config.unknown_version {
            UnknownVersionPolicy::Strict => Err(CodecError::UnsupportedVersion { version }),
            UnknownVersionPolicy::Lenient => {
                warn!(version, "unknown wire version, decoding with the default variant");
                self.variants
                    .get(&WireVersion::Default.tag())
                    .ok_or(CodecError::UnsupportedVersion { version })
            }
        }
    }
}

impl fmt::Debug for EventCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variants: Vec<_> = self
            .variants
            .values()
            .map(|variant| (variant.tag(), variant.name()))
            .collect();
        f.debug_struct("EventCodec")
            .field("codecs", &self.codecs)
            .field("variants", &variants)
            .field("config", &self.config)
            .finish()
    }
}

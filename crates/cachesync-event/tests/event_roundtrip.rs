//! 命令事件帧的端到端验证。
//!
//! - **核心目标 (Why)**：确认两个内置变体的字节布局、参数块边界、未知版本策略与错误路径；
//! - **结构说明 (How)**：`codec_with` 以显式方法表与内置注册中心构造编解码器；`StubIndex` 模拟只按序号
//!   解析的外部方法注册表；
//! - **合同与边界 (What)**：字符串参数走兜底编解码器（JSON 文本），因此 `"k"` 编码为 3 字节。

use std::sync::Arc;

use cachesync_codec::{CodecRegistry, DynValue, Expiration, PublishScope, TimeUnit};
use cachesync_event::{
    CodecError, CommandEvent, EventCodec, EventCodecConfig, FrameReader, FrameWriter,
    MethodDescriptor, MethodRegistry, MethodTable, NamedVariant, Result, UnknownVersionPolicy,
    WireVariant, WireVersion,
};
use proptest::prelude::*;

fn set_method() -> MethodDescriptor {
    MethodDescriptor::new("io.cache.Commands", "set")
        .param::<String>("String")
        .param::<String>("String")
}

fn expire_method() -> MethodDescriptor {
    MethodDescriptor::new("io.cache.Commands", "expire")
        .param::<String>("String")
        .param::<Expiration>("Expiration")
}

fn table() -> MethodTable {
    MethodTable::from_methods([set_method(), expire_method()]).expect("small table")
}

fn codec_with(config: EventCodecConfig) -> EventCodec {
    EventCodec::new(Arc::new(CodecRegistry::with_builtins()), Arc::new(table()))
        .with_config(config)
        .expect("valid config")
}

fn set_event(key: &str, value: &str) -> CommandEvent {
    CommandEvent::builder("app1", Arc::new(set_method()))
        .arg(key.to_owned())
        .arg(value.to_owned())
        .build()
}

fn push_name(frame: &mut Vec<u8>, name: &str) {
    frame.push(name.len() as u8);
    frame.extend_from_slice(name.as_bytes());
}

#[test]
fn default_variant_layout_and_roundtrip() {
    let codec = codec_with(EventCodecConfig::default());
    let frame = codec.encode(&set_event("k", "v")).unwrap();

    let mut expected = vec![0];
    push_name(&mut expected, "app1");
    push_name(&mut expected, "Commands");
    push_name(&mut expected, "set");
    expected.push(2);
    push_name(&mut expected, "String");
    push_name(&mut expected, "String");
    push_name(&mut expected, "\"k\"");
    push_name(&mut expected, "\"v\"");
    assert_eq!(&frame[..], &expected[..]);

    let event = codec.decode(&frame).unwrap();
    assert_eq!(event.application(), "app1");
    assert_eq!(event.method().signature(), "Commands.set(String, String)");
    assert_eq!(event.arg::<String>(0).map(String::as_str), Some("k"));
    assert_eq!(event.arg::<String>(1).map(String::as_str), Some("v"));
    assert_eq!(event.version(), Some(WireVersion::Default.tag()));
}

/// 只认识一个方法、序号固定为 7 的外部注册表。
struct StubIndex {
    method: Arc<MethodDescriptor>,
}

impl MethodRegistry for StubIndex {
    fn resolve_by_signature(
        &self,
        _interface: &str,
        _method: &str,
        _param_types: &[&str],
    ) -> Option<Arc<MethodDescriptor>> {
        None
    }

    fn resolve_by_index(&self, index: i16) -> Option<Arc<MethodDescriptor>> {
        (index == 7).then(|| Arc::clone(&self.method))
    }

    fn index_of(&self, method: &MethodDescriptor) -> Option<i16> {
        (*method == *self.method).then_some(7)
    }
}

#[test]
fn v1_variant_writes_the_method_index() {
    let stub = StubIndex {
        method: Arc::new(set_method()),
    };
    let codec = EventCodec::new(Arc::new(CodecRegistry::with_builtins()), Arc::new(stub))
        .with_config(EventCodecConfig::default().with_version(WireVersion::V1))
        .unwrap();
    let frame = codec.encode(&set_event("k", "v")).unwrap();

    let mut expected = vec![1];
    push_name(&mut expected, "app1");
    expected.extend_from_slice(&[0x00, 0x07]);
    push_name(&mut expected, "\"k\"");
    push_name(&mut expected, "\"v\"");
    assert_eq!(&frame[..], &expected[..]);

    let event = codec.decode(&frame).unwrap();
    assert_eq!(event.method().name(), "set");
    assert_eq!(event.arg::<String>(1).map(String::as_str), Some("v"));
    assert_eq!(event.version(), Some(1));
}

#[test]
fn unknown_version_follows_the_configured_policy() {
    let strict = codec_with(EventCodecConfig::default());
    let mut frame = strict.encode(&set_event("k", "v")).unwrap().to_vec();
    frame[0] = 9;
    let err = strict.decode(&frame).unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedVersion { version: 9 }));

    let lenient = codec_with(
        EventCodecConfig::default().with_unknown_version(UnknownVersionPolicy::Lenient),
    );
    let event = lenient.decode(&frame).unwrap();
    assert_eq!(event.arg::<String>(0).map(String::as_str), Some("k"));
}

#[test]
fn null_arguments_are_zero_length_blocks() {
    let codec = codec_with(EventCodecConfig::default());
    let event = CommandEvent::builder("app1", Arc::new(expire_method()))
        .arg_none()
        .arg(Expiration::new(30, TimeUnit::Seconds))
        .build();
    let frame = codec.encode(&event).unwrap();

    // 末尾是 9 字节的过期时间块，其前一个块为空参数。
    assert_eq!(frame[frame.len() - 10], 9);
    assert_eq!(frame[frame.len() - 11], 0);

    let decoded = codec.decode(&frame).unwrap();
    assert!(decoded.is_null(0));
    assert_eq!(
        decoded.arg::<Expiration>(1),
        Some(&Expiration::new(30, TimeUnit::Seconds))
    );
}

#[test]
fn oversized_arguments_are_rejected() {
    let codec = codec_with(EventCodecConfig::default());
    let err = codec
        .encode(&set_event("k", &"x".repeat(300)))
        .unwrap_err();
    assert!(matches!(
        err,
        CodecError::ArgumentTooLarge {
            index: 1,
            len: 302,
            limit: 255
        }
    ));

    let tight = codec_with(EventCodecConfig::default().with_max_argument_len(4));
    assert!(tight.encode(&set_event("k", "v")).is_ok());
    assert!(matches!(
        tight.encode(&set_event("key", "v")),
        Err(CodecError::ArgumentTooLarge { index: 0, .. })
    ));
}

#[test]
fn argument_shape_errors() {
    let codec = codec_with(EventCodecConfig::default());

    let short = CommandEvent::builder("app1", Arc::new(set_method()))
        .arg("k".to_owned())
        .build();
    assert!(matches!(
        codec.encode(&short),
        Err(CodecError::ArgumentCountMismatch {
            expected: 2,
            actual: 1,
            ..
        })
    ));

    let wrong_type = CommandEvent::builder("app1", Arc::new(set_method()))
        .arg("k".to_owned())
        .arg(5_i32)
        .build();
    assert!(matches!(
        codec.encode(&wrong_type),
        Err(CodecError::TypeMismatch { .. })
    ));

    let non_ascii = CommandEvent::builder("appé", Arc::new(set_method()))
        .arg("k".to_owned())
        .arg("v".to_owned())
        .build();
    assert!(matches!(
        codec.encode(&non_ascii),
        Err(CodecError::NonAscii {
            field: "application"
        })
    ));
}

#[test]
fn malformed_frames_are_rejected() {
    let codec = codec_with(EventCodecConfig::default());
    let frame = codec.encode(&set_event("k", "v")).unwrap();

    let err = codec.decode(&frame[..frame.len() - 1]).unwrap_err();
    assert!(matches!(err, CodecError::Truncated { .. }));
    assert!(err.is_corruption());

    let mut padded = frame.to_vec();
    padded.push(0);
    assert!(matches!(
        codec.decode(&padded),
        Err(CodecError::TrailingBytes { remaining: 1 })
    ));

    let mut renamed = vec![0];
    push_name(&mut renamed, "app1");
    push_name(&mut renamed, "Commands");
    push_name(&mut renamed, "get");
    renamed.push(0);
    assert!(matches!(
        codec.decode(&renamed),
        Err(CodecError::UnresolvedMethod { signature }) if signature == "Commands.get()"
    ));

    assert!(matches!(
        codec.decode(&[]),
        Err(CodecError::Truncated {
            field: "version",
            ..
        })
    ));
}

#[test]
fn v1_requires_an_indexed_method() {
    let codec = codec_with(EventCodecConfig::default().with_version(WireVersion::V1));
    let unknown = MethodDescriptor::new("Commands", "flushall");
    let event = CommandEvent::builder("app1", Arc::new(unknown)).build();
    assert!(matches!(
        codec.encode(&event),
        Err(CodecError::UnindexedMethod { .. })
    ));
}

#[test]
fn publish_scope_reuses_shared_arguments() {
    let codec = codec_with(EventCodecConfig::default());
    let scope = PublishScope::new();
    let key: Arc<DynValue> = Arc::new("shared".to_owned());
    let event = CommandEvent::builder("app1", Arc::new(set_method()))
        .arg_shared(Arc::clone(&key))
        .arg_shared(key)
        .build();

    let first = codec.encode_in(&event, &scope).unwrap();
    let second = codec.encode_in(&event, &scope).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, codec.encode(&event).unwrap());
    assert_eq!(scope.len(), 1);
}

/// 以标签 2 复用名称式元数据的自定义变体。
struct Mirror;

impl WireVariant for Mirror {
    fn tag(&self) -> u8 {
        2
    }

    fn name(&self) -> &'static str {
        "mirror"
    }

    fn write_metadata(
        &self,
        method: &MethodDescriptor,
        methods: &dyn MethodRegistry,
        out: &mut FrameWriter,
    ) -> Result<()> {
        NamedVariant.write_metadata(method, methods, out)
    }

    fn read_metadata(
        &self,
        input: &mut FrameReader<'_>,
        methods: &dyn MethodRegistry,
    ) -> Result<Arc<MethodDescriptor>> {
        NamedVariant.read_metadata(input, methods)
    }
}

#[test]
fn custom_variants_plug_in_by_tag() {
    let codec = codec_with(EventCodecConfig::default()).with_variant(Arc::new(Mirror));
    let frame = codec.encode(&set_event("k", "v").with_version(2)).unwrap();
    assert_eq!(frame[0], 2);
    assert_eq!(codec.decode(&frame).unwrap().version(), Some(2));
}

proptest! {
    #[test]
    fn prop_both_variants_roundtrip(
        application in "[a-zA-Z0-9_.-]{0,32}",
        key in "\\PC{0,60}",
        value in "\\PC{0,60}",
        indexed in any::<bool>(),
    ) {
        let version = if indexed { WireVersion::V1 } else { WireVersion::Default };
        let codec = codec_with(EventCodecConfig::default().with_version(version));
        let event = CommandEvent::builder(application.as_str(), Arc::new(set_method()))
            .arg(key.clone())
            .arg(value.clone())
            .build();
        let frame = codec.encode(&event).unwrap();
        prop_assert_eq!(frame[0], version.tag());

        let decoded = codec.decode(&frame).unwrap();
        prop_assert_eq!(decoded.application(), application.as_str());
        prop_assert_eq!(decoded.arg::<String>(0), Some(&key));
        prop_assert_eq!(decoded.arg::<String>(1), Some(&value));
    }
}

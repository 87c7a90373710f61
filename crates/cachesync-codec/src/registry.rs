//! 类型到编解码器的分发表。
//!
//! # 设计背景（Why）
//! - 写命令的参数类型在运行期才确定，需要按类型查找编解码器；
//! - 注册表由调用方显式构造并以 `Arc` 共享，不存在进程级全局状态，测试之间互不干扰。
//!
//! # 并发模型（How）
//! - 读路径通过 [`ArcSwap`] 取快照，无锁；
//! - `register` 与兜底缓存以 `rcu` 发布新快照（写时复制）。并发的兜底缓存会收敛到同一份登记，
//!   读者永不阻塞。

use core::any::type_name;
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, trace, warn};

use crate::codec::{Codec, Decoded, DynCodec, DynValue, TypeToken, TypedCodecAdapter};
use crate::discovery::{BuiltinCodecs, CodecDiscovery};
use crate::error::{CodecError, Result};

type CodecTable = HashMap<TypeToken, Arc<dyn DynCodec>>;

/// 编解码器注册中心。
///
/// # 契约说明（What）
/// - [`register`](Self::register) 无条件覆盖；若此前登记的是**不同**的编解码器，输出 `warn` 日志；
/// - [`lookup`](Self::lookup) 命中则返回登记项，未命中则构造并缓存该类型的兜底编解码器；
/// - 同一令牌的兜底缓存是幂等的：多次 `lookup` 返回同一个实例。
pub struct CodecRegistry {
    codecs: ArcSwap<CodecTable>,
}

impl CodecRegistry {
    /// 构造空注册表。
    pub fn new() -> Self {
        Self {
            codecs: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// 构造并装配全部内置编解码器。
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.install(&BuiltinCodecs);
        registry
    }

    /// 登记编解码器，返回被替换的旧登记项。
    pub fn register(
        &self,
        token: TypeToken,
        codec: Arc<dyn DynCodec>,
    ) -> Option<Arc<dyn DynCodec>> {
        let before = self.codecs.rcu(|current| {
            let mut next = CodecTable::clone(current);
            next.insert(token, Arc::clone(&codec));
            next
        });
        let previous = before.get(&token).cloned();
        if let Some(previous) = previous.as_ref()
            && !previous.same_as(codec.as_ref())
        {
            warn!(
                target_type = %token,
                previous_codec = previous.codec_name(),
                previous_target = %previous.target(),
                codec = codec.codec_name(),
                "replacing registered codec"
            );
        }
        trace!(target_type = %token, codec = codec.codec_name(), "codec registered");
        previous
    }

    /// 以泛型编解码器登记，目标类型取自 `C::Value`。
    pub fn register_codec<C>(&self, codec: C) -> Option<Arc<dyn DynCodec>>
    where
        C: Codec,
        C::Value: Serialize + DeserializeOwned,
    {
        self.register(
            TypeToken::of::<C::Value>(),
            Arc::new(TypedCodecAdapter::new(codec)),
        )
    }

    /// 查找编解码器；未登记时缓存并返回兜底编解码器。
    pub fn lookup(&self, token: TypeToken) -> Arc<dyn DynCodec> {
        if let Some(codec) = self.codecs.load().get(&token) {
            return Arc::clone(codec);
        }

        let fallback = token.build_fallback();
        let before = self.codecs.rcu(|current| {
            if current.contains_key(&token) {
                Arc::clone(current)
            } else {
                let mut next = CodecTable::clone(current);
                next.insert(token, Arc::clone(&fallback));
                Arc::new(next)
            }
        });
        if !before.contains_key(&token) {
            debug!(
                target_type = %token,
                codec = fallback.codec_name(),
                "no codec registered, caching generic fallback"
            );
        }
        self.codecs
            .load()
            .get(&token)
            .cloned()
            .unwrap_or(fallback)
    }

    /// 编码类型化的值。
    pub fn encode<T>(&self, value: Option<&T>) -> Result<Option<Vec<u8>>>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.lookup(TypeToken::of::<T>())
            .encode_dyn(value.map(|v| v as &DynValue))
    }

    /// 按令牌编码类型擦除的值。
    pub fn encode_dyn(&self, token: TypeToken, value: Option<&DynValue>) -> Result<Option<Vec<u8>>> {
        self.lookup(token).encode_dyn(value)
    }

    /// 按令牌解码，结果需由调用方下转型。
    pub fn decode(&self, bytes: Option<&[u8]>, token: TypeToken) -> Result<Decoded<Box<DynValue>>> {
        self.lookup(token).decode_dyn(bytes)
    }

    /// 解码为类型 `T`。
    pub fn decode_as<T>(&self, bytes: Option<&[u8]>) -> Result<Decoded<T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        match self.decode(bytes, TypeToken::of::<T>())? {
            Decoded::Value(value) => value
                .downcast::<T>()
                .map(|typed| Decoded::Value(*typed))
                .map_err(|_| CodecError::TypeMismatch {
                    expected: type_name::<T>(),
                }),
            Decoded::Absent => Ok(Decoded::Absent),
            Decoded::Skipped => Ok(Decoded::Skipped),
        }
    }

    /// 从发现源装配编解码器，返回登记数量。目标类型未知的工厂被跳过。
    pub fn install(&self, discovery: &dyn CodecDiscovery) -> usize {
        let mut installed = 0;
        for factory in discovery.discover() {
            let Some(token) = factory.target() else {
                warn!(factory = factory.name(), "skipping codec factory with unknown target type");
                continue;
            };
            self.register(token, factory.build());
            installed += 1;
        }
        installed
    }

    /// 当前登记项快照：`(目标类型名, 编解码器名)`，按目标类型名排序。
    pub fn registered(&self) -> Vec<(&'static str, &'static str)> {
        let mut entries: Vec<_> = self
            .codecs
            .load()
            .iter()
            .map(|(token, codec)| (token.name(), codec.codec_name()))
            .collect();
        entries.sort_unstable();
        entries
    }

    /// 是否已有登记项（含缓存的兜底）。
    pub fn contains(&self, token: TypeToken) -> bool {
        self.codecs.load().contains_key(&token)
    }

    /// 登记项数量。
    pub fn len(&self) -> usize {
        self.codecs.load().len()
    }

    /// 是否为空。
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codecs", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::{Point, TimeUnit};
    use crate::discovery::{CodecFactory, TypedCodecFactory};
    use crate::fallback::GenericCodec;
    use crate::primitive::{IntCodec, LongCodec};
    use tracing_test::traced_test;

    struct Opaque;

    impl CodecFactory for Opaque {
        fn name(&self) -> &'static str {
            "opaque"
        }

        fn target(&self) -> Option<TypeToken> {
            None
        }

        fn build(&self) -> Arc<dyn DynCodec> {
            TypeToken::of::<u8>().build_fallback()
        }
    }

    struct Mixed;

    impl CodecDiscovery for Mixed {
        fn discover(&self) -> Vec<Box<dyn CodecFactory>> {
            vec![
                Box::new(Opaque) as Box<dyn CodecFactory>,
                TypedCodecFactory::boxed(|| LongCodec),
            ]
        }
    }

    #[test]
    fn builtins_cover_primitives_and_composites() {
        let registry = CodecRegistry::with_builtins();
        assert!(registry.contains(TypeToken::of::<i64>()));
        assert!(registry.contains(TypeToken::of::<TimeUnit>()));
        assert!(registry.contains(TypeToken::of::<Point>()));
        assert!(!registry.contains(TypeToken::of::<String>()));
    }

    #[test]
    fn lookup_caches_one_fallback() {
        let registry = CodecRegistry::new();
        let token = TypeToken::of::<Vec<u32>>();
        let first = registry.lookup(token);
        let second = registry.lookup(token);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            first.codec_name(),
            type_name::<GenericCodec<Vec<u32>>>()
        );
    }

    #[test]
    fn register_returns_previous() {
        let registry = CodecRegistry::new();
        assert!(registry.register_codec(LongCodec).is_none());
        let previous = registry.register_codec(LongCodec).expect("previous entry");
        assert_eq!(previous.codec_name(), type_name::<LongCodec>());
    }

    #[test]
    fn typed_helpers_roundtrip() {
        let registry = CodecRegistry::with_builtins();
        let bytes = registry.encode(Some(&7_i32)).unwrap();
        assert_eq!(bytes, Some(IntCodec::to_bytes(7).to_vec()));
        assert_eq!(
            registry.decode_as::<i32>(bytes.as_deref()).unwrap(),
            Decoded::Value(7)
        );
        assert_eq!(registry.decode_as::<i32>(None).unwrap(), Decoded::Absent);
    }

    #[test]
    fn registered_lists_sorted_entries() {
        let registry = CodecRegistry::new();
        registry.register_codec(LongCodec);
        registry.register_codec(IntCodec);
        let names: Vec<_> = registry.registered().into_iter().map(|(t, _)| t).collect();
        assert_eq!(names, vec!["i32", "i64"]);
    }

    #[traced_test]
    #[test]
    fn replacing_with_a_different_codec_warns() {
        let registry = CodecRegistry::new();
        let token = TypeToken::of::<i64>();
        registry.register_codec(LongCodec);
        let previous = registry.register(token, token.build_fallback());
        assert!(previous.is_some());
        assert!(logs_contain("replacing registered codec"));
        assert!(logs_contain("GenericCodec"));
    }

    #[traced_test]
    #[test]
    fn re_registering_an_equal_codec_is_quiet() {
        let registry = CodecRegistry::new();
        registry.register_codec(LongCodec);
        registry.register_codec(LongCodec);
        assert!(!logs_contain("replacing registered codec"));
    }

    #[traced_test]
    #[test]
    fn fallback_selection_is_logged_once() {
        let registry = CodecRegistry::new();
        registry.lookup(TypeToken::of::<Vec<String>>());
        registry.lookup(TypeToken::of::<Vec<String>>());
        logs_assert(|lines: &[&str]| {
            match lines
                .iter()
                .filter(|line| line.contains("caching generic fallback"))
                .count()
            {
                1 => Ok(()),
                n => Err(format!("expected one fallback event, saw {n}")),
            }
        });
    }

    #[traced_test]
    #[test]
    fn discovery_skips_factories_without_target() {
        let registry = CodecRegistry::new();
        assert_eq!(registry.install(&Mixed), 1);
        assert!(registry.contains(TypeToken::of::<i64>()));
        assert!(!registry.contains(TypeToken::of::<u8>()));
        assert!(logs_contain("skipping codec factory"));
    }
}

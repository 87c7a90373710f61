//! 启动期的编解码器装配。
//!
//! # 设计背景（Why）
//! - 编解码器来源可能不止一处（内置集合、业务扩展包），注册中心只需要一份可遍历的工厂清单；
//! - 工厂声明自己的目标类型，注册中心据此登记；目标无法确定的工厂被跳过并告警，不中断装配。
//!
//! # 契约说明（What）
//! - [`CodecDiscovery::discover`] 每次调用返回一份新的工厂清单；
//! - [`CodecFactory::build`] 必须返回目标类型与 [`CodecFactory::target`] 一致的编解码器。

use core::any::type_name;
use core::marker::PhantomData;
use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};

use crate::codec::{Codec, DynCodec, TypeToken, TypedCodecAdapter};
use crate::composite::{
    Aggregate, ExpirationCodec, GeoLocationCodec, LimitCodec, PointCodec, RangeCodec,
    SortOptionsCodec, SortOrder, TimeUnit, WeightedKeysCodec,
};
use crate::ordinal::EnumCodec;
use crate::primitive::{BoolCodec, DoubleCodec, IntCodec, LongCodec, ShortCodec};
use crate::text::StringCodec;

/// 编解码器工厂。
pub trait CodecFactory: Send + Sync {
    /// 工厂名，用于日志。
    fn name(&self) -> &'static str;

    /// 目标类型；`None` 表示无法确定，注册中心会跳过该工厂。
    fn target(&self) -> Option<TypeToken>;

    /// 构造对象层编解码器。
    fn build(&self) -> Arc<dyn DynCodec>;
}

/// `TypedCodecFactory` 将返回具体 [`Codec`] 的构造函数包装为 [`CodecFactory`]。
///
/// - 目标类型取自 `C::Value`，因此总能确定；
/// - `build` 调用构造函数并以 [`TypedCodecAdapter`] 装箱。
pub struct TypedCodecFactory<C, F>
where
    C: Codec,
    F: Fn() -> C + Send + Sync + 'static,
{
    constructor: F,
    _marker: PhantomData<fn() -> C>,
}

impl<C, F> TypedCodecFactory<C, F>
where
    C: Codec,
    C::Value: Serialize + DeserializeOwned,
    F: Fn() -> C + Send + Sync + 'static,
{
    /// 使用构造函数创建工厂。
    pub fn new(constructor: F) -> Self {
        Self {
            constructor,
            _marker: PhantomData,
        }
    }

    /// 创建并装箱，便于直接放入发现清单。
    pub fn boxed(constructor: F) -> Box<dyn CodecFactory> {
        Box::new(Self::new(constructor))
    }
}

impl<C, F> CodecFactory for TypedCodecFactory<C, F>
where
    C: Codec,
    C::Value: Serialize + DeserializeOwned,
    F: Fn() -> C + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        type_name::<C>()
    }

    fn target(&self) -> Option<TypeToken> {
        Some(TypeToken::of::<C::Value>())
    }

    fn build(&self) -> Arc<dyn DynCodec> {
        Arc::new(TypedCodecAdapter::new((self.constructor)()))
    }
}

/// 工厂清单的来源。
pub trait CodecDiscovery {
    /// 枚举可用的工厂。
    fn discover(&self) -> Vec<Box<dyn CodecFactory>>;
}

/// 内置编解码器集合：全部定长原语、内置枚举与复合类型。
///
/// [`StringCodec`] 不在其中，见其类型文档。
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinCodecs;

impl CodecDiscovery for BuiltinCodecs {
    fn discover(&self) -> Vec<Box<dyn CodecFactory>> {
        vec![
            TypedCodecFactory::boxed(|| BoolCodec),
            TypedCodecFactory::boxed(|| ShortCodec),
            TypedCodecFactory::boxed(|| IntCodec),
            TypedCodecFactory::boxed(|| LongCodec),
            TypedCodecFactory::boxed(|| DoubleCodec),
            TypedCodecFactory::boxed(EnumCodec::<TimeUnit>::new),
            TypedCodecFactory::boxed(EnumCodec::<SortOrder>::new),
            TypedCodecFactory::boxed(EnumCodec::<Aggregate>::new),
            TypedCodecFactory::boxed(|| PointCodec),
            TypedCodecFactory::boxed(|| LimitCodec),
            TypedCodecFactory::boxed(ExpirationCodec::new),
            TypedCodecFactory::boxed(|| GeoLocationCodec),
            TypedCodecFactory::boxed(|| RangeCodec::new(DoubleCodec)),
            TypedCodecFactory::boxed(|| RangeCodec::new(LongCodec)),
            TypedCodecFactory::boxed(|| RangeCodec::new(StringCodec)),
            TypedCodecFactory::boxed(SortOptionsCodec::new),
            TypedCodecFactory::boxed(WeightedKeysCodec::new),
        ]
    }
}

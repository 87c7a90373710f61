#![warn(missing_docs)]

//! # cachesync-codec
//!
//! ## 职责定位（Why）
//! - 为缓存客户端的写命令复制提供字节级精确的编解码能力：定长原语、枚举序号、可选字段复合类型，
//!   以及兜底的通用对象编码；
//! - 通过显式构造的 [`CodecRegistry`] 完成“类型 → 编解码器”分发，替代进程级全局表；
//! - [`PublishScope`] 在一次逻辑发布内记忆编码结果，避免同一值经多个序列化槽位时重复计算。
//!
//! ## 模块结构（How）
//! - `codec`：泛型层 [`Codec`]、对象层 [`DynCodec`] 与 [`TypedCodecAdapter`] 桥接、[`TypeToken`]；
//! - `primitive` / `ordinal` / `text`：定长原语、枚举序号与 UTF-8 文本；
//! - `composite`：点、区间、过期时间、排序参数、地理位置、权重向量；
//! - `fallback`：基于 `serde_json` 的 [`GenericCodec`]；
//! - `registry` / `discovery`：注册中心与启动期装配；
//! - `scope`：发布作用域内的值缓存；
//! - `error`：统一的 [`CodecError`] 与稳定错误码。
//!
//! ## 契约说明（What）
//! - 所有解码结果以 [`Decoded`] 表达三态：`Value`（有值）、`Absent`（合法的空值）、
//!   `Skipped`（该编解码器不适用于输入）；
//! - 定长编解码器对长度不符的输入返回 `Skipped`，不会报错；
//! - 只有注册中心输出日志（`tracing`），底层编解码器保持静默。

pub mod codec;
pub mod composite;
pub mod discovery;
pub mod error;
pub mod fallback;
pub mod ordinal;
pub mod primitive;
pub mod registry;
pub mod scope;
pub mod text;

pub use codec::{Codec, Decoded, DynCodec, DynValue, TypeToken, TypedCodecAdapter};
pub use composite::{
    Aggregate, Bound, Expiration, ExpirationCodec, GeoLocation, GeoLocationCodec, Limit,
    LimitCodec, Point, PointCodec, Range, RangeCodec, SortOptions, SortOptionsCodec, SortOrder,
    TimeUnit, WeightedKeys, WeightedKeysCodec,
};
pub use discovery::{BuiltinCodecs, CodecDiscovery, CodecFactory, TypedCodecFactory};
pub use error::{CodecError, Result, codes};
pub use fallback::GenericCodec;
pub use ordinal::{EnumCodec, EnumWidth, OrdinalEnum};
pub use primitive::{BoolCodec, DoubleCodec, IntCodec, LongCodec, ShortCodec};
pub use registry::CodecRegistry;
pub use scope::PublishScope;
pub use text::StringCodec;

//! 复合类型编解码器。
//!
//! 两种组合方式：
//!
//! - **定长拼接**：全部子字段必然存在（[`Point`]、[`Expiration`]、[`Limit`]），
//!   子字段编码按声明顺序首尾相接，`bytes_length` 为各子字段长度之和，解码按固定偏移切片；
//! - **标签映射**：存在可选子字段（[`GeoLocation`]、[`Range`]、[`SortOptions`]、[`WeightedKeys`]），
//!   以“短标签 → 子字段编码”的有序映射承载，缺省字段不写入，整个映射交给兜底编解码器打包。
//!   解码时缺失的标签即为缺省字段，绝不推断存在性。

mod expiration;
mod geo;
mod limit;
mod point;
mod range;
mod sort;
mod weights;

pub use expiration::{Expiration, ExpirationCodec, TimeUnit};
pub use geo::{GeoLocation, GeoLocationCodec};
pub use limit::{Limit, LimitCodec};
pub use point::{Point, PointCodec};
pub use range::{Bound, Range, RangeCodec};
pub use sort::{SortOptions, SortOptionsCodec, SortOrder};
pub use weights::{Aggregate, WeightedKeys, WeightedKeysCodec};

use std::collections::BTreeMap;

use crate::codec::generic::{Codec, Decoded};
use crate::error::{CodecError, Result};
use crate::fallback::GenericCodec;

/// 标签映射的载体。
#[derive(Debug, Default)]
pub(crate) struct TaggedFields {
    fields: BTreeMap<String, Vec<u8>>,
}

impl TaggedFields {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 写入一个子字段；`None` 表示缺省，不写标签。
    pub(crate) fn put(&mut self, tag: &str, bytes: Option<Vec<u8>>) {
        if let Some(bytes) = bytes {
            self.fields.insert(tag.to_owned(), bytes);
        }
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        GenericCodec::<BTreeMap<String, Vec<u8>>>::to_bytes(&self.fields)
    }

    pub(crate) fn decode(bytes: &[u8]) -> Result<Self> {
        GenericCodec::<BTreeMap<String, Vec<u8>>>::from_bytes(bytes).map(|fields| Self { fields })
    }

    /// 按标签取出子字段并用 `codec` 解码；标签缺失返回 `None`。
    ///
    /// 子编解码器对自己的字节返回 `Skipped` 说明映射内容已损坏，报告为
    /// [`CodecError::CodecNotApplicable`]。
    pub(crate) fn field<C: Codec>(&self, tag: &str, codec: &C) -> Result<Option<C::Value>> {
        let Some(bytes) = self.fields.get(tag) else {
            return Ok(None);
        };
        match codec.decode(Some(bytes.as_slice()))? {
            Decoded::Value(value) => Ok(Some(value)),
            Decoded::Absent => Ok(None),
            Decoded::Skipped => Err(CodecError::not_applicable::<C>(format!("tag `{tag}`"))),
        }
    }

    #[cfg(test)]
    pub(crate) fn tags(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }
}

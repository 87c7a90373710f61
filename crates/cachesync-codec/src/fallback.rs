//! 通用兜底编解码器。
//!
//! 注册中心对未登记的类型、以及标签映射类复合类型的整体打包，都走这里。格式本身对编解码层不透明，
//! 当前实现为 `serde_json`。失败时包装为 [`CodecError::Fallback`] 上抛：这是最后一条路径，没有更后备的选择。
//!
//! `serde_json` 会把非有限浮点数（NaN、±∞）静默写成 `null`，编码看似成功，消费端却无法还原。
//! 因此编码产物在返回前会被回读一次：回读失败即视为编码失败。需要保留浮点位模式的复合类型
//! 应以 [`DoubleCodec`](crate::DoubleCodec) 编码浮点子字段，而不是交给本编解码器。

use core::any::type_name;
use core::marker::PhantomData;

use serde::{Serialize, de::DeserializeOwned};

use crate::codec::generic::{Codec, Decoded};
use crate::error::{CodecError, Result};

/// 基于 `serde_json` 的完整对象编解码器。
pub struct GenericCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> GenericCodec<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// 构造编解码器（无状态）。
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// 编码非空值；产物无法被解码回 `T` 时返回 `phase = "encode"` 的 [`CodecError::Fallback`]。
    pub fn to_bytes(value: &T) -> Result<Vec<u8>> {
        let encode_failed = |source: serde_json::Error| CodecError::Fallback {
            target: type_name::<T>(),
            phase: "encode",
            source,
        };
        let bytes = serde_json::to_vec(value).map_err(encode_failed)?;
        serde_json::from_slice::<T>(&bytes).map_err(encode_failed)?;
        Ok(bytes)
    }

    /// 解码非空字节。
    pub fn from_bytes(bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|source| CodecError::Fallback {
            target: type_name::<T>(),
            phase: "decode",
            source,
        })
    }
}

impl<T> Default for GenericCodec<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Codec for GenericCodec<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    type Value = T;

    fn encode(&self, value: Option<&T>) -> Result<Option<Vec<u8>>> {
        value.map(Self::to_bytes).transpose()
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Decoded<T>> {
        match bytes {
            None => Ok(Decoded::Absent),
            Some(bytes) => Self::from_bytes(bytes).map(Decoded::Value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn structured_values_roundtrip() {
        let mut map = BTreeMap::new();
        map.insert("k".to_owned(), vec![1_u8, 2, 3]);
        let codec = GenericCodec::<BTreeMap<String, Vec<u8>>>::new();
        let bytes = codec.encode(Some(&map)).unwrap().unwrap();
        assert_eq!(
            codec.decode(Some(bytes.as_slice())).unwrap(),
            Decoded::Value(map)
        );
    }

    #[test]
    fn failures_are_wrapped() {
        let codec = GenericCodec::<u32>::new();
        let err = codec.decode(Some(b"\"nope\"".as_slice())).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Fallback {
                phase: "decode",
                ..
            }
        ));
        assert_eq!(err.code(), crate::codes::CODEC_FALLBACK);
    }

    #[test]
    fn non_finite_doubles_cannot_be_encoded() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = GenericCodec::<f64>::to_bytes(&value).unwrap_err();
            assert!(matches!(err, CodecError::Fallback { phase: "encode", .. }));
        }
        let nested = vec![("k".to_owned(), f64::INFINITY)];
        let err = GenericCodec::<Vec<(String, f64)>>::to_bytes(&nested).unwrap_err();
        assert_eq!(err.code(), crate::codes::CODEC_FALLBACK);
        assert_eq!(GenericCodec::<f64>::to_bytes(&1.5).unwrap(), b"1.5");
    }
}

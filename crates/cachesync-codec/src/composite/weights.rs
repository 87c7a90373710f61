use serde::{Deserialize, Serialize};

use crate::codec::generic::{Codec, Decoded};
use crate::composite::TaggedFields;
use crate::error::{CodecError, Result};
use crate::fallback::GenericCodec;
use crate::ordinal::{EnumCodec, OrdinalEnum};
use crate::primitive::DoubleCodec;

const WEIGHTS: &str = "w";
const AGGREGATE: &str = "a";

/// 权重向量的线上形态：键与 [`DoubleCodec`] 编码的 8 字节权重，NaN 与 ±∞ 按位保留。
type EncodedWeights = Vec<(String, Vec<u8>)>;

/// 有序集合合并时的分值聚合方式。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Aggregate {
    /// 求和。
    Sum,
    /// 取最小。
    Min,
    /// 取最大。
    Max,
}

impl OrdinalEnum for Aggregate {
    const VARIANTS: &'static [Self] = &[Aggregate::Sum, Aggregate::Min, Aggregate::Max];

    fn ordinal(self) -> usize {
        self as usize
    }
}

/// 带权重的键集合与聚合方式。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightedKeys {
    /// `(键, 权重)`，按出现顺序。
    pub weights: Vec<(String, f64)>,
    /// 聚合方式。
    pub aggregate: Option<Aggregate>,
}

impl WeightedKeys {
    /// 追加一个键。
    pub fn weight(mut self, key: impl Into<String>, weight: f64) -> Self {
        self.weights.push((key.into(), weight));
        self
    }

    /// 设置聚合方式。
    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = Some(aggregate);
        self
    }
}

/// [`WeightedKeys`] 编解码器，标签 `w`（权重向量，非空时写出）与 `a`（聚合方式）。
///
/// 权重逐个以 [`DoubleCodec`] 编码后再与键一起打包，非有限权重也能原样往返。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeightedKeysCodec {
    aggregate: EnumCodec<Aggregate>,
}

impl WeightedKeysCodec {
    /// 构造编解码器。
    pub fn new() -> Self {
        Self::default()
    }
}

impl Codec for WeightedKeysCodec {
    type Value = WeightedKeys;

    fn encode(&self, value: Option<&WeightedKeys>) -> Result<Option<Vec<u8>>> {
        let Some(keys) = value else {
            return Ok(None);
        };
        let mut fields = TaggedFields::new();
        if !keys.weights.is_empty() {
            let encoded: EncodedWeights = keys
                .weights
                .iter()
                .map(|(key, weight)| (key.clone(), DoubleCodec::to_bytes(*weight).to_vec()))
                .collect();
            fields.put(WEIGHTS, Some(GenericCodec::to_bytes(&encoded)?));
        }
        fields.put(AGGREGATE, self.aggregate.encode(keys.aggregate.as_ref())?);
        fields.encode().map(Some)
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Decoded<WeightedKeys>> {
        let Some(bytes) = bytes else {
            return Ok(Decoded::Absent);
        };
        let fields = TaggedFields::decode(bytes)?;
        Ok(Decoded::Value(WeightedKeys {
            weights: fields
                .field(WEIGHTS, &GenericCodec::<EncodedWeights>::new())?
                .unwrap_or_default()
                .into_iter()
                .map(|(key, weight)| {
                    let bits = <[u8; DoubleCodec::BYTES]>::try_from(weight.as_slice()).map_err(
                        |_| CodecError::not_applicable::<DoubleCodec>(format!("weight of `{key}`")),
                    )?;
                    Ok((key, DoubleCodec::from_bytes(bits)))
                })
                .collect::<Result<_>>()?,
            aggregate: fields.field(AGGREGATE, &self.aggregate)?,
        }))
    }
}

use serde::{Deserialize, Serialize};

use crate::codec::generic::{Codec, Decoded};
use crate::composite::TaggedFields;
use crate::error::Result;
use crate::primitive::BoolCodec;

const LOWER_VALUE: &str = "mv";
const LOWER_INCLUSIVE: &str = "mi";
const UPPER_VALUE: &str = "xv";
const UPPER_INCLUSIVE: &str = "xi";

/// 区间的一端。
///
/// # 契约说明（What）
/// - 端点值缺省即无界；无界端恒视为闭合，线上也只在有界时写出闭合标记；
/// - 字段私有，经 [`Bound::new`] 构造的无界端会被规范为闭合，比较相等时同样按规范形态比较，
///   因此 `Bound::new(None, false) == Bound::unbounded()`。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bound<T> {
    value: Option<T>,
    inclusive: bool,
}

impl<T> Bound<T> {
    /// 通用构造；`value` 为 `None` 时忽略 `inclusive`，结果等同 [`Bound::unbounded`]。
    pub fn new(value: Option<T>, inclusive: bool) -> Self {
        Self {
            inclusive: inclusive || value.is_none(),
            value,
        }
    }

    /// 闭端点。
    pub fn inclusive(value: T) -> Self {
        Self {
            value: Some(value),
            inclusive: true,
        }
    }

    /// 开端点。
    pub fn exclusive(value: T) -> Self {
        Self {
            value: Some(value),
            inclusive: false,
        }
    }

    /// 无界。
    pub fn unbounded() -> Self {
        Self {
            value: None,
            inclusive: true,
        }
    }

    /// 是否有界。
    pub fn is_bounded(&self) -> bool {
        self.value.is_some()
    }

    /// 端点值。
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// 是否包含端点；无界端恒为 `true`。
    pub fn is_inclusive(&self) -> bool {
        self.inclusive || self.value.is_none()
    }
}

impl<T: PartialEq> PartialEq for Bound<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.is_inclusive() == other.is_inclusive()
    }
}

/// 有序值区间，例如有序集合的分值或字典序范围。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    /// 下界。
    pub lower: Bound<T>,
    /// 上界。
    pub upper: Bound<T>,
}

impl<T> Range<T> {
    /// 由两端构造。
    pub fn new(lower: Bound<T>, upper: Bound<T>) -> Self {
        Self { lower, upper }
    }

    /// 两端均无界。
    pub fn unbounded() -> Self {
        Self::new(Bound::unbounded(), Bound::unbounded())
    }

    /// 两端闭区间 `[lower, upper]`。
    pub fn closed(lower: T, upper: T) -> Self {
        Self::new(Bound::inclusive(lower), Bound::inclusive(upper))
    }

    /// 两端是否都无界。
    pub fn is_unbounded(&self) -> bool {
        !self.lower.is_bounded() && !self.upper.is_bounded()
    }
}

/// [`Range`] 编解码器，端点值由 `C` 编码。
///
/// 标签：`mv`/`mi` 为下界值与下界闭合标记，`xv`/`xi` 为上界。值标签只在有界时写出，
/// 闭合标记只随值写出；解码时闭合标记缺失按闭合处理。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeCodec<C> {
    values: C,
}

impl<C: Codec> RangeCodec<C> {
    /// 以端点值编解码器构造。
    pub fn new(values: C) -> Self {
        Self { values }
    }

    fn put_bound(
        &self,
        fields: &mut TaggedFields,
        bound: &Bound<C::Value>,
        value_tag: &str,
        inclusive_tag: &str,
    ) -> Result<()> {
        if let Some(value) = bound.value() {
            fields.put(value_tag, self.values.encode(Some(value))?);
            fields.put(inclusive_tag, BoolCodec.encode(Some(&bound.is_inclusive()))?);
        }
        Ok(())
    }

    fn read_bound(
        &self,
        fields: &TaggedFields,
        value_tag: &str,
        inclusive_tag: &str,
    ) -> Result<Bound<C::Value>> {
        Ok(match fields.field(value_tag, &self.values)? {
            None => Bound::unbounded(),
            Some(value) => Bound::new(
                Some(value),
                fields.field(inclusive_tag, &BoolCodec)?.unwrap_or(true),
            ),
        })
    }
}

impl<C: Codec> Codec for RangeCodec<C> {
    type Value = Range<C::Value>;

    fn encode(&self, value: Option<&Range<C::Value>>) -> Result<Option<Vec<u8>>> {
        let Some(range) = value else {
            return Ok(None);
        };
        let mut fields = TaggedFields::new();
        self.put_bound(&mut fields, &range.lower, LOWER_VALUE, LOWER_INCLUSIVE)?;
        self.put_bound(&mut fields, &range.upper, UPPER_VALUE, UPPER_INCLUSIVE)?;
        fields.encode().map(Some)
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Decoded<Range<C::Value>>> {
        let Some(bytes) = bytes else {
            return Ok(Decoded::Absent);
        };
        let fields = TaggedFields::decode(bytes)?;
        let range = Range::new(
            self.read_bound(&fields, LOWER_VALUE, LOWER_INCLUSIVE)?,
            self.read_bound(&fields, UPPER_VALUE, UPPER_INCLUSIVE)?,
        );
        if range.is_unbounded() {
            return Ok(Decoded::Value(Range::unbounded()));
        }
        Ok(Decoded::Value(range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{DoubleCodec, LongCodec};
    use crate::text::StringCodec;

    #[test]
    fn lower_only_range_keeps_upper_unbounded() {
        let codec = RangeCodec::new(DoubleCodec);
        let range = Range::new(Bound::exclusive(1.5), Bound::unbounded());
        let bytes = codec.encode(Some(&range)).unwrap().unwrap();
        assert_eq!(
            TaggedFields::decode(&bytes).unwrap().tags(),
            vec![LOWER_INCLUSIVE, LOWER_VALUE]
        );
        assert_eq!(codec.decode(Some(bytes.as_slice())).unwrap(), Decoded::Value(range));
    }

    #[test]
    fn missing_inclusive_tag_means_inclusive() {
        let mut fields = TaggedFields::new();
        fields.put(UPPER_VALUE, LongCodec.encode(Some(&10)).unwrap());
        let bytes = fields.encode().unwrap();
        let decoded = RangeCodec::new(LongCodec).decode(Some(bytes.as_slice())).unwrap();
        assert_eq!(
            decoded,
            Decoded::Value(Range::new(Bound::unbounded(), Bound::inclusive(10)))
        );
    }

    #[test]
    fn empty_map_is_unbounded_range() {
        let codec = RangeCodec::new(StringCodec);
        let bytes = codec.encode(Some(&Range::unbounded())).unwrap().unwrap();
        assert_eq!(bytes, b"{}");
        assert_eq!(
            codec.decode(Some(bytes.as_slice())).unwrap(),
            Decoded::Value(Range::unbounded())
        );
    }

    #[test]
    fn exclusive_unbounded_side_normalizes_to_inclusive() {
        let odd = Bound::<i64>::new(None, false);
        assert!(odd.is_inclusive());
        assert_eq!(odd, Bound::unbounded());

        let codec = RangeCodec::new(LongCodec);
        let range = Range::new(Bound::new(Some(3), false), odd);
        let bytes = codec.encode(Some(&range)).unwrap().unwrap();
        let decoded = codec.decode(Some(bytes.as_slice())).unwrap().value().unwrap();
        assert_eq!(decoded, range);
        assert_eq!(decoded.lower.value(), Some(&3));
        assert!(!decoded.lower.is_inclusive());
        assert!(decoded.upper.is_inclusive());
    }

    #[test]
    fn string_range_roundtrip() {
        let codec = RangeCodec::new(StringCodec);
        let range = Range::new(Bound::inclusive("a".to_owned()), Bound::exclusive("m".to_owned()));
        let bytes = codec.encode(Some(&range)).unwrap().unwrap();
        assert_eq!(codec.decode(Some(bytes.as_slice())).unwrap(), Decoded::Value(range));
    }
}

//! 枚举序号编解码。
//!
//! 变体列表在编译期以 [`OrdinalEnum::VARIANTS`] 给出，序号即变体在列表中的位置。
//! 宽度按基数选择：少于 128 个变体用 1 字节，少于 32768 个用 2 字节（[`ShortCodec`]），
//! 其余用 4 字节（[`IntCodec`]）。

use core::any::type_name;
use core::marker::PhantomData;

use crate::codec::generic::{Codec, Decoded, fixed_window};
use crate::error::{CodecError, Result};
use crate::primitive::{IntCodec, ShortCodec};

/// 可按序号编码的枚举。
///
/// # 契约说明（What）
/// - `VARIANTS` 按声明顺序列出全部变体；
/// - `ordinal(e)` 必须满足 `VARIANTS[ordinal(e)] == e`；无字段枚举通常直接写 `self as usize`；
/// - 生产端与消费端必须使用同一份变体顺序，否则解码会得到错误的变体或序号越界。
pub trait OrdinalEnum: Copy + PartialEq + Send + Sync + 'static {
    /// 按序号排列的全部变体。
    const VARIANTS: &'static [Self];

    /// 变体序号。
    fn ordinal(self) -> usize;
}

/// 序号宽度。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnumWidth {
    /// 单个原始字节。
    One,
    /// [`ShortCodec`]，2 字节大端。
    Two,
    /// [`IntCodec`]，4 字节大端。
    Four,
}

impl EnumWidth {
    /// 按变体数量选择宽度。
    pub fn for_cardinality(cardinality: usize) -> Self {
        if cardinality < 128 {
            EnumWidth::One
        } else if cardinality < 32768 {
            EnumWidth::Two
        } else {
            EnumWidth::Four
        }
    }

    /// 宽度对应的字节数。
    pub fn bytes(self) -> usize {
        match self {
            EnumWidth::One => 1,
            EnumWidth::Two => ShortCodec::BYTES,
            EnumWidth::Four => IntCodec::BYTES,
        }
    }
}

/// 枚举序号编解码器。
///
/// # 契约说明（What）
/// - **前置条件**：构造只做一次，必须在并发编码/解码开始前完成（启动期顺序约束，不做运行时检查）；
/// - **错误语义**：序号越界（含负数）返回 [`CodecError::CorruptOrdinal`]，绝不降级为空值；
/// - **相等性**：同一枚举类型的两个实例总是相等。
pub struct EnumCodec<E: OrdinalEnum> {
    variants: &'static [E],
    width: EnumWidth,
    _marker: PhantomData<fn() -> E>,
}

impl<E: OrdinalEnum> EnumCodec<E> {
    /// 捕获变体列表并计算宽度。
    pub fn new() -> Self {
        let variants = E::VARIANTS;
        Self {
            variants,
            width: EnumWidth::for_cardinality(variants.len()),
            _marker: PhantomData,
        }
    }

    /// 序号宽度。
    pub fn width(&self) -> EnumWidth {
        self.width
    }

    /// 编码一个非空变体。
    pub fn encode_variant(&self, value: E) -> Vec<u8> {
        let ordinal = value.ordinal();
        match self.width {
            EnumWidth::One => vec![ordinal as u8],
            EnumWidth::Two => ShortCodec::to_bytes(ordinal as i16).to_vec(),
            EnumWidth::Four => IntCodec::to_bytes(ordinal as i32).to_vec(),
        }
    }

    fn read_ordinal(&self, bytes: Option<&[u8]>) -> Decoded<i64> {
        match self.width {
            EnumWidth::One => fixed_window::<1>(bytes).map(|b| i64::from(b[0] as i8)),
            EnumWidth::Two => {
                fixed_window::<2>(bytes).map(|b| i64::from(ShortCodec::from_bytes(b)))
            }
            EnumWidth::Four => fixed_window::<4>(bytes).map(|b| i64::from(IntCodec::from_bytes(b))),
        }
    }

    fn variant_at(&self, ordinal: i64) -> Result<E> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| self.variants.get(index).copied())
            .ok_or(CodecError::CorruptOrdinal {
                target: type_name::<E>(),
                ordinal,
                cardinality: self.variants.len(),
            })
    }
}

impl<E: OrdinalEnum> Default for EnumCodec<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: OrdinalEnum> Clone for EnumCodec<E> {
    fn clone(&self) -> Self {
        Self {
            variants: self.variants,
            width: self.width,
            _marker: PhantomData,
        }
    }
}

impl<E: OrdinalEnum> PartialEq for EnumCodec<E> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<E: OrdinalEnum> Eq for EnumCodec<E> {}

impl<E: OrdinalEnum> core::fmt::Debug for EnumCodec<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EnumCodec")
            .field("target", &type_name::<E>())
            .field("cardinality", &self.variants.len())
            .field("width", &self.width)
            .finish()
    }
}

impl<E: OrdinalEnum> Codec for EnumCodec<E> {
    type Value = E;

    fn bytes_length(&self) -> Option<usize> {
        Some(self.width.bytes())
    }

    fn encode(&self, value: Option<&E>) -> Result<Option<Vec<u8>>> {
        Ok(value.map(|v| self.encode_variant(*v)))
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Decoded<E>> {
        match self.read_ordinal(bytes) {
            Decoded::Value(ordinal) => self.variant_at(ordinal).map(Decoded::Value),
            Decoded::Absent => Ok(Decoded::Absent),
            Decoded::Skipped => Ok(Decoded::Skipped),
        }
    }
}

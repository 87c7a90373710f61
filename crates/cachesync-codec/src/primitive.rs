//! 定长原语编解码器。
//!
//! 字节布局（与既有复制流量保持一致，不做统一）：
//!
//! ```text
//! bool   : 1 字节   true = 1, false = 0, 0xFF (-1) = 空值标记
//! i16    : 2 字节   大端
//! i32    : 4 字节   大端
//! i64    : 8 字节   小端
//! f64    : 8 字节   IEEE-754 位模式按 i64 处理，因此同样是小端
//! ```
//!
//! 所有实现满足：`encode(None) == None`，`decode(None) == Absent`，
//! 输入长度不等于声明长度时返回 `Skipped`。

use crate::codec::generic::{Codec, Decoded, fixed_window};
use crate::error::Result;

/// 布尔编解码器，1 字节。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoolCodec;

impl BoolCodec {
    /// 声明长度。
    pub const BYTES: usize = 1;
    /// 空值标记字节（有符号 -1）。
    pub const NULL_MARKER: u8 = 0xFF;

    /// 编码非空布尔值。
    pub fn to_bytes(value: bool) -> [u8; 1] {
        [u8::from(value)]
    }

    /// 解码单字节；空值标记返回 `None`，只有 `1` 视为真。
    pub fn from_bytes(bytes: [u8; 1]) -> Option<bool> {
        match bytes[0] {
            Self::NULL_MARKER => None,
            byte => Some(byte == 1),
        }
    }
}

impl Codec for BoolCodec {
    type Value = bool;

    fn bytes_length(&self) -> Option<usize> {
        Some(Self::BYTES)
    }

    fn encode(&self, value: Option<&bool>) -> Result<Option<Vec<u8>>> {
        Ok(value.map(|v| Self::to_bytes(*v).to_vec()))
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Decoded<bool>> {
        Ok(match fixed_window::<1>(bytes) {
            Decoded::Value(window) => match Self::from_bytes(window) {
                Some(value) => Decoded::Value(value),
                None => Decoded::Absent,
            },
            Decoded::Absent => Decoded::Absent,
            Decoded::Skipped => Decoded::Skipped,
        })
    }
}

/// 短整型编解码器，2 字节大端。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShortCodec;

impl ShortCodec {
    /// 声明长度。
    pub const BYTES: usize = 2;

    /// 编码。
    pub fn to_bytes(value: i16) -> [u8; 2] {
        value.to_be_bytes()
    }

    /// 解码。
    pub fn from_bytes(bytes: [u8; 2]) -> i16 {
        i16::from_be_bytes(bytes)
    }
}

impl Codec for ShortCodec {
    type Value = i16;

    fn bytes_length(&self) -> Option<usize> {
        Some(Self::BYTES)
    }

    fn encode(&self, value: Option<&i16>) -> Result<Option<Vec<u8>>> {
        Ok(value.map(|v| Self::to_bytes(*v).to_vec()))
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Decoded<i16>> {
        Ok(fixed_window::<2>(bytes).map(Self::from_bytes))
    }
}

/// 整型编解码器，4 字节大端。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntCodec;

impl IntCodec {
    /// 声明长度。
    pub const BYTES: usize = 4;

    /// 编码。
    pub fn to_bytes(value: i32) -> [u8; 4] {
        value.to_be_bytes()
    }

    /// 解码。
    pub fn from_bytes(bytes: [u8; 4]) -> i32 {
        i32::from_be_bytes(bytes)
    }
}

impl Codec for IntCodec {
    type Value = i32;

    fn bytes_length(&self) -> Option<usize> {
        Some(Self::BYTES)
    }

    fn encode(&self, value: Option<&i32>) -> Result<Option<Vec<u8>>> {
        Ok(value.map(|v| Self::to_bytes(*v).to_vec()))
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Decoded<i32>> {
        Ok(fixed_window::<4>(bytes).map(Self::from_bytes))
    }
}

/// 长整型编解码器，8 字节**小端**。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LongCodec;

impl LongCodec {
    /// 声明长度。
    pub const BYTES: usize = 8;

    /// 编码。
    pub fn to_bytes(value: i64) -> [u8; 8] {
        value.to_le_bytes()
    }

    /// 解码。
    pub fn from_bytes(bytes: [u8; 8]) -> i64 {
        i64::from_le_bytes(bytes)
    }
}

impl Codec for LongCodec {
    type Value = i64;

    fn bytes_length(&self) -> Option<usize> {
        Some(Self::BYTES)
    }

    fn encode(&self, value: Option<&i64>) -> Result<Option<Vec<u8>>> {
        Ok(value.map(|v| Self::to_bytes(*v).to_vec()))
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Decoded<i64>> {
        Ok(fixed_window::<8>(bytes).map(Self::from_bytes))
    }
}

/// 双精度编解码器：位模式按长整型委托给 [`LongCodec`]，继承其小端布局。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DoubleCodec;

impl DoubleCodec {
    /// 声明长度。
    pub const BYTES: usize = LongCodec::BYTES;

    /// 编码。
    pub fn to_bytes(value: f64) -> [u8; 8] {
        LongCodec::to_bytes(value.to_bits() as i64)
    }

    /// 解码。
    pub fn from_bytes(bytes: [u8; 8]) -> f64 {
        f64::from_bits(LongCodec::from_bytes(bytes) as u64)
    }
}

impl Codec for DoubleCodec {
    type Value = f64;

    fn bytes_length(&self) -> Option<usize> {
        Some(Self::BYTES)
    }

    fn encode(&self, value: Option<&f64>) -> Result<Option<Vec<u8>>> {
        Ok(value.map(|v| Self::to_bytes(*v).to_vec()))
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Decoded<f64>> {
        Ok(fixed_window::<8>(bytes).map(Self::from_bytes))
    }
}

use serde::{Deserialize, Serialize};

use crate::codec::generic::{Codec, Decoded, fixed_window, window_at};
use crate::error::Result;
use crate::primitive::LongCodec;

/// 分页参数：跳过 `offset` 条后取 `count` 条。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    /// 起始偏移。
    pub offset: i64,
    /// 条数。
    pub count: i64,
}

impl Limit {
    /// 构造分页参数。
    pub fn new(offset: i64, count: i64) -> Self {
        Self { offset, count }
    }
}

/// [`Limit`] 编解码器：`Long ‖ Long`，共 16 字节。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LimitCodec;

impl LimitCodec {
    /// 声明长度。
    pub const BYTES: usize = 2 * LongCodec::BYTES;
}

impl Codec for LimitCodec {
    type Value = Limit;

    fn bytes_length(&self) -> Option<usize> {
        Some(Self::BYTES)
    }

    fn encode(&self, value: Option<&Limit>) -> Result<Option<Vec<u8>>> {
        Ok(value.map(|limit| {
            let mut out = Vec::with_capacity(Self::BYTES);
            out.extend_from_slice(&LongCodec::to_bytes(limit.offset));
            out.extend_from_slice(&LongCodec::to_bytes(limit.count));
            out
        }))
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Decoded<Limit>> {
        Ok(fixed_window::<16>(bytes).map(|window| Limit {
            offset: LongCodec::from_bytes(window_at(&window, 0)),
            count: LongCodec::from_bytes(window_at(&window, LongCodec::BYTES)),
        }))
    }
}

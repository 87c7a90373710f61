//! 帧读写原语。
//!
//! ```text
//! 短名称   : [u8 len][ascii bytes]      len ≤ 255
//! 参数块   : [u8 len][payload]          len = 0 表示空参数
//! ```
//!
//! 写入端在追加前校验长度与字符集；读取端对每次读取做边界检查，越界时返回
//! [`CodecError::Truncated`] 并带上正在读取的字段名。

use bytes::{BufMut, Bytes, BytesMut};
use cachesync_codec::{CodecError, Result};

/// 单字节长度前缀允许的最大长度。
pub const MAX_BLOCK_LEN: usize = u8::MAX as usize;

/// 帧写入器。
#[derive(Debug, Default)]
pub struct FrameWriter {
    buf: BytesMut,
}

impl FrameWriter {
    /// 构造写入器。
    pub fn new() -> Self {
        Self::default()
    }

    /// 预留容量。
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// 写入单字节。
    pub fn put_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    /// 写入原始字节，不带长度前缀。
    pub fn put_slice(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// 写入长度前缀的 ASCII 名称。
    pub fn put_name(&mut self, field: &'static str, name: &str) -> Result<()> {
        if !name.is_ascii() {
            return Err(CodecError::NonAscii { field });
        }
        let len = u8::try_from(name.len()).map_err(|_| CodecError::NameTooLong {
            field,
            len: name.len(),
        })?;
        self.buf.put_u8(len);
        self.buf.put_slice(name.as_bytes());
        Ok(())
    }

    /// 写入第 `index` 个参数块；`None` 写为零长度块。
    ///
    /// 非空参数编码为零字节时返回 [`CodecError::EmptyArgument`]，超过 `limit` 时返回
    /// [`CodecError::ArgumentTooLarge`]。
    pub fn put_block(&mut self, index: usize, payload: Option<&[u8]>, limit: u8) -> Result<()> {
        let Some(payload) = payload else {
            self.buf.put_u8(0);
            return Ok(());
        };
        if payload.is_empty() {
            return Err(CodecError::EmptyArgument { index });
        }
        if payload.len() > usize::from(limit) {
            return Err(CodecError::ArgumentTooLarge {
                index,
                len: payload.len(),
                limit: usize::from(limit),
            });
        }
        self.buf.put_u8(payload.len() as u8);
        self.buf.put_slice(payload);
        Ok(())
    }

    /// 已写入的字节数。
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// 是否尚未写入任何字节。
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// 冻结为不可变帧。
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

/// 帧读取器：在借用的字节切片上前进的游标。
#[derive(Debug, Clone)]
pub struct FrameReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    /// 从帧首开始读取。
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// 剩余未读字节数。
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// 读取固定长度的字节。
    pub fn take(&mut self, field: &'static str, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(CodecError::Truncated {
                field,
                needed: len,
                remaining,
            });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// 读取单字节。
    pub fn read_u8(&mut self, field: &'static str) -> Result<u8> {
        Ok(self.take(field, 1)?[0])
    }

    /// 读取长度前缀的 ASCII 名称。
    pub fn read_name(&mut self, field: &'static str) -> Result<&'a str> {
        let len = usize::from(self.read_u8(field)?);
        let bytes = self.take(field, len)?;
        if !bytes.is_ascii() {
            return Err(CodecError::NonAscii { field });
        }
        core::str::from_utf8(bytes).map_err(|_| CodecError::NonAscii { field })
    }

    /// 读取参数块；零长度块返回 `None`。
    pub fn read_block(&mut self, field: &'static str) -> Result<Option<&'a [u8]>> {
        let len = usize::from(self.read_u8(field)?);
        if len == 0 {
            return Ok(None);
        }
        self.take(field, len).map(Some)
    }

    /// 确认帧已读完。
    pub fn finish(self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(CodecError::TrailingBytes { remaining }),
        }
    }
}

//! UTF-8 文本编解码器。

use crate::codec::generic::{Codec, Decoded};
use crate::error::{CodecError, Result};

/// 变长 UTF-8 文本编解码器。
///
/// 复合类型的名称、模式字段经由它编码。它不作为内置注册项：空字符串编码为零字节，
/// 与事件帧中“零长度块即空参数”的约定冲突，普通 `String` 参数因此走兜底编解码器。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StringCodec;

impl StringCodec {
    /// 解码非空字节，`field` 用于错误诊断。
    pub fn from_bytes(bytes: &[u8], field: &'static str) -> Result<String> {
        String::from_utf8(bytes.to_vec()).map_err(|source| CodecError::InvalidUtf8 { field, source })
    }
}

impl Codec for StringCodec {
    type Value = String;

    fn encode(&self, value: Option<&String>) -> Result<Option<Vec<u8>>> {
        Ok(value.map(|v| v.as_bytes().to_vec()))
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Decoded<String>> {
        match bytes {
            None => Ok(Decoded::Absent),
            Some(bytes) => Self::from_bytes(bytes, "string").map(Decoded::Value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_raw_utf8() {
        let value = "città".to_owned();
        let bytes = StringCodec.encode(Some(&value)).unwrap().unwrap();
        assert_eq!(bytes, "città".as_bytes());
        assert_eq!(
            StringCodec.decode(Some(bytes.as_slice())).unwrap(),
            Decoded::Value(value)
        );
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let err = StringCodec.decode(Some(&[0xC3, 0x28])).unwrap_err();
        assert_eq!(err.code(), crate::codes::CODEC_INVALID_UTF8);
    }
}

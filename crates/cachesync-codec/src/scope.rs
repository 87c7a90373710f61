//! 发布作用域内的值缓存。
//!
//! 一次逻辑发布（例如一条写命令被复制到多个对端）中，同一个值往往经过多个序列化槽位。
//! [`PublishScope`] 以值的身份为键记住编码结果，以字节的身份为键记住解码结果，避免重复计算。
//!
//! # 契约说明（What）
//! - 作用域由调用方创建、清理和丢弃，边界完全由调用方决定；
//! - 单线程使用（内部为 `RefCell`，类型本身不是 `Sync`）；
//! - 缓存项持有键所指向的 `Arc` 或 `Bytes` 句柄，作用域存活期间地址不会被复用，
//!   因此“同地址”即“同一个值”。

use core::any::{Any, TypeId, type_name};
use core::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;

use crate::codec::{Codec, Decoded, DynCodec, DynValue};
use crate::error::{CodecError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct ValueKey {
    addr: usize,
    value_type: TypeId,
    codec: TypeId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct BytesKey {
    addr: usize,
    len: usize,
    codec: TypeId,
}

struct EncodedEntry {
    _pin: Arc<DynValue>,
    bytes: Option<Vec<u8>>,
}

struct DecodedEntry {
    _pin: Bytes,
    value: Decoded<Arc<DynValue>>,
}

/// 一次逻辑发布的编解码缓存。
#[derive(Default)]
pub struct PublishScope {
    encoded: RefCell<HashMap<ValueKey, EncodedEntry>>,
    decoded: RefCell<HashMap<BytesKey, DecodedEntry>>,
}

impl PublishScope {
    /// 创建空作用域。
    pub fn new() -> Self {
        Self::default()
    }

    /// 编码 `value`；同一个 `Arc` 在作用域内只会被编码一次。
    pub fn encode<C: Codec>(&self, codec: &C, value: &Arc<C::Value>) -> Result<Option<Vec<u8>>> {
        let key = ValueKey {
            addr: Arc::as_ptr(value) as *const () as usize,
            value_type: TypeId::of::<C::Value>(),
            codec: TypeId::of::<C>(),
        };
        let pin: Arc<DynValue> = value.clone();
        self.encode_cached(key, pin, || codec.encode(Some(&**value)))
    }

    /// 对象层版本的 [`encode`](Self::encode)。
    pub fn encode_dyn(&self, codec: &dyn DynCodec, value: &Arc<DynValue>) -> Result<Option<Vec<u8>>> {
        let erased: &dyn Any = &**value;
        let key = ValueKey {
            addr: Arc::as_ptr(value) as *const () as usize,
            value_type: erased.type_id(),
            codec: codec.codec_id(),
        };
        self.encode_cached(key, Arc::clone(value), || codec.encode_dyn(Some(&**value)))
    }

    /// 解码 `bytes`；同一个 `Bytes` 视图在作用域内只会被解码一次。
    pub fn decode<C: Codec>(&self, codec: &C, bytes: &Bytes) -> Result<Decoded<Arc<C::Value>>> {
        let key = BytesKey {
            addr: bytes.as_ptr() as usize,
            len: bytes.len(),
            codec: TypeId::of::<C>(),
        };
        let decoded = self.decode_cached(key, bytes, || {
            Ok(codec
                .decode(Some(&bytes[..]))?
                .map(|value| Arc::new(value) as Arc<DynValue>))
        })?;
        match decoded {
            Decoded::Value(value) => value
                .downcast::<C::Value>()
                .map(Decoded::Value)
                .map_err(|_| CodecError::TypeMismatch {
                    expected: type_name::<C::Value>(),
                }),
            Decoded::Absent => Ok(Decoded::Absent),
            Decoded::Skipped => Ok(Decoded::Skipped),
        }
    }

    /// 对象层版本的 [`decode`](Self::decode)。
    pub fn decode_dyn(&self, codec: &dyn DynCodec, bytes: &Bytes) -> Result<Decoded<Arc<DynValue>>> {
        let key = BytesKey {
            addr: bytes.as_ptr() as usize,
            len: bytes.len(),
            codec: codec.codec_id(),
        };
        self.decode_cached(key, bytes, || {
            Ok(codec.decode_dyn(Some(&bytes[..]))?.map(Arc::from))
        })
    }

    /// 清空缓存并释放持有的句柄。
    pub fn clear(&self) {
        self.encoded.borrow_mut().clear();
        self.decoded.borrow_mut().clear();
    }

    /// 缓存项数量（编码与解码之和）。
    pub fn len(&self) -> usize {
        self.encoded.borrow().len() + self.decoded.borrow().len()
    }

    /// 是否为空。
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // 计算期间不持有借用：编解码器可能再次进入同一作用域。
    fn encode_cached(
        &self,
        key: ValueKey,
        pin: Arc<DynValue>,
        compute: impl FnOnce() -> Result<Option<Vec<u8>>>,
    ) -> Result<Option<Vec<u8>>> {
        if let Some(entry) = self.encoded.borrow().get(&key) {
            return Ok(entry.bytes.clone());
        }
        let bytes = compute()?;
        self.encoded.borrow_mut().insert(
            key,
            EncodedEntry {
                _pin: pin,
                bytes: bytes.clone(),
            },
        );
        Ok(bytes)
    }

    fn decode_cached(
        &self,
        key: BytesKey,
        bytes: &Bytes,
        compute: impl FnOnce() -> Result<Decoded<Arc<DynValue>>>,
    ) -> Result<Decoded<Arc<DynValue>>> {
        if let Some(entry) = self.decoded.borrow().get(&key) {
            return Ok(entry.value.clone());
        }
        let value = compute()?;
        self.decoded.borrow_mut().insert(
            key,
            DecodedEntry {
                _pin: bytes.clone(),
                value: value.clone(),
            },
        );
        Ok(value)
    }
}

impl core::fmt::Debug for PublishScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PublishScope")
            .field("encoded", &self.encoded.borrow().len())
            .field("decoded", &self.decoded.borrow().len())
            .finish()
    }
}

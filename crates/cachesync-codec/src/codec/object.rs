use core::any::{Any, TypeId, type_name};

use serde::{Serialize, de::DeserializeOwned};

use crate::codec::generic::{Codec, Decoded};
use crate::codec::token::TypeToken;
use crate::error::{CodecError, Result};

/// 对象层传递的类型擦除值。
pub type DynValue = dyn Any + Send + Sync;

/// `DynCodec` 为注册中心提供对象安全的编解码接口。
///
/// # 设计初衷（Why）
/// - 注册中心需要在同一张表里存放不同目标类型的编解码器；
/// - 命令事件的参数在编译期类型未知，只能以 [`DynValue`] 形式流经编解码层。
///
/// # 契约说明（What）
/// - `encode_dyn` 对无法下转型的值返回 [`CodecError::TypeMismatch`]；
/// - `decode_dyn` 的结果需由调用方按 [`target`](DynCodec::target) 下转型；
/// - `codec_id` 标识实现类型本身，注册中心据此判断“是否替换成了不同的编解码器”。
pub trait DynCodec: Send + Sync + 'static {
    /// 目标类型标识。
    fn target(&self) -> TypeToken;

    /// 实现类型名，用于日志。
    fn codec_name(&self) -> &'static str;

    /// 实现类型的 `TypeId`。
    fn codec_id(&self) -> TypeId;

    /// 声明的定长字节数。
    fn bytes_length(&self) -> Option<usize>;

    /// 对象安全的编码入口。
    fn encode_dyn(&self, value: Option<&DynValue>) -> Result<Option<Vec<u8>>>;

    /// 对象安全的解码入口。
    fn decode_dyn(&self, bytes: Option<&[u8]>) -> Result<Decoded<Box<DynValue>>>;
}

impl dyn DynCodec {
    /// 两个编解码器是否等价：实现类型相同且目标类型相同。
    ///
    /// 枚举编解码器 `EnumCodec<E>` 的实现类型随 `E` 变化，因此“同一枚举类型即相等”自然成立。
    pub fn same_as(&self, other: &dyn DynCodec) -> bool {
        self.codec_id() == other.codec_id() && self.target() == other.target()
    }
}

/// `TypedCodecAdapter` 将泛型 [`Codec`] 装箱为对象安全的 [`DynCodec`]。
///
/// - `encode_dyn` 使用 `downcast_ref` 还原具体类型；
/// - `decode_dyn` 将泛型结果重新装箱；
/// - 每次调用多一次下转型检查，热路径可直接使用泛型层。
pub struct TypedCodecAdapter<C>
where
    C: Codec,
{
    inner: C,
}

impl<C> TypedCodecAdapter<C>
where
    C: Codec,
{
    /// 使用给定的泛型实现构造适配器。
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// 借用内部泛型实现。
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// 取回内部泛型实现。
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C> DynCodec for TypedCodecAdapter<C>
where
    C: Codec,
    C::Value: Serialize + DeserializeOwned,
{
    fn target(&self) -> TypeToken {
        TypeToken::of::<C::Value>()
    }

    fn codec_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn codec_id(&self) -> TypeId {
        TypeId::of::<C>()
    }

    fn bytes_length(&self) -> Option<usize> {
        self.inner.bytes_length()
    }

    fn encode_dyn(&self, value: Option<&DynValue>) -> Result<Option<Vec<u8>>> {
        match value {
            None => self.inner.encode(None),
            Some(value) => match value.downcast_ref::<C::Value>() {
                Some(typed) => self.inner.encode(Some(typed)),
                None => Err(CodecError::TypeMismatch {
                    expected: type_name::<C::Value>(),
                }),
            },
        }
    }

    fn decode_dyn(&self, bytes: Option<&[u8]>) -> Result<Decoded<Box<DynValue>>> {
        Ok(self
            .inner
            .decode(bytes)?
            .map(|value| Box::new(value) as Box<DynValue>))
    }
}

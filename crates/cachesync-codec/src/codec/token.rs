use core::any::{TypeId, type_name};
use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};

use crate::codec::object::{DynCodec, TypedCodecAdapter};
use crate::fallback::GenericCodec;

/// 编解码目标类型的标识。
///
/// # 契约说明（What）
/// - 相等性与哈希只取决于 `TypeId`；`name` 仅用于日志与诊断；
/// - 令牌同时携带该类型的兜底编解码器构造函数，注册中心未命中时据此生成
///   [`GenericCodec`]，因此可注册的目标类型都需实现 `serde` 的序列化/反序列化。
#[derive(Clone, Copy)]
pub struct TypeToken {
    id: TypeId,
    name: &'static str,
    fallback: fn() -> Arc<dyn DynCodec>,
}

impl TypeToken {
    /// 获取类型 `T` 的令牌。
    pub fn of<T>() -> Self
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            fallback: fallback_for::<T>,
        }
    }

    /// 目标类型的 `TypeId`。
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// 目标类型名。
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 构造该类型的通用兜底编解码器。
    pub fn build_fallback(&self) -> Arc<dyn DynCodec> {
        (self.fallback)()
    }

    /// 令牌是否指向类型 `T`。
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

fn fallback_for<T>() -> Arc<dyn DynCodec>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    Arc::new(TypedCodecAdapter::new(GenericCodec::<T>::new()))
}

impl PartialEq for TypeToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeToken {}

impl Hash for TypeToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeToken").field(&self.name).finish()
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

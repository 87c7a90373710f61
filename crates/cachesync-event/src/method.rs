//! 方法身份：描述符、注册表契约与显式方法表。

use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use cachesync_codec::{CodecError, Result, TypeToken};
use serde::{Serialize, de::DeserializeOwned};

/// 取名称的最后一段（按 `::` 与 `.` 切分）。
///
/// ```
/// use cachesync_event::simple_name;
///
/// assert_eq!(simple_name("io.cache.Commands"), "Commands");
/// assert_eq!(simple_name("cache::Commands"), "Commands");
/// assert_eq!(simple_name("Commands"), "Commands");
/// ```
pub fn simple_name(name: &str) -> &str {
    let tail = name.rsplit("::").next().unwrap_or(name);
    tail.rsplit('.').next().unwrap_or(tail)
}

/// 单个参数的声明：线上写出的类型名与用于查找编解码器的类型令牌。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDescriptor {
    type_name: Arc<str>,
    token: TypeToken,
}

impl ParamDescriptor {
    /// 以显式令牌构造。
    pub fn new(type_name: impl Into<Arc<str>>, token: TypeToken) -> Self {
        Self {
            type_name: type_name.into(),
            token,
        }
    }

    /// 以类型 `T` 构造。
    pub fn of<T>(type_name: impl Into<Arc<str>>) -> Self
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        Self::new(type_name, TypeToken::of::<T>())
    }

    /// 线上类型名。
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// 类型令牌。
    pub fn token(&self) -> TypeToken {
        self.token
    }
}

/// 被复制的方法的描述符。
///
/// # 契约说明（What）
/// - `interface` 可以是完整路径，线上只写出其最后一段（见 [`simple_name`]）；
/// - 参数按声明顺序排列，事件的参数个数必须与之相等。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDescriptor {
    interface: Arc<str>,
    name: Arc<str>,
    params: Vec<ParamDescriptor>,
}

impl MethodDescriptor {
    /// 构造无参数的描述符，参数通过 [`param`](Self::param) 追加。
    pub fn new(interface: impl Into<Arc<str>>, name: impl Into<Arc<str>>) -> Self {
        Self {
            interface: interface.into(),
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// 追加一个类型为 `T`、线上类型名为 `type_name` 的参数。
    pub fn param<T>(self, type_name: impl Into<Arc<str>>) -> Self
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.with_param(ParamDescriptor::of::<T>(type_name))
    }

    /// 追加一个参数描述。
    pub fn with_param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    /// 接口全名。
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// 接口简名。
    pub fn simple_interface(&self) -> &str {
        simple_name(&self.interface)
    }

    /// 方法名。
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 参数声明。
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    /// 参数类型名，按声明顺序。
    pub fn param_type_names(&self) -> Vec<&str> {
        self.params.iter().map(ParamDescriptor::type_name).collect()
    }

    /// 可读签名，例如 `Commands.set(String, String)`。
    pub fn signature(&self) -> String {
        format!(
            "{}.{}({})",
            self.simple_interface(),
            self.name,
            self.param_type_names().join(", ")
        )
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

/// 方法注册表：消费端据此把线上身份解析回方法描述符。
///
/// 由外部提供（例如从客户端接口定义生成）。[`MethodTable`] 是一个显式构造的实现。
pub trait MethodRegistry: Send + Sync {
    /// 按接口简名、方法名与参数类型名解析。
    fn resolve_by_signature(
        &self,
        interface: &str,
        method: &str,
        param_types: &[&str],
    ) -> Option<Arc<MethodDescriptor>>;

    /// 按序号解析。
    fn resolve_by_index(&self, index: i16) -> Option<Arc<MethodDescriptor>>;

    /// 方法的序号。
    fn index_of(&self, method: &MethodDescriptor) -> Option<i16>;
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SignatureKey {
    interface: String,
    method: String,
    params: Vec<String>,
}

impl SignatureKey {
    fn new(interface: &str, method: &str, params: &[&str]) -> Self {
        Self {
            interface: simple_name(interface).to_owned(),
            method: method.to_owned(),
            params: params.iter().map(|p| (*p).to_owned()).collect(),
        }
    }

    fn of(method: &MethodDescriptor) -> Self {
        Self::new(method.interface(), method.name(), &method.param_type_names())
    }
}

/// 显式方法表，序号按插入顺序从 0 开始分配。
///
/// # 契约说明（What）
/// - 生产端与消费端必须以相同顺序插入相同的方法，V1 变体才能正确解析；
/// - 以线上签名（接口简名、方法名、参数类型名）去重：插入与已登记描述符完全相同的方法返回已有序号；
///   签名相同但描述符不同（完整接口路径或参数类型令牌不同）时返回 [`CodecError::Config`]，
///   否则两个方法会共用一个序号，对端将以错误的参数编解码器解码；
/// - 最多容纳 `i16::MAX + 1` 个方法。
#[derive(Clone, Debug, Default)]
pub struct MethodTable {
    methods: Vec<Arc<MethodDescriptor>>,
    by_signature: HashMap<SignatureKey, i16>,
}

impl MethodTable {
    /// 构造空表。
    pub fn new() -> Self {
        Self::default()
    }

    /// 按顺序插入一组方法。
    pub fn from_methods(methods: impl IntoIterator<Item = MethodDescriptor>) -> Result<Self> {
        let mut table = Self::new();
        for method in methods {
            table.insert(method)?;
        }
        Ok(table)
    }

    /// 插入方法并返回其序号。
    pub fn insert(&mut self, method: MethodDescriptor) -> Result<i16> {
        let key = SignatureKey::of(&method);
        if let Some(&index) = self.by_signature.get(&key) {
            return match self.get(index) {
                Some(existing) if **existing == method => Ok(index),
                _ => Err(CodecError::Config {
                    detail: format!(
                        "{} collides with an already indexed method of the same wire signature",
                        method.signature()
                    ),
                }),
            };
        }
        let index = i16::try_from(self.methods.len()).map_err(|_| CodecError::Config {
            detail: format!("method table is full, cannot index {}", method.signature()),
        })?;
        self.methods.push(Arc::new(method));
        self.by_signature.insert(key, index);
        Ok(index)
    }

    /// 按序号取方法。
    pub fn get(&self, index: i16) -> Option<&Arc<MethodDescriptor>> {
        usize::try_from(index).ok().and_then(|i| self.methods.get(i))
    }

    /// 方法数量。
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// 是否为空。
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl MethodRegistry for MethodTable {
    fn resolve_by_signature(
        &self,
        interface: &str,
        method: &str,
        param_types: &[&str],
    ) -> Option<Arc<MethodDescriptor>> {
        let index = self
            .by_signature
            .get(&SignatureKey::new(interface, method, param_types))?;
        self.get(*index).cloned()
    }

    fn resolve_by_index(&self, index: i16) -> Option<Arc<MethodDescriptor>> {
        self.get(index).cloned()
    }

    fn index_of(&self, method: &MethodDescriptor) -> Option<i16> {
        let index = *self.by_signature.get(&SignatureKey::of(method))?;
        (**self.get(index)? == *method).then_some(index)
    }
}

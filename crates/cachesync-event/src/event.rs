//! 命令事件：一次被复制的写方法调用。

use core::any::Any;
use core::fmt;
use std::sync::Arc;

use cachesync_codec::DynValue;

use crate::method::MethodDescriptor;

/// 单个参数：`None` 为空参数。
pub type Arg = Option<Arc<DynValue>>;

/// 一次写方法调用。
///
/// # 契约说明（What）
/// - 参数按方法声明顺序排列，值的具体类型必须与对应参数的类型令牌一致，否则编码时报告类型不符；
/// - `version` 为事件自带的线上版本标签，缺省时由编解码器配置决定。
#[derive(Clone)]
pub struct CommandEvent {
    application: Arc<str>,
    method: Arc<MethodDescriptor>,
    args: Vec<Arg>,
    version: Option<u8>,
}

impl CommandEvent {
    /// 直接构造。
    pub fn new(
        application: impl Into<Arc<str>>,
        method: Arc<MethodDescriptor>,
        args: Vec<Arg>,
    ) -> Self {
        Self {
            application: application.into(),
            method,
            args,
            version: None,
        }
    }

    /// 以构建器逐个追加参数。
    pub fn builder(
        application: impl Into<Arc<str>>,
        method: Arc<MethodDescriptor>,
    ) -> CommandEventBuilder {
        CommandEventBuilder {
            event: Self::new(application, method, Vec::new()),
        }
    }

    /// 指定线上版本标签。
    pub fn with_version(mut self, version: u8) -> Self {
        self.version = Some(version);
        self
    }

    /// 应用名。
    pub fn application(&self) -> &str {
        &self.application
    }

    /// 方法描述符。
    pub fn method(&self) -> &Arc<MethodDescriptor> {
        &self.method
    }

    /// 全部参数。
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// 事件自带的版本标签。
    pub fn version(&self) -> Option<u8> {
        self.version
    }

    /// 第 `index` 个参数按类型 `T` 借用；越界、空参数或类型不符均返回 `None`。
    pub fn arg<T: Any>(&self, index: usize) -> Option<&T> {
        self.args.get(index)?.as_deref()?.downcast_ref::<T>()
    }

    /// 第 `index` 个参数是否为空参数。
    pub fn is_null(&self, index: usize) -> bool {
        matches!(self.args.get(index), Some(None))
    }
}

impl fmt::Debug for CommandEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<&str> = self
            .args
            .iter()
            .map(|arg| if arg.is_some() { "<value>" } else { "null" })
            .collect();
        f.debug_struct("CommandEvent")
            .field("application", &self.application)
            .field("method", &self.method.signature())
            .field("args", &args)
            .field("version", &self.version)
            .finish()
    }
}

/// [`CommandEvent`] 构建器。
#[derive(Debug)]
pub struct CommandEventBuilder {
    event: CommandEvent,
}

impl CommandEventBuilder {
    /// 追加一个非空参数。
    pub fn arg<T: Any + Send + Sync>(self, value: T) -> Self {
        self.arg_shared(Arc::new(value))
    }

    /// 追加一个已共享的参数；同一个 `Arc` 在发布作用域内只编码一次。
    pub fn arg_shared(mut self, value: Arc<DynValue>) -> Self {
        self.event.args.push(Some(value));
        self
    }

    /// 追加一个空参数。
    pub fn arg_none(mut self) -> Self {
        self.event.args.push(None);
        self
    }

    /// 指定线上版本标签。
    pub fn version(mut self, version: u8) -> Self {
        self.event.version = Some(version);
        self
    }

    /// 完成构建。
    pub fn build(self) -> CommandEvent {
        self.event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors() {
        let method = Arc::new(
            MethodDescriptor::new("Commands", "expire")
                .param::<String>("String")
                .param::<i64>("long"),
        );
        let event = CommandEvent::builder("app1", method)
            .arg("k".to_owned())
            .arg_none()
            .version(1)
            .build();
        assert_eq!(event.arg::<String>(0).map(String::as_str), Some("k"));
        assert_eq!(event.arg::<i64>(0), None);
        assert!(event.is_null(1));
        assert!(!event.is_null(2));
        assert_eq!(event.version(), Some(1));
        assert!(format!("{event:?}").contains("Commands.expire(String, long)"));
    }
}

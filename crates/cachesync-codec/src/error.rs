//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 编解码层没有“跳过”之外的静默失败：序号越界、兜底编码失败、帧截断等都以 [`CodecError`]
//!   向调用方显式传播；
//! - 每个变体映射到 `<领域>.<语义>` 形式的稳定错误码（见 [`codes`]），便于日志与告警聚合。
//!
//! ## 设计要求（What）
//! - “该编解码器不适用”不是错误，由 [`crate::Decoded::Skipped`] 表达；
//! - 变体携带足够的上下文（目标类型名、字段名、长度），调用方无需再拼接描述。

use std::string::FromUtf8Error;

use thiserror::Error;

/// 编解码层统一结果类型。
pub type Result<T, E = CodecError> = core::result::Result<T, E>;

/// 稳定错误码命名空间。
///
/// 错误码遵循 `<领域>.<语义>` 命名约定；新增变体时需同步在此登记。
pub mod codes {
    /// 枚举序号越界，说明字节损坏或两端枚举定义不一致。
    pub const CODEC_CORRUPT_ORDINAL: &str = "codec.corrupt_ordinal";
    /// 对象层收到与目标类型不一致的值。
    pub const CODEC_TYPE_MISMATCH: &str = "codec.type_mismatch";
    /// 通用兜底编解码器失败。
    pub const CODEC_FALLBACK: &str = "codec.fallback";
    /// 文本不是合法 UTF-8。
    pub const CODEC_INVALID_UTF8: &str = "codec.invalid_utf8";
    /// 编解码器不适用于自身负责的字节。
    pub const CODEC_NOT_APPLICABLE: &str = "codec.not_applicable";
    /// 未识别的帧版本。
    pub const FRAME_UNSUPPORTED_VERSION: &str = "frame.unsupported_version";
    /// 帧在读取字段时提前结束。
    pub const FRAME_TRUNCATED: &str = "frame.truncated";
    /// 帧末尾存在未消费的字节。
    pub const FRAME_TRAILING_BYTES: &str = "frame.trailing_bytes";
    /// 单个参数编码超出长度前缀上限。
    pub const FRAME_ARGUMENT_TOO_LARGE: &str = "frame.argument_too_large";
    /// 非空参数编码为零字节，与空参数标记冲突。
    pub const FRAME_EMPTY_ARGUMENT: &str = "frame.empty_argument";
    /// 参数个数与方法签名不符。
    pub const FRAME_ARGUMENT_COUNT: &str = "frame.argument_count";
    /// 方法参数个数超过单字节计数上限。
    pub const FRAME_TOO_MANY_PARAMETERS: &str = "frame.too_many_parameters";
    /// 名称超过单字节长度前缀上限。
    pub const FRAME_NAME_TOO_LONG: &str = "frame.name_too_long";
    /// 名称包含非 ASCII 字符。
    pub const FRAME_NON_ASCII: &str = "frame.non_ascii";
    /// 方法注册表无法解析方法。
    pub const METHOD_UNRESOLVED: &str = "method.unresolved";
    /// 方法在注册表中没有序号。
    pub const METHOD_UNINDEXED: &str = "method.unindexed";
    /// 配置非法。
    pub const CONFIG_INVALID: &str = "config.invalid";
}

/// 编解码层错误域。
///
/// 所有变体满足 `Send + Sync + 'static`，可跨线程传播；`code()` 返回稳定错误码。
#[derive(Debug, Error)]
pub enum CodecError {
    /// 解码出的枚举序号超出变体列表范围（含负数）。属于致命错误，不会被降级为空值。
    #[error("ordinal {ordinal} is out of range for enum `{target}` with {cardinality} variants")]
    CorruptOrdinal {
        /// 目标枚举类型名。
        target: &'static str,
        /// 读到的原始序号。
        ordinal: i64,
        /// 变体数量。
        cardinality: usize,
    },

    /// 对象层收到的值无法下转型为编解码器的目标类型。
    #[error("codec for `{expected}` received a value of a different type")]
    TypeMismatch {
        /// 期望的目标类型名。
        expected: &'static str,
    },

    /// 通用兜底编解码器无法处理该值；没有更后备的路径，因此直接上抛。
    #[error("generic codec failed to {phase} `{target}`: {source}")]
    Fallback {
        /// 目标类型名。
        target: &'static str,
        /// `encode` 或 `decode`。
        phase: &'static str,
        /// `serde_json` 原始错误。
        #[source]
        source: serde_json::Error,
    },

    /// 文本字段不是合法 UTF-8。
    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 {
        /// 出错的字段。
        field: &'static str,
        /// 原始错误。
        #[source]
        source: FromUtf8Error,
    },

    /// 编解码器对一段本应由它负责的字节返回了 `Skipped`。
    #[error("codec `{codec}` does not apply to the bytes of {field}")]
    CodecNotApplicable {
        /// 编解码器类型名。
        codec: &'static str,
        /// 字段描述，例如 `argument #1` 或复合类型标签。
        field: String,
    },

    /// 帧版本字节不对应任何已知变体，且策略为严格拒绝。
    #[error("unsupported wire version {version}")]
    UnsupportedVersion {
        /// 读到的版本字节。
        version: u8,
    },

    /// 帧在读取某字段时剩余字节不足。
    #[error("frame truncated while reading {field}: need {needed} bytes, {remaining} remaining")]
    Truncated {
        /// 正在读取的字段。
        field: &'static str,
        /// 需要的字节数。
        needed: usize,
        /// 实际剩余字节数。
        remaining: usize,
    },

    /// 所有参数读取完毕后帧内仍有剩余字节。
    #[error("frame has {remaining} unread trailing bytes")]
    TrailingBytes {
        /// 剩余字节数。
        remaining: usize,
    },

    /// 参数编码长度超过单字节长度前缀允许的上限。
    #[error("argument #{index} encodes to {len} bytes, exceeding the {limit}-byte block limit")]
    ArgumentTooLarge {
        /// 参数下标（从 0 开始）。
        index: usize,
        /// 实际编码长度。
        len: usize,
        /// 当前上限。
        limit: usize,
    },

    /// 非空参数编码为零字节；零长度块保留给空参数。
    #[error("argument #{index} is present but encodes to zero bytes")]
    EmptyArgument {
        /// 参数下标。
        index: usize,
    },

    /// 事件提供的参数个数与方法签名声明的不一致。
    #[error("method `{method}` declares {expected} parameters but {actual} arguments were supplied")]
    ArgumentCountMismatch {
        /// 方法签名。
        method: String,
        /// 声明的参数个数。
        expected: usize,
        /// 实际参数个数。
        actual: usize,
    },

    /// 方法声明的参数超过 255 个，无法写入名称式元数据的单字节参数计数。
    #[error("method `{method}` declares {count} parameters, exceeding the 255-parameter limit")]
    TooManyParameters {
        /// 方法签名。
        method: String,
        /// 声明的参数个数。
        count: usize,
    },

    /// 名称超过 255 字节，无法写入单字节长度前缀。
    #[error("{field} is {len} bytes long, exceeding the 255-byte prefix limit")]
    NameTooLong {
        /// 字段名。
        field: &'static str,
        /// 实际长度。
        len: usize,
    },

    /// 名称包含非 ASCII 字符。
    #[error("{field} contains non-ASCII characters")]
    NonAscii {
        /// 字段名。
        field: &'static str,
    },

    /// 方法注册表无法按给定身份解析方法。
    #[error("no method registered for {signature}")]
    UnresolvedMethod {
        /// 可读的方法身份（签名或序号）。
        signature: String,
    },

    /// 方法没有分配序号，无法以 V1 变体编码。
    #[error("method `{method}` has no index in the method registry")]
    UnindexedMethod {
        /// 方法签名。
        method: String,
    },

    /// 配置文档无法解析或取值非法。
    #[error("invalid codec configuration: {detail}")]
    Config {
        /// 诊断信息。
        detail: String,
    },
}

impl CodecError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::CorruptOrdinal { .. } => codes::CODEC_CORRUPT_ORDINAL,
            CodecError::TypeMismatch { .. } => codes::CODEC_TYPE_MISMATCH,
            CodecError::Fallback { .. } => codes::CODEC_FALLBACK,
            CodecError::InvalidUtf8 { .. } => codes::CODEC_INVALID_UTF8,
            CodecError::CodecNotApplicable { .. } => codes::CODEC_NOT_APPLICABLE,
            CodecError::UnsupportedVersion { .. } => codes::FRAME_UNSUPPORTED_VERSION,
            CodecError::Truncated { .. } => codes::FRAME_TRUNCATED,
            CodecError::TrailingBytes { .. } => codes::FRAME_TRAILING_BYTES,
            CodecError::ArgumentTooLarge { .. } => codes::FRAME_ARGUMENT_TOO_LARGE,
            CodecError::EmptyArgument { .. } => codes::FRAME_EMPTY_ARGUMENT,
            CodecError::ArgumentCountMismatch { .. } => codes::FRAME_ARGUMENT_COUNT,
            CodecError::TooManyParameters { .. } => codes::FRAME_TOO_MANY_PARAMETERS,
            CodecError::NameTooLong { .. } => codes::FRAME_NAME_TOO_LONG,
            CodecError::NonAscii { .. } => codes::FRAME_NON_ASCII,
            CodecError::UnresolvedMethod { .. } => codes::METHOD_UNRESOLVED,
            CodecError::UnindexedMethod { .. } => codes::METHOD_UNINDEXED,
            CodecError::Config { .. } => codes::CONFIG_INVALID,
        }
    }

    /// 是否为不可恢复的数据损坏类错误（序号越界、帧截断、尾随字节）。
    ///
    /// 这类错误说明生产端与消费端的字节或定义已经失配，重试同一帧没有意义。
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            CodecError::CorruptOrdinal { .. }
                | CodecError::Truncated { .. }
                | CodecError::TrailingBytes { .. }
        )
    }

    pub(crate) fn not_applicable<C: ?Sized>(field: impl Into<String>) -> Self {
        CodecError::CodecNotApplicable {
            codec: core::any::type_name::<C>(),
            field: field.into(),
        }
    }
}

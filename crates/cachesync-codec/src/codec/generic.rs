use crate::error::Result;

/// 单次解码的三态结果。
///
/// # 契约说明（What）
/// - `Value`：成功解析出对象；
/// - `Absent`：输入本身表示空值（例如 `None` 输入、布尔空值标记）；
/// - `Skipped`：该编解码器不适用于这段输入（典型如定长编解码器收到长度不符的字节），
///   调用方应尝试其他路径，而不是把它当成空值。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded<T> {
    /// 成功解析出的对象。
    Value(T),
    /// 合法的空值。
    Absent,
    /// 编解码器不适用于输入。
    Skipped,
}

impl<T> Decoded<T> {
    /// 对 `Value` 中的对象做映射，其余两态原样保留。
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        match self {
            Decoded::Value(value) => Decoded::Value(f(value)),
            Decoded::Absent => Decoded::Absent,
            Decoded::Skipped => Decoded::Skipped,
        }
    }

    /// `Value` 转为 `Some`，`Absent`/`Skipped` 均为 `None`。
    pub fn value(self) -> Option<T> {
        match self {
            Decoded::Value(value) => Some(value),
            _ => None,
        }
    }

    /// 借用形式的 [`Decoded`]。
    pub fn as_ref(&self) -> Decoded<&T> {
        match self {
            Decoded::Value(value) => Decoded::Value(value),
            Decoded::Absent => Decoded::Absent,
            Decoded::Skipped => Decoded::Skipped,
        }
    }

    /// 是否为 `Skipped`。
    pub fn is_skipped(&self) -> bool {
        matches!(self, Decoded::Skipped)
    }

    /// 是否为 `Absent`。
    pub fn is_absent(&self) -> bool {
        matches!(self, Decoded::Absent)
    }
}

/// `Codec` 是泛型层的编解码契约：一个目标类型、一对编码/解码函数、可选的定长声明。
///
/// # 行为逻辑（How）
/// 1. `encode(None)` 必须返回 `Ok(None)`；`encode(Some(v))` 返回该值的字节；
/// 2. `decode(None)` 必须返回 `Decoded::Absent`；
/// 3. 声明了 [`bytes_length`](Codec::bytes_length) 的实现，对任何 `Some` 输入都恰好产出该长度，
///    且对长度不符的输入返回 `Decoded::Skipped` 而不是错误。
///
/// # 契约说明（What）
/// - **关联类型**：`Value` 需满足 `Send + Sync + 'static`，以便经对象层跨线程传递；
/// - **状态**：实现构造后不可变，可在线程间共享；
/// - **错误**：只有真正的失败（序号越界、兜底编码失败、非法 UTF-8）才返回 `Err`。
pub trait Codec: Send + Sync + 'static {
    /// 编解码的目标类型。
    type Value: Send + Sync + 'static;

    /// 声明的定长字节数；`None` 表示变长。
    fn bytes_length(&self) -> Option<usize> {
        None
    }

    /// 编码一个可空的值。
    fn encode(&self, value: Option<&Self::Value>) -> Result<Option<Vec<u8>>>;

    /// 解码一段可空的字节。
    fn decode(&self, bytes: Option<&[u8]>) -> Result<Decoded<Self::Value>>;
}

/// 将输入收窄为定长数组；`None` 为空值，长度不符为跳过。
pub(crate) fn fixed_window<const N: usize>(bytes: Option<&[u8]>) -> Decoded<[u8; N]> {
    match bytes {
        None => Decoded::Absent,
        Some(bytes) => match <[u8; N]>::try_from(bytes) {
            Ok(window) => Decoded::Value(window),
            Err(_) => Decoded::Skipped,
        },
    }
}

/// 从已校验长度的缓冲中复制 `N` 字节窗口。调用方保证 `offset + N <= buf.len()`。
pub(crate) fn window_at<const N: usize>(buf: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[offset..offset + N]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_window_distinguishes_absent_and_skipped() {
        assert_eq!(fixed_window::<2>(None), Decoded::Absent);
        assert_eq!(fixed_window::<2>(Some(&[1])), Decoded::Skipped);
        assert_eq!(fixed_window::<2>(Some(&[1, 2])), Decoded::Value([1, 2]));
    }

    #[test]
    fn decoded_map_keeps_non_values() {
        assert_eq!(Decoded::Value(2).map(|v| v * 3), Decoded::Value(6));
        assert_eq!(Decoded::<i32>::Absent.map(|v| v * 3), Decoded::Absent);
        assert!(Decoded::<i32>::Skipped.map(|v| v * 3).is_skipped());
        assert_eq!(Decoded::<i32>::Skipped.value(), None);
    }
}

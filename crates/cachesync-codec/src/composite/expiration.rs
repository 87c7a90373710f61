use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::generic::{Codec, Decoded, fixed_window, window_at};
use crate::error::{CodecError, Result};
use crate::ordinal::{EnumCodec, OrdinalEnum};
use crate::primitive::LongCodec;

/// 时间单位。变体顺序即序号，生产端与消费端必须一致。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    /// 纳秒。
    Nanoseconds,
    /// 微秒。
    Microseconds,
    /// 毫秒。
    Milliseconds,
    /// 秒。
    Seconds,
    /// 分钟。
    Minutes,
    /// 小时。
    Hours,
    /// 天。
    Days,
}

impl TimeUnit {
    fn nanos(self) -> u64 {
        match self {
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => 1_000_000,
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Minutes => 60 * 1_000_000_000,
            TimeUnit::Hours => 3_600 * 1_000_000_000,
            TimeUnit::Days => 86_400 * 1_000_000_000,
        }
    }
}

impl OrdinalEnum for TimeUnit {
    const VARIANTS: &'static [Self] = &[
        TimeUnit::Nanoseconds,
        TimeUnit::Microseconds,
        TimeUnit::Milliseconds,
        TimeUnit::Seconds,
        TimeUnit::Minutes,
        TimeUnit::Hours,
        TimeUnit::Days,
    ];

    fn ordinal(self) -> usize {
        self as usize
    }
}

/// 过期时间：`duration` 个 `unit`。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expiration {
    /// 数量，允许为负（由缓存服务端解释）。
    pub duration: i64,
    /// 单位。
    pub unit: TimeUnit,
}

impl Expiration {
    /// 构造过期时间。
    pub fn new(duration: i64, unit: TimeUnit) -> Self {
        Self { duration, unit }
    }

    /// 换算为 [`Duration`]；负数或溢出时返回 `None`。
    pub fn as_duration(&self) -> Option<Duration> {
        let count = u64::try_from(self.duration).ok()?;
        let nanos = u128::from(count) * u128::from(self.unit.nanos());
        let secs = u64::try_from(nanos / 1_000_000_000).ok()?;
        Some(Duration::new(secs, (nanos % 1_000_000_000) as u32))
    }
}

/// [`Expiration`] 编解码器：`Long ‖ Enum(TimeUnit)`，共 9 字节。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpirationCodec {
    unit: EnumCodec<TimeUnit>,
}

impl ExpirationCodec {
    /// 声明长度。
    pub const BYTES: usize = LongCodec::BYTES + 1;

    /// 构造编解码器。
    pub fn new() -> Self {
        Self::default()
    }
}

impl Codec for ExpirationCodec {
    type Value = Expiration;

    fn bytes_length(&self) -> Option<usize> {
        Some(Self::BYTES)
    }

    fn encode(&self, value: Option<&Expiration>) -> Result<Option<Vec<u8>>> {
        Ok(value.map(|expiration| {
            let mut out = Vec::with_capacity(Self::BYTES);
            out.extend_from_slice(&LongCodec::to_bytes(expiration.duration));
            out.extend_from_slice(&self.unit.encode_variant(expiration.unit));
            out
        }))
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Decoded<Expiration>> {
        let window = match fixed_window::<9>(bytes) {
            Decoded::Value(window) => window,
            Decoded::Absent => return Ok(Decoded::Absent),
            Decoded::Skipped => return Ok(Decoded::Skipped),
        };
        let duration = LongCodec::from_bytes(window_at(&window, 0));
        match self.unit.decode(Some(&window[LongCodec::BYTES..]))? {
            Decoded::Value(unit) => Ok(Decoded::Value(Expiration { duration, unit })),
            _ => Err(CodecError::not_applicable::<EnumCodec<TimeUnit>>("expiration unit")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordinal::EnumWidth;

    #[test]
    fn time_unit_fits_one_byte() {
        assert_eq!(EnumCodec::<TimeUnit>::new().width(), EnumWidth::One);
    }

    #[test]
    fn expiration_layout() {
        let expiration = Expiration::new(30, TimeUnit::Seconds);
        let bytes = ExpirationCodec::new().encode(Some(&expiration)).unwrap().unwrap();
        assert_eq!(bytes, vec![30, 0, 0, 0, 0, 0, 0, 0, 3]);
        assert_eq!(
            ExpirationCodec::new().decode(Some(bytes.as_slice())).unwrap(),
            Decoded::Value(expiration)
        );
    }

    #[test]
    fn corrupt_unit_is_fatal() {
        let err = ExpirationCodec::new()
            .decode(Some(&[1, 0, 0, 0, 0, 0, 0, 0, 7]))
            .unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn durations() {
        assert_eq!(
            Expiration::new(2, TimeUnit::Minutes).as_duration(),
            Some(Duration::from_secs(120))
        );
        assert_eq!(
            Expiration::new(1_500, TimeUnit::Microseconds).as_duration(),
            Some(Duration::from_micros(1_500))
        );
        assert_eq!(Expiration::new(-1, TimeUnit::Days).as_duration(), None);
    }
}

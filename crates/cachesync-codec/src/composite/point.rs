use serde::{Deserialize, Serialize};

use crate::codec::generic::{Codec, Decoded, fixed_window, window_at};
use crate::error::Result;
use crate::primitive::DoubleCodec;

/// 平面坐标点（经度/纬度或任意二维坐标）。
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// 横坐标。
    pub x: f64,
    /// 纵坐标。
    pub y: f64,
}

impl Point {
    /// 构造坐标点。
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// [`Point`] 编解码器：`Double ‖ Double`，共 16 字节。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointCodec;

impl PointCodec {
    /// 声明长度。
    pub const BYTES: usize = 2 * DoubleCodec::BYTES;

    /// 编码非空坐标点。
    pub fn to_bytes(point: &Point) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::BYTES);
        out.extend_from_slice(&DoubleCodec::to_bytes(point.x));
        out.extend_from_slice(&DoubleCodec::to_bytes(point.y));
        out
    }
}

impl Codec for PointCodec {
    type Value = Point;

    fn bytes_length(&self) -> Option<usize> {
        Some(Self::BYTES)
    }

    fn encode(&self, value: Option<&Point>) -> Result<Option<Vec<u8>>> {
        Ok(value.map(Self::to_bytes))
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Decoded<Point>> {
        Ok(fixed_window::<16>(bytes).map(|window| Point {
            x: DoubleCodec::from_bytes(window_at(&window, 0)),
            y: DoubleCodec::from_bytes(window_at(&window, DoubleCodec::BYTES)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_is_two_doubles() {
        let point = Point::new(13.361389, 38.115556);
        let bytes = PointCodec.encode(Some(&point)).unwrap().unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..8], &DoubleCodec::to_bytes(point.x));
        assert_eq!(
            PointCodec.decode(Some(bytes.as_slice())).unwrap(),
            Decoded::Value(point)
        );
        assert!(PointCodec.decode(Some(&bytes[..15])).unwrap().is_skipped());
    }
}

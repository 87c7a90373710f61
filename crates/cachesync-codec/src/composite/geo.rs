use serde::{Deserialize, Serialize};

use crate::codec::generic::{Codec, Decoded};
use crate::composite::TaggedFields;
use crate::composite::point::{Point, PointCodec};
use crate::error::Result;
use crate::text::StringCodec;

const NAME: &str = "n";
const POINT: &str = "p";

/// 带名称的地理位置，名称与坐标均可缺省。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// 成员名。
    pub name: Option<String>,
    /// 坐标。
    pub point: Option<Point>,
}

impl GeoLocation {
    /// 构造完整的地理位置。
    pub fn new(name: impl Into<String>, point: Point) -> Self {
        Self {
            name: Some(name.into()),
            point: Some(point),
        }
    }
}

/// [`GeoLocation`] 编解码器，标签 `n`（名称）与 `p`（坐标）。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeoLocationCodec;

impl Codec for GeoLocationCodec {
    type Value = GeoLocation;

    fn encode(&self, value: Option<&GeoLocation>) -> Result<Option<Vec<u8>>> {
        let Some(location) = value else {
            return Ok(None);
        };
        let mut fields = TaggedFields::new();
        fields.put(NAME, StringCodec.encode(location.name.as_ref())?);
        fields.put(POINT, PointCodec.encode(location.point.as_ref())?);
        fields.encode().map(Some)
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Decoded<GeoLocation>> {
        let Some(bytes) = bytes else {
            return Ok(Decoded::Absent);
        };
        let fields = TaggedFields::decode(bytes)?;
        Ok(Decoded::Value(GeoLocation {
            name: fields.field(NAME, &StringCodec)?,
            point: fields.field(POINT, &PointCodec)?,
        }))
    }
}

use serde::{Deserialize, Serialize};

use crate::codec::generic::{Codec, Decoded};
use crate::composite::TaggedFields;
use crate::composite::limit::{Limit, LimitCodec};
use crate::error::Result;
use crate::fallback::GenericCodec;
use crate::ordinal::{EnumCodec, OrdinalEnum};
use crate::primitive::BoolCodec;
use crate::text::StringCodec;

const ORDER: &str = "o";
const ALPHA: &str = "a";
const BY: &str = "b";
const GET: &str = "g";
const LIMIT: &str = "l";

/// 排序方向。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    /// 升序。
    Asc,
    /// 降序。
    Desc,
}

impl OrdinalEnum for SortOrder {
    const VARIANTS: &'static [Self] = &[SortOrder::Asc, SortOrder::Desc];

    fn ordinal(self) -> usize {
        self as usize
    }
}

/// 排序命令的参数集合。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOptions {
    /// 排序方向，缺省由服务端决定。
    pub order: Option<SortOrder>,
    /// 是否按字典序排序。
    pub alpha: bool,
    /// `BY` 外部键模式。
    pub by_pattern: Option<String>,
    /// `GET` 外部键模式，按出现顺序。
    pub get_patterns: Vec<String>,
    /// 分页。
    pub limit: Option<Limit>,
}

/// [`SortOptions`] 编解码器。
///
/// 标签：`o` 方向、`a` 字典序（仅在为真时写出）、`b` BY 模式、`g` GET 模式列表（非空时写出）、`l` 分页。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortOptionsCodec {
    order: EnumCodec<SortOrder>,
}

impl SortOptionsCodec {
    /// 构造编解码器。
    pub fn new() -> Self {
        Self::default()
    }
}

impl Codec for SortOptionsCodec {
    type Value = SortOptions;

    fn encode(&self, value: Option<&SortOptions>) -> Result<Option<Vec<u8>>> {
        let Some(options) = value else {
            return Ok(None);
        };
        let mut fields = TaggedFields::new();
        fields.put(ORDER, self.order.encode(options.order.as_ref())?);
        if options.alpha {
            fields.put(ALPHA, BoolCodec.encode(Some(&true))?);
        }
        fields.put(BY, StringCodec.encode(options.by_pattern.as_ref())?);
        if !options.get_patterns.is_empty() {
            fields.put(GET, Some(GenericCodec::to_bytes(&options.get_patterns)?));
        }
        fields.put(LIMIT, LimitCodec.encode(options.limit.as_ref())?);
        fields.encode().map(Some)
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Decoded<SortOptions>> {
        let Some(bytes) = bytes else {
            return Ok(Decoded::Absent);
        };
        let fields = TaggedFields::decode(bytes)?;
        Ok(Decoded::Value(SortOptions {
            order: fields.field(ORDER, &self.order)?,
            alpha: fields.field(ALPHA, &BoolCodec)?.unwrap_or(false),
            by_pattern: fields.field(BY, &StringCodec)?,
            get_patterns: fields
                .field(GET, &GenericCodec::<Vec<String>>::new())?
                .unwrap_or_default(),
            limit: fields.field(LIMIT, &LimitCodec)?,
        }))
    }
}

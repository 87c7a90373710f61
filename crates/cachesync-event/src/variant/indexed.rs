use std::sync::Arc;

use cachesync_codec::{CodecError, Result, ShortCodec};

use crate::config::WireVersion;
use crate::frame::{FrameReader, FrameWriter};
use crate::method::{MethodDescriptor, MethodRegistry};
use crate::variant::WireVariant;

/// 序号式变体（标签 1）：方法序号以 [`ShortCodec`] 写出（2 字节大端）。
///
/// 不做任何协商，生产端与消费端的 [`MethodRegistry`] 必须给出相同的序号分配。
#[derive(Clone, Copy, Debug, Default)]
pub struct IndexedVariant;

impl WireVariant for IndexedVariant {
    fn tag(&self) -> u8 {
        WireVersion::V1.tag()
    }

    fn name(&self) -> &'static str {
        "v1"
    }

    fn write_metadata(
        &self,
        method: &MethodDescriptor,
        methods: &dyn MethodRegistry,
        out: &mut FrameWriter,
    ) -> Result<()> {
        let index = methods
            .index_of(method)
            .ok_or_else(|| CodecError::UnindexedMethod {
                method: method.signature(),
            })?;
        out.put_slice(&ShortCodec::to_bytes(index));
        Ok(())
    }

    fn read_metadata(
        &self,
        input: &mut FrameReader<'_>,
        methods: &dyn MethodRegistry,
    ) -> Result<Arc<MethodDescriptor>> {
        let mut window = [0_u8; ShortCodec::BYTES];
        window.copy_from_slice(input.take("method index", ShortCodec::BYTES)?);
        let index = ShortCodec::from_bytes(window);
        methods
            .resolve_by_index(index)
            .ok_or_else(|| CodecError::UnresolvedMethod {
                signature: format!("method index {index}"),
            })
    }
}

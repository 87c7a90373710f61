use std::sync::Arc;

use cachesync_codec::{CodecError, Result};

use crate::config::WireVersion;
use crate::frame::{FrameReader, FrameWriter};
use crate::method::{MethodDescriptor, MethodRegistry};
use crate::variant::WireVariant;

/// 名称式变体（标签 0）。
///
/// ```text
/// [u8 len][接口简名] [u8 len][方法名] [u8 参数个数] ([u8 len][参数类型名])*
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct NamedVariant;

impl WireVariant for NamedVariant {
    fn tag(&self) -> u8 {
        WireVersion::Default.tag()
    }

    fn name(&self) -> &'static str {
        "default"
    }

    fn write_metadata(
        &self,
        method: &MethodDescriptor,
        _methods: &dyn MethodRegistry,
        out: &mut FrameWriter,
    ) -> Result<()> {
        out.put_name("interface", method.simple_interface())?;
        out.put_name("method", method.name())?;
        let count = method.params().len();
        let count = u8::try_from(count).map_err(|_| CodecError::TooManyParameters {
            method: method.signature(),
            count,
        })?;
        out.put_u8(count);
        for param in method.params() {
            out.put_name("parameter type", param.type_name())?;
        }
        Ok(())
    }

    fn read_metadata(
        &self,
        input: &mut FrameReader<'_>,
        methods: &dyn MethodRegistry,
    ) -> Result<Arc<MethodDescriptor>> {
        let interface = input.read_name("interface")?;
        let method = input.read_name("method")?;
        let count = input.read_u8("parameter count")?;
        let mut param_types = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            param_types.push(input.read_name("parameter type")?);
        }
        methods
            .resolve_by_signature(interface, method, &param_types)
            .ok_or_else(|| CodecError::UnresolvedMethod {
                signature: format!("{interface}.{method}({})", param_types.join(", ")),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::MethodTable;

    #[test]
    fn parameter_count_must_fit_one_byte() {
        let mut method = MethodDescriptor::new("Commands", "mset");
        for _ in 0..256 {
            method = method.param::<i64>("long");
        }
        let mut out = FrameWriter::new();
        let err = NamedVariant
            .write_metadata(&method, &MethodTable::new(), &mut out)
            .unwrap_err();
        assert!(matches!(err, CodecError::TooManyParameters { count: 256, .. }));
        assert_eq!(err.code(), cachesync_codec::codes::FRAME_TOO_MANY_PARAMETERS);
    }

    #[test]
    fn metadata_roundtrips_through_a_table() {
        let method = MethodDescriptor::new("io.cache.Commands", "incr").param::<i64>("long");
        let table = MethodTable::from_methods([method.clone()]).unwrap();
        let mut out = FrameWriter::new();
        NamedVariant.write_metadata(&method, &table, &mut out).unwrap();
        let frame = out.finish();
        let mut input = FrameReader::new(&frame);
        let resolved = NamedVariant.read_metadata(&mut input, &table).unwrap();
        assert_eq!(*resolved, method);
        input.finish().unwrap();
    }
}

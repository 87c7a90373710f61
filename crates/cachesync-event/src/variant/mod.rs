//! 线上变体：版本字节之后、参数块之前的方法身份元数据。
//!
//! # 设计背景（Why）
//! - 名称式元数据自描述、可跨部署演进，但每帧都要携带接口名、方法名与参数类型名；
//! - 序号式元数据只占 2 字节，代价是生产端与消费端必须共享同一份序号分配；
//! - 新的表达方式以实现 [`WireVariant`] 的形式接入 [`EventCodec`](crate::EventCodec)，无需改动帧的其余部分。
//!
//! # 契约说明（What）
//! - `tag` 即写入帧首的版本字节，同一编解码器内必须唯一；
//! - `read_metadata` 必须恰好消费 `write_metadata` 写出的字节。

mod indexed;
mod named;

pub use indexed::IndexedVariant;
pub use named::NamedVariant;

use std::sync::Arc;

use cachesync_codec::Result;

use crate::frame::{FrameReader, FrameWriter};
use crate::method::{MethodDescriptor, MethodRegistry};

/// 一种版本化的方法身份编码策略。
pub trait WireVariant: Send + Sync {
    /// 版本字节。
    fn tag(&self) -> u8;

    /// 变体名，用于日志与诊断。
    fn name(&self) -> &'static str;

    /// 写出方法身份。
    fn write_metadata(
        &self,
        method: &MethodDescriptor,
        methods: &dyn MethodRegistry,
        out: &mut FrameWriter,
    ) -> Result<()>;

    /// 读取方法身份并解析为描述符。
    fn read_metadata(
        &self,
        input: &mut FrameReader<'_>,
        methods: &dyn MethodRegistry,
    ) -> Result<Arc<MethodDescriptor>>;
}

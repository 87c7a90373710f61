#![warn(missing_docs)]

//! # cachesync-event
//!
//! ## 职责定位（Why）
//! - 把一次写命令调用（应用名、接口、方法、参数）编码为紧凑的版本化字节帧，供对端进程重放；
//! - 版本字节决定方法身份的表达方式：[`NamedVariant`] 写出名称与参数类型，[`IndexedVariant`]
//!   只写方法序号，两端须共享同一份序号分配。
//!
//! ## 帧布局（How）
//!
//! ```text
//! byte 0              版本标签
//! [u8 len][ascii]     应用名
//! [变体元数据]
//! 每个参数：
//!   [u8 len]          参数字节长度（0 表示空参数）
//!   [len bytes]       由注册中心按参数声明类型选出的编解码器产出
//! ```
//!
//! ## 契约说明（What）
//! - 参数编码借助 [`cachesync_codec::CodecRegistry`]，错误统一为 [`CodecError`]；
//! - 未知版本的处理由 [`UnknownVersionPolicy`] 显式配置，默认严格拒绝。

pub mod codec;
pub mod config;
pub mod event;
pub mod frame;
pub mod method;
pub mod variant;

pub use cachesync_codec::{CodecError, Result};
pub use codec::EventCodec;
pub use config::{EventCodecConfig, UnknownVersionPolicy, WireVersion};
pub use event::{Arg, CommandEvent, CommandEventBuilder};
pub use frame::{FrameReader, FrameWriter};
pub use method::{MethodDescriptor, MethodRegistry, MethodTable, ParamDescriptor, simple_name};
pub use variant::{IndexedVariant, NamedVariant, WireVariant};

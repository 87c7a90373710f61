//! 编解码契约的双层抽象：泛型层与对象层，以及目标类型标识。

pub mod generic;
pub mod object;
pub mod token;

pub use generic::{Codec, Decoded};
pub use object::{DynCodec, DynValue, TypedCodecAdapter};
pub use token::TypeToken;

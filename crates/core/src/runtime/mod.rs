//! Runtime side of the bridge: the value model and the remote object
//! registry.

mod classify;
mod number;
mod preview;
mod registry;
mod value;


pub use classify::{Classification, classify};
pub use number::number_to_string;
pub use preview::{
	ARRAY_PREVIEW_LENGTH, DEFAULT_PREVIEW_LENGTH, PreviewOptions, build_preview, preview_text,
};
pub use registry::{FormatOptions, GetPropertiesParams, ObjectRegistry};
pub use value::{Getter, Object, ObjectKind, Property, Symbol, Thrown, Value};

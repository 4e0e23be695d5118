//! Codec - data files as JavaScript source.
//!
//! Each content file holds one declaration such as `const books = [ ... ];`
//! followed by a CommonJS export. [`decode`] extracts the literal with a
//! parser that only understands data (strings, numbers, booleans, null,
//! arrays and objects); nothing in the file is ever evaluated. [`encode`]
//! writes the value back in `JSON.stringify(value, null, 4)` layout between
//! a banner comment and the export footer.

mod error;
mod literal;
mod source;

pub use error::CodecError;
pub use source::{decode, decode_named, encode, Declaration, Keyword, SourceTemplate};

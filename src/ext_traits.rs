//! Extension traits for decoding response bodies.

use bytes::Bytes;
use error_stack::ResultExt;

use crate::errors::{CustomResult, ParsingError};

/// Typed JSON decoding for raw response bytes.
pub trait BytesExt {
    /// Parse `self` into the given struct, naming it for error reports.
    fn parse_struct<'de, T>(&'de self, type_name: &'static str) -> CustomResult<T, ParsingError>
    where
        T: serde::Deserialize<'de>;
}

impl BytesExt for Bytes {
    fn parse_struct<'de, T>(&'de self, type_name: &'static str) -> CustomResult<T, ParsingError>
    where
        T: serde::Deserialize<'de>,
    {
        serde_json::from_slice::<T>(self)
            .change_context(ParsingError::StructParseFailure(type_name))
            .attach_printable_lazy(|| {
                let variable_type = std::any::type_name::<T>();
                format!("Unable to parse {variable_type} from bytes {self:?}")
            })
    }
}

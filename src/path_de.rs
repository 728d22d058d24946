use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Deserialize with JSON-path context in error messages.
pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(into_decode_error)
}

fn into_decode_error<E: std::fmt::Display>(err: serde_path_to_error::Error<E>) -> Error {
    let path = err.path().to_string();
    Error::Decode { path, message: err.into_inner().to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Param;

    #[test]
    fn decode_error_carries_json_path() {
        let src = r#"[{"name": "a", "type": "number"}, {"name": "b", "type": "number", "constraints": {"min": "x"}}]"#;
        let err = from_slice_with_path::<Vec<Param>>(src.as_bytes()).unwrap_err();
        match err {
            Error::Decode { path, .. } => assert!(path.starts_with("[1]"), "got {path}"),
            other => panic!("unexpected error: {other}"),
        }
    }
}

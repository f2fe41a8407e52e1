pub mod fiscalizacao;
pub mod producao;

use serde::Serialize;

use crate::error::AppError;

/// Serializes a view struct for the hosting shell. The command boundary
/// speaks JSON; everything below it works on typed structs.
pub fn to_payload<T: Serialize>(view: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string(view)?)
}

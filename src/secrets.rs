//! Configuration boundary: named secrets resolved by the hosting
//! environment before a page runs.
//!
//! The only structured secret this backend owns is the base64-encoded
//! workbook (`EXCEL_BASE64`), produced offline by the `converter-base`
//! binary and pasted into the host's secret store.

use std::collections::HashMap;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::info;

use crate::error::AppError;

/// Default secret name for the embedded workbook.
pub const SECRET_EXCEL_BASE64: &str = "EXCEL_BASE64";

/// Snapshot of the named secrets available to this render pass.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    values: HashMap<String, String>,
}

impl Secrets {
    /// Snapshot of the process environment, the way the hosting platform
    /// exposes its secret store.
    pub fn from_env() -> Secrets {
        Secrets {
            values: std::env::vars().collect(),
        }
    }

    /// Explicit pairs; what tests and embedded callers use.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Secrets {
        Secrets {
            values: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Resolves a named secret. Absence is the recoverable
    /// [`AppError::MissingSecret`], surfaced to the user, never a panic.
    pub fn get(&self, nome: &str) -> Result<&str, AppError> {
        self.values
            .get(nome)
            .map(|s| s.as_str())
            .ok_or_else(|| AppError::MissingSecret(nome.to_string()))
    }
}

/// Decodes a base64 secret value. Surrounding whitespace and line breaks
/// (secret stores wrap long values) are stripped before decoding.
pub fn decode_base64(valor: &str) -> Result<Vec<u8>, AppError> {
    let compact: String = valor.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(BASE64.decode(compact.as_bytes())?)
}

/// Reads a spreadsheet file and returns the `NOME = "<base64>"` line ready
/// to paste into the hosting environment's secret store.
pub fn encode_arquivo_para_secret(caminho: &Path, nome_secret: &str) -> Result<String, AppError> {
    let bytes = std::fs::read(caminho)
        .map_err(|_| AppError::SourceNotFound(caminho.display().to_string()))?;
    let encoded = BASE64.encode(&bytes);
    info!(
        "Arquivo '{}' codificado ({} bytes -> {} caracteres base64)",
        caminho.display(),
        bytes.len(),
        encoded.len()
    );
    Ok(format!("{} = \"{}\"", nome_secret, encoded))
}

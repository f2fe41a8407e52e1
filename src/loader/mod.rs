pub mod csv;
pub mod xlsx;

use log::info;
use serde::Deserialize;

use crate::error::AppError;
use crate::pipeline::table::Table;
use crate::secrets::{self, Secrets};

/// Wire format of the resolved bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceFormat {
    Xlsx,
    Csv,
}

/// Where a page gets its table from.
///
/// `EmbeddedSecret` is the deploy-without-upload path: an XLSX workbook
/// base64-encoded into a named secret of the hosting environment (see
/// `secrets::encode_arquivo_para_secret` and the `converter-base` binary).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataSource {
    XlsxUpload(Vec<u8>),
    CsvUpload(Vec<u8>),
    EmbeddedSecret(String),
}

impl DataSource {
    /// Resolves the source down to raw bytes plus their format. Secret
    /// resolution and base64 decoding happen here; parsing does not.
    pub fn resolve_bytes(&self, secrets: &Secrets) -> Result<(Vec<u8>, SourceFormat), AppError> {
        match self {
            DataSource::XlsxUpload(bytes) => Ok((bytes.clone(), SourceFormat::Xlsx)),
            DataSource::CsvUpload(bytes) => Ok((bytes.clone(), SourceFormat::Csv)),
            DataSource::EmbeddedSecret(nome) => {
                let valor = secrets.get(nome)?;
                let bytes = secrets::decode_base64(valor)?;
                Ok((bytes, SourceFormat::Xlsx))
            }
        }
    }
}

/// Parses resolved bytes in the given format.
pub fn parse_bytes(formato: SourceFormat, bytes: &[u8]) -> Result<Table, AppError> {
    let table = match formato {
        SourceFormat::Xlsx => xlsx::parse_xlsx_bytes(bytes)?,
        SourceFormat::Csv => csv::parse_csv_bytes(bytes)?,
    };
    info!(
        "Planilha carregada: {} linhas x {} colunas",
        table.len(),
        table.headers().len()
    );
    Ok(table)
}

/// One-shot load without the memoized cache (see `AppState::load_table`).
pub fn load_table(source: &DataSource, secrets: &Secrets) -> Result<Table, AppError> {
    let (bytes, formato) = source.resolve_bytes(secrets)?;
    parse_bytes(formato, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_secret_is_recoverable() {
        let secrets = Secrets::from_pairs(&[]);
        let source = DataSource::EmbeddedSecret("EXCEL_BASE64".into());
        match source.resolve_bytes(&secrets).unwrap_err() {
            AppError::MissingSecret(nome) => assert_eq!(nome, "EXCEL_BASE64"),
            e => panic!("Expected MissingSecret, got {:?}", e),
        }
    }

    #[test]
    fn test_invalid_base64_secret() {
        let secrets = Secrets::from_pairs(&[("EXCEL_BASE64", "%%% nao e base64 %%%")]);
        let source = DataSource::EmbeddedSecret("EXCEL_BASE64".into());
        assert!(matches!(
            source.resolve_bytes(&secrets),
            Err(AppError::Base64(_))
        ));
    }

    #[test]
    fn test_csv_upload_roundtrip() {
        let source =
            DataSource::CsvUpload(b"Setor;Resultado\nZONA NORTE;PRODUTIVO\n".to_vec());
        let t = load_table(&source, &Secrets::from_pairs(&[])).unwrap();
        assert_eq!(t.len(), 1);
    }
}

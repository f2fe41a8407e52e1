use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de entrada/saída: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Erro ao ler a planilha: {0}")]
    Planilha(#[from] calamine::XlsxError),

    #[error("Base64 inválido: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Erro de serialização: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Colunas obrigatórias ausentes: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Planilha vazia ou sem dados")]
    EmptyTable,

    #[error("Secret não configurado: {0}")]
    MissingSecret(String),

    #[error("Fonte de dados não encontrada: {0}")]
    SourceNotFound(String),

    #[error("{0}")]
    Custom(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

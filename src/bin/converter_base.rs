use std::path::PathBuf;
use std::process::ExitCode;

use log::error;

use soc_marica::secrets::{encode_arquivo_para_secret, SECRET_EXCEL_BASE64};

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(arquivo) = args.next() else {
        eprintln!("Uso: converter-base <planilha.xlsx> [nome_secret] [arquivo_saida]");
        return ExitCode::FAILURE;
    };
    let nome_secret = args
        .next()
        .unwrap_or_else(|| SECRET_EXCEL_BASE64.to_string());
    let saida = args
        .next()
        .unwrap_or_else(|| "secret_para_copiar.txt".to_string());

    match encode_arquivo_para_secret(&PathBuf::from(&arquivo), &nome_secret) {
        Ok(linha) => {
            if let Err(e) = std::fs::write(&saida, linha) {
                error!("Falha ao gravar '{}': {}", saida, e);
                return ExitCode::FAILURE;
            }
            println!("Conversão concluída. O secret foi salvo no arquivo '{}'.", saida);
            println!("Copie todo o conteúdo e cole nos Secrets do aplicativo.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

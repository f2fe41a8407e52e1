pub mod commands;
pub mod dashboard;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod secrets;
pub mod state;

// ─── E2E Integration Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod e2e_tests {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use rust_xlsxwriter::Workbook;

    use crate::commands::fiscalizacao::{run_fiscalizacao_logic, FiscalizacaoRequest};
    use crate::commands::producao::{
        run_producao_diaria_logic, run_producao_mensal_logic, ProducaoRequest,
    };
    use crate::commands::to_payload;
    use crate::loader::DataSource;
    use crate::secrets::{Secrets, SECRET_EXCEL_BASE64};
    use crate::state::AppState;

    fn workbook_bytes(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                sheet.write_string(r as u32, c as u16, *value).unwrap();
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    fn producao_request(fonte: DataSource) -> ProducaoRequest {
        ProducaoRequest {
            fonte,
            setores: Some(vec!["TODOS".into()]),
            equipes: Some(vec!["TODOS".into()]),
            resultados: Some(vec!["TODOS".into()]),
            detalhe_equipe: None,
            detalhe_setor: None,
        }
    }

    /// E2E: upload diário → normalização unifica grafias → KPIs e séries.
    #[test]
    fn test_e2e_producao_diaria_upload() {
        let bytes = workbook_bytes(&[
            &["Setor", "Chefe/Responsável de Equipe", "Resultado", "Serviço"],
            &["zona norte ", "MARCOS", "produtivo", "PODA"],
            &["Zona Norte", "MARCOS", "IMPRODUTIVO", "PODA"],
        ]);
        let state = AppState::new();
        let secrets = Secrets::from_pairs(&[]);
        let request = producao_request(DataSource::XlsxUpload(bytes));

        let view = run_producao_diaria_logic(&state, &secrets, &request).unwrap();

        // both spellings collapse into one sector
        assert_eq!(view.opcoes_setor, vec!["ZONA NORTE"]);
        assert_eq!(view.painel.indicadores.total_atividades, 2);
        assert_eq!(view.painel.indicadores.total_produtivo, 1);
        assert_eq!(view.painel.indicadores.total_improdutivo, 1);
        assert_eq!(view.painel.indicadores.taxa_produtividade, 50.0);

        let series = view.painel.produtividade_equipe.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].contagens["PRODUTIVO"], 1);
        assert_eq!(series[0].contagens["IMPRODUTIVO"], 1);

        // daily summary pivots by team and sector together
        let resumo = view.painel.resumo_equipe.unwrap();
        assert_eq!(
            resumo.linhas[0].chave,
            vec!["MARCOS".to_string(), "ZONA NORTE".to_string()]
        );
    }

    /// E2E: planilha embutida em secret base64 → produção mensal → cache.
    #[test]
    fn test_e2e_producao_mensal_via_secret() {
        let bytes = workbook_bytes(&[
            &["Setor", "Código Equipe", "Resultado", "Serviço"],
            &["ZONA SUL", "E2", "PRODUTIVO", "CAPINA"],
            &["ZONA SUL", "E2", "PRODUTIVO", "CAPINA"],
            &["ZONA SUL", "E7", "IMPRODUTIVO", "PODA"],
        ]);
        let encoded = BASE64.encode(&bytes);
        let secrets = Secrets::from_pairs(&[(SECRET_EXCEL_BASE64, encoded.as_str())]);
        let state = AppState::new();
        let request = producao_request(DataSource::EmbeddedSecret(SECRET_EXCEL_BASE64.into()));

        let view = run_producao_mensal_logic(&state, &secrets, &request).unwrap();
        assert_eq!(view.painel.indicadores.total_atividades, 3);
        assert_eq!(view.painel.indicadores.taxa_produtividade, 66.67);
        let resumo = view.painel.resumo_servico.unwrap();
        assert_eq!(resumo.totais["PRODUTIVO"], 2);
        assert_eq!(resumo.total_geral, 3);

        // same blob again: served from the memoized cache
        run_producao_mensal_logic(&state, &secrets, &request).unwrap();
        assert_eq!(state.cached_blobs(), 1);
    }

    /// E2E: fiscalização com filtros de período e de status.
    #[test]
    fn test_e2e_fiscalizacao_completa() {
        let bytes = workbook_bytes(&[
            &["Status", "Erro", "Agente", "Data da analise", "Responsável", "Status Plano Ação"],
            &["PROCEDENTE", "", "ANA", "01/07/2025", "CARLOS", ""],
            &["procedente", "", "bruno", "10/07/2025", "carlos", ""],
            &["PROCEDENTE", "", "ANA", "12/07/2025", "CARLOS", ""],
            &["IMPROCEDENTE", "PODA IRREGULAR", "ANA", "15/07/2025", "DIEGO", "PENDENTE"],
            &["IMPROCEDENTE", "CADASTRO ERRADO", "BRUNO", "03/08/2025", "DIEGO", "REALIZADO"],
            &["EM ANÁLISE", "", "ANA", "04/08/2025", "DIEGO", ""],
            &["PROCEDENTE", "", "ANA", "sem data", "CARLOS", ""],
        ]);
        let state = AppState::new();
        let secrets = Secrets::from_pairs(&[]);
        let mut request = FiscalizacaoRequest {
            fonte: DataSource::XlsxUpload(bytes),
            mes: Some("TODOS".into()),
            data_inicio: None,
            data_fim: None,
            agente: Some("TODOS".into()),
            status: Some("TODOS".into()),
            responsavel: Some("TODOS".into()),
        };

        // "EM ANÁLISE" and the undated row never enter the base
        let view = run_fiscalizacao_logic(&state, &secrets, &request).unwrap();
        assert_eq!(view.meses_disponiveis, vec!["08/2025", "07/2025"]);
        let painel = view.painel.unwrap();
        assert_eq!(painel.resumo.total_fiscalizado, 5);
        assert_eq!(painel.resumo.total_erros, 2);
        assert_eq!(painel.resumo.percentual_erro, 40.0);

        // narrowing by status: 3 PROCEDENTE rows survive out of 3+2
        request.status = Some("PROCEDENTE".into());
        let view = run_fiscalizacao_logic(&state, &secrets, &request).unwrap();
        assert_eq!(view.painel.unwrap().resumo.total_fiscalizado, 3);

        // month narrowing via the slider bounds
        request.status = Some("TODOS".into());
        request.mes = Some("07/2025".into());
        let view = run_fiscalizacao_logic(&state, &secrets, &request).unwrap();
        let painel = view.painel.unwrap();
        assert_eq!(painel.resumo.total_fiscalizado, 4);
        assert_eq!(
            painel.ranking_improcedentes.unwrap()[0].categoria,
            "ANA".to_string()
        );
    }

    /// E2E: a view serializes with the camelCase keys the UI consumes.
    #[test]
    fn test_e2e_payload_serialization() {
        let bytes = workbook_bytes(&[
            &["Setor", "Código Equipe", "Resultado", "Serviço"],
            &["ZONA NORTE", "E1", "PRODUTIVO", "PODA"],
        ]);
        let state = AppState::new();
        let secrets = Secrets::from_pairs(&[]);
        let request = producao_request(DataSource::XlsxUpload(bytes));

        let view = run_producao_mensal_logic(&state, &secrets, &request).unwrap();
        let payload = to_payload(&view).unwrap();
        assert!(payload.contains("\"totalAtividades\":1"));
        assert!(payload.contains("\"taxaProdutividade\":100.0"));
        assert!(payload.contains("\"opcoesSetor\""));
    }

    /// E2E: secret ausente degrada com erro recuperável, sem pânico.
    #[test]
    fn test_e2e_secret_ausente() {
        let state = AppState::new();
        let secrets = Secrets::from_pairs(&[]);
        let request = producao_request(DataSource::EmbeddedSecret(SECRET_EXCEL_BASE64.into()));

        let err = run_producao_mensal_logic(&state, &secrets, &request).unwrap_err();
        assert_eq!(err.to_string(), "Secret não configurado: EXCEL_BASE64");
    }
}

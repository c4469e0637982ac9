//! # Erros de Configuração
//!
//! Geradores de features e dicionários são configurados uma única vez, na
//! construção do modelo. Qualquer opção ausente, não-parseável ou inválida
//! falha imediatamente com [`ConfigError`] — nunca é aplicado um valor padrão
//! silencioso para uma opção obrigatória.
//!
//! Violações de invariantes em tempo de etiquetagem (índice fora do
//! intervalo, tokens e outcomes com tamanhos diferentes) são bugs do chamador
//! e provocam `panic!` com mensagem descritiva, não um `Result`.

use thiserror::Error;

/// Erro de construção de um gerador de features, pipeline ou dicionário.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Opção obrigatória ausente no mapa de configuração.
    #[error("opção obrigatória ausente: {0}")]
    MissingOption(&'static str),

    /// Opção presente mas com valor que não pôde ser interpretado.
    #[error("valor inválido para a opção {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    /// Expressão regular de classe de sublabel inválida.
    #[error("expressão regular inválida para a classe {class}: {source}")]
    InvalidPattern {
        class: String,
        #[source]
        source: regex::Error,
    },

    /// Entrada de gazetteer em JSON malformada.
    #[error("gazetteer JSON inválido: {0}")]
    InvalidGazetteer(#[from] serde_json::Error),
}

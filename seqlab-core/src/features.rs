//! # Geração de Features para Rotulagem de Sequências
//!
//! Para cada token de uma sentença, os geradores deste módulo emitem
//! descritores simbólicos na forma `nome=valor`, consumidos por um modelo
//! estatístico externo. O vetor de features é **ordenado** e **admite
//! duplicatas** — o modelo externo trata repetições como evidência repetida.
//!
//! ## Contrato comum ([`FeatureGenerator`])
//!
//! - `create_features`: emite features para o token em `index`, podendo ler
//!   os tokens vizinhos e o histórico de outcomes já decididos (somente
//!   índices estritamente menores que `index` — restrição causal).
//! - `update_adaptive_data`: chamado uma vez quando uma sentença inteira foi
//!   decidida, para absorver evidência confirmada.
//! - `clear_adaptive_data`: chamado na fronteira de documento, para esquecer
//!   o estado acumulado.
//!
//! Os dois ganchos adaptativos têm implementação padrão vazia: a maioria dos
//! geradores é pura e só precisa implementar `create_features`.
//!
//! ## Configuração
//!
//! Cada gerador tem um struct de configuração tipado, validado uma única vez
//! na construção. O construtor `from_options` aceita o mapa plano
//! chave→valor vindo dos parâmetros de treinamento e falha imediatamente em
//! opção ausente ou inválida.

use std::collections::HashMap;

use tracing::trace;

use crate::error::ConfigError;
use crate::shape::{shape_class, ShapeMode};

/// Vetor de features de um token: descritores `nome=valor` em ordem de
/// inserção, duplicatas permitidas.
pub type Features = Vec<String>;

/// Contrato de um gerador de features.
///
/// Cada gerador deve ser testável isoladamente a partir de um array de
/// tokens, um índice e o histórico de outcomes — nenhum gerador depende do
/// estado interno de outro.
pub trait FeatureGenerator {
    /// Emite as features do token em `index` no final de `features`.
    ///
    /// `outcomes` contém os rótulos já decididos da passada atual; apenas
    /// posições anteriores a `index` podem ser lidas.
    fn create_features(
        &self,
        features: &mut Features,
        tokens: &[String],
        index: usize,
        outcomes: &[String],
    );

    /// Absorve uma sentença finalizada (tokens + outcomes definitivos).
    fn update_adaptive_data(&mut self, _tokens: &[String], _outcomes: &[String]) {}

    /// Esquece o estado adaptativo acumulado (fronteira de documento).
    fn clear_adaptive_data(&mut self) {}
}

/// Lê uma opção obrigatória do mapa de configuração.
pub(crate) fn required<'a>(
    options: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, ConfigError> {
    options
        .get(key)
        .map(String::as_str)
        .ok_or(ConfigError::MissingOption(key))
}

/// Lê e interpreta uma opção numérica obrigatória.
pub(crate) fn required_usize(
    options: &HashMap<String, String>,
    key: &'static str,
) -> Result<usize, ConfigError> {
    let raw = required(options, key)?;
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

/// Interpreta uma opção booleana (`"true"`/`"false"`, caso-insensível).
pub(crate) fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" => Ok(true),
        "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}

/// Sufixo do token com no máximo `len` caracteres (respeitando UTF-8).
pub(crate) fn suffix(token: &str, len: usize) -> &str {
    let total = token.chars().count();
    let skip = total.saturating_sub(len);
    match token.char_indices().nth(skip) {
        Some((byte, _)) => &token[byte..],
        None => token,
    }
}

// ============================================================================
// Feature de classe de token (forma da palavra)
// ============================================================================

/// Configuração da [`TokenClassFeature`].
#[derive(Debug, Clone)]
pub struct TokenClassConfig {
    /// Variante do classificador de forma (NERC ou POS).
    pub mode: ShapeMode,
    /// Se a feature conjunta palavra+classe usa o token em minúsculas.
    pub lowercase: bool,
    /// Se a feature conjunta `w&c=` deve ser emitida.
    pub word_and_class: bool,
}

/// Emite a classe de forma do token (`wc=` no modo NERC, `WC4POS=` no modo
/// POS) e, opcionalmente, a feature conjunta `w&c=palavra,classe`.
#[derive(Debug, Clone)]
pub struct TokenClassFeature {
    config: TokenClassConfig,
}

impl TokenClassFeature {
    pub fn new(config: TokenClassConfig) -> Self {
        Self { config }
    }

    /// Constrói a partir do mapa de opções: `type` (obrigatório, `NERC` ou
    /// `POS`) e `range` (opcional, `"lower,wac"` liga minúsculas e a feature
    /// conjunta; qualquer outro valor nos campos desliga).
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mode = ShapeMode::from_option(required(options, "type")?)?;
        let (mut lowercase, mut word_and_class) = (false, false);
        if let Some(range) = options.get("range") {
            let fields: Vec<&str> = range.split(',').collect();
            if fields.len() != 2 {
                return Err(ConfigError::InvalidValue {
                    key: "range",
                    value: range.clone(),
                });
            }
            lowercase = fields[0].eq_ignore_ascii_case("lower");
            word_and_class = fields[1].eq_ignore_ascii_case("wac");
        }
        Ok(Self::new(TokenClassConfig {
            mode,
            lowercase,
            word_and_class,
        }))
    }
}

impl FeatureGenerator for TokenClassFeature {
    fn create_features(
        &self,
        features: &mut Features,
        tokens: &[String],
        index: usize,
        _outcomes: &[String],
    ) {
        let token = &tokens[index];
        let class = shape_class(token, self.config.mode);
        match self.config.mode {
            ShapeMode::Nerc => features.push(format!("wc={class}")),
            ShapeMode::Pos => features.push(format!("WC4POS={class}")),
        }
        if self.config.word_and_class {
            if self.config.lowercase {
                features.push(format!("w&c={},{class}", token.to_lowercase()));
            } else {
                features.push(format!("w&c={token},{class}"));
            }
        }
        trace!(token = %token, class, "classe de forma");
    }
}

// ============================================================================
// Feature de sufixo
// ============================================================================

/// Configuração da [`SuffixFeature`]: intervalo contíguo `[begin, end)` de
/// slots de sufixo (o comprimento do slot `i` é `i + 1`).
#[derive(Debug, Clone)]
pub struct SuffixConfig {
    pub begin: usize,
    pub end: usize,
}

/// Emite `suf=` para cada comprimento de sufixo configurado. O comprimento é
/// truncado para nunca exceder o tamanho do token (no caso degenerado o
/// sufixo é o token inteiro).
#[derive(Debug, Clone)]
pub struct SuffixFeature {
    config: SuffixConfig,
}

impl SuffixFeature {
    pub fn new(config: SuffixConfig) -> Result<Self, ConfigError> {
        if config.begin > config.end {
            return Err(ConfigError::InvalidValue {
                key: "begin",
                value: format!("{} > end={}", config.begin, config.end),
            });
        }
        Ok(Self { config })
    }

    /// Constrói a partir das opções `begin` e `end` (ambas obrigatórias).
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::new(SuffixConfig {
            begin: required_usize(options, "begin")?,
            end: required_usize(options, "end")?,
        })
    }

    /// Sufixos do token para o intervalo configurado.
    pub fn suffixes<'a>(&self, token: &'a str) -> Vec<&'a str> {
        (self.config.begin..self.config.end)
            .map(|i| suffix(token, i + 1))
            .collect()
    }
}

impl FeatureGenerator for SuffixFeature {
    fn create_features(
        &self,
        features: &mut Features,
        tokens: &[String],
        index: usize,
        _outcomes: &[String],
    ) {
        for suf in self.suffixes(&tokens[index]) {
            features.push(format!("suf={suf}"));
        }
    }
}

// ============================================================================
// Feature de trigrama (tokens e classes de forma em janela simétrica)
// ============================================================================

/// Configuração da [`TrigramFeature`].
#[derive(Debug, Clone)]
pub struct TrigramConfig {
    pub mode: ShapeMode,
}

/// Emite o trigrama de superfícies e o trigrama de classes de forma, em
/// janela simétrica: dois tokens anteriores + atual (somente quando
/// `index > 1`) e atual + dois seguintes (somente quando
/// `index + 2 < tokens.len()`). Perto das bordas da sentença o lado
/// incompleto não emite nada.
#[derive(Debug, Clone)]
pub struct TrigramFeature {
    config: TrigramConfig,
}

impl TrigramFeature {
    pub fn new(config: TrigramConfig) -> Self {
        Self { config }
    }

    /// Constrói a partir da opção obrigatória `type` (`NERC` ou `POS`).
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Ok(Self::new(TrigramConfig {
            mode: ShapeMode::from_option(required(options, "type")?)?,
        }))
    }
}

impl FeatureGenerator for TrigramFeature {
    fn create_features(
        &self,
        features: &mut Features,
        tokens: &[String],
        index: usize,
        _outcomes: &[String],
    ) {
        let mode = self.config.mode;
        if index > 1 {
            features.push(format!(
                "ppw,pw,w={},{},{}",
                tokens[index - 2],
                tokens[index - 1],
                tokens[index]
            ));
            features.push(format!(
                "ppwc,pwc,wc={},{},{}",
                shape_class(&tokens[index - 2], mode),
                shape_class(&tokens[index - 1], mode),
                shape_class(&tokens[index], mode)
            ));
        }
        if index + 2 < tokens.len() {
            features.push(format!(
                "w,nw,nnw={},{},{}",
                tokens[index],
                tokens[index + 1],
                tokens[index + 2]
            ));
            features.push(format!(
                "wc,nwc,nnwc={},{},{}",
                shape_class(&tokens[index], mode),
                shape_class(&tokens[index + 1], mode),
                shape_class(&tokens[index + 2], mode)
            ));
        }
    }
}

//! # Features de Outcomes Anteriores e Sublabels
//!
//! Geradores que olham para o **histórico de decisões** da passada atual em
//! vez da superfície dos tokens. Obedecem à restrição causal: apenas
//! outcomes de índices estritamente menores que o índice corrente são lidos;
//! posições antes do início da sentença recebem o sentinela `*SB*`.

use std::collections::HashMap;

use regex::Regex;

use crate::error::ConfigError;
use crate::features::{parse_bool, required, required_usize, FeatureGenerator, Features};
use crate::shape::{shape_class, ShapeMode};

/// Sentinela de fronteira de sentença usado no lugar de outcomes
/// inexistentes (posições anteriores ao índice 0).
pub const SENTENCE_BOUNDARY: &str = "*SB*";

// ============================================================================
// Feature de n-gramas de outcomes anteriores
// ============================================================================

/// Configuração da [`PrevOutcomeFeature`].
#[derive(Debug, Clone)]
pub struct PrevOutcomeConfig {
    /// Quantos outcomes anteriores olhar (lookback R ≥ 1).
    pub outcomes_range: usize,
    /// Se os n-gramas cumulativos (`tag-2,tag-1=...`) devem ser emitidos.
    pub ngram_features: bool,
    /// Tamanho máximo dos n-gramas cumulativos.
    pub ngram_range: usize,
    /// Se a feature conjunta `po,w=` (outcome anterior + token) é emitida.
    pub outcome_token: bool,
    /// Se a feature conjunta `po,wf=` (outcome anterior + classe de forma)
    /// é emitida.
    pub outcome_token_class: bool,
    /// Variante do classificador de forma para `po,wf=`.
    pub mode: ShapeMode,
}

/// Emite features sobre os R outcomes anteriores:
///
/// - `tag-k=o` para k = 1..min(R, index+1), com `*SB*` para posições antes
///   do início da sentença;
/// - n-gramas cumulativos `tag-2,tag-1=o2,o1`, `tag-3,tag-2,tag-1=...`, até
///   `ngram_range`, quando habilitados;
/// - as features conjuntas opcionais `po,w=` e `po,wf=`.
#[derive(Debug, Clone)]
pub struct PrevOutcomeFeature {
    config: PrevOutcomeConfig,
}

impl PrevOutcomeFeature {
    pub fn new(config: PrevOutcomeConfig) -> Result<Self, ConfigError> {
        if config.outcomes_range == 0 {
            return Err(ConfigError::InvalidValue {
                key: "outcomesRange",
                value: "0".to_string(),
            });
        }
        if config.ngram_features && config.ngram_range == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ngramRange",
                value: "0".to_string(),
            });
        }
        Ok(Self { config })
    }

    /// Constrói a partir do mapa de opções: `outcomesRange`, `ngramFeatures`,
    /// `ngramRange`, `outcomeTokenFeature` e `outcomeTokenClassFeature` são
    /// obrigatórios; `type` é opcional e seleciona o classificador de forma
    /// para `po,wf=` (padrão `NERC`).
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mode = match options.get("type") {
            Some(raw) => ShapeMode::from_option(raw)?,
            None => ShapeMode::Nerc,
        };
        Self::new(PrevOutcomeConfig {
            outcomes_range: required_usize(options, "outcomesRange")?,
            ngram_features: parse_bool("ngramFeatures", required(options, "ngramFeatures")?)?,
            ngram_range: required_usize(options, "ngramRange")?,
            outcome_token: parse_bool(
                "outcomeTokenFeature",
                required(options, "outcomeTokenFeature")?,
            )?,
            outcome_token_class: parse_bool(
                "outcomeTokenClassFeature",
                required(options, "outcomeTokenClassFeature")?,
            )?,
            mode,
        })
    }
}

impl FeatureGenerator for PrevOutcomeFeature {
    fn create_features(
        &self,
        features: &mut Features,
        tokens: &[String],
        index: usize,
        outcomes: &[String],
    ) {
        let range = self.config.outcomes_range;

        // Outcomes anteriores, do mais recente para o mais antigo, com o
        // sentinela para posições fora da sentença
        let prev_all: Vec<&str> = (1..=range)
            .map(|k| {
                if index >= k {
                    outcomes[index - k].as_str()
                } else {
                    SENTENCE_BOUNDARY
                }
            })
            .collect();

        // Dentro da sentença só existem index+1 posições decidíveis
        let max_len = range.min(index + 1);
        let prev_tags = &prev_all[..max_len];
        for (k, tag) in prev_tags.iter().enumerate() {
            features.push(format!("tag-{}={}", k + 1, tag));
        }

        if self.config.ngram_features {
            let mut values = prev_tags[0].to_string();
            let mut label = String::from("tag-1");
            for (x, tag) in prev_tags.iter().enumerate().skip(1) {
                if x < self.config.ngram_range {
                    values = format!("{tag},{values}");
                    label = format!("tag-{},{label}", x + 1);
                    features.push(format!("{label}={values}"));
                }
            }
        }

        if self.config.outcome_token {
            features.push(format!("po,w={},{}", prev_all[0], tokens[index]));
        }
        if self.config.outcome_token_class {
            features.push(format!(
                "po,wf={},{}",
                prev_all[0],
                shape_class(&tokens[index], self.config.mode)
            ));
        }
    }
}

// ============================================================================
// Feature de sublabels (tags morfossintáticas finas)
// ============================================================================

/// Configuração da [`SublabelFeature`].
///
/// `classes` associa o nome de cada classe gramatical (ex.: `number`,
/// `gender`, `case`) a um padrão de expressão regular sobre os valores
/// possíveis (ex.: `pl|sg`). A ordem do vetor é a ordem de prioridade de
/// casamento.
#[derive(Debug, Clone)]
pub struct SublabelConfig {
    /// Separador entre sublabels dentro de um outcome fino
    /// (ex.: o `:` em `subst:sg:gen:m`).
    pub separator: String,
    /// Se o primeiro componente deve ser emitido como `prevPOS=` (classe
    /// gramatical grossa).
    pub word_class: bool,
    /// Pares (nome da classe, padrão regex), em ordem de prioridade.
    pub classes: Vec<(String, String)>,
}

/// Divide o outcome do token imediatamente anterior em sublabels e emite,
/// para cada componente, a primeira classe configurada cujo padrão casa por
/// inteiro: `prevNumber=sg`, `prevGender=m`, etc. Nada é emitido no índice 0
/// (não há predecessor).
pub struct SublabelFeature {
    separator: String,
    word_class: bool,
    // Nome da feature já prefixado ("prevNumber") + padrão ancorado
    classes: Vec<(String, Regex)>,
}

impl SublabelFeature {
    pub fn new(config: SublabelConfig) -> Result<Self, ConfigError> {
        if config.separator.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "separator",
                value: String::new(),
            });
        }
        let mut classes = Vec::with_capacity(config.classes.len());
        for (name, pattern) in &config.classes {
            // Casamento por inteiro, como Pattern.matches
            let anchored = format!("^(?:{pattern})$");
            let regex = Regex::new(&anchored).map_err(|source| ConfigError::InvalidPattern {
                class: name.clone(),
                source,
            })?;
            classes.push((feature_name(name), regex));
        }
        Ok(Self {
            separator: config.separator,
            word_class: config.word_class,
            classes,
        })
    }

    /// Constrói a partir do mapa de opções: `separator` é obrigatório,
    /// `wordClass` é opcional (padrão `false`) e toda outra chave define uma
    /// classe de sublabel com seu padrão. As classes são ordenadas pelo nome
    /// da chave para que a prioridade de casamento seja determinística.
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let separator = required(options, "separator")?.to_string();
        let word_class = match options.get("wordClass") {
            Some(raw) => parse_bool("wordClass", raw)?,
            None => false,
        };
        let mut classes: Vec<(String, String)> = options
            .iter()
            .filter(|(key, _)| key.as_str() != "separator" && key.as_str() != "wordClass")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        classes.sort_by(|a, b| a.0.cmp(&b.0));
        Self::new(SublabelConfig {
            separator,
            word_class,
            classes,
        })
    }
}

impl FeatureGenerator for SublabelFeature {
    fn create_features(
        &self,
        features: &mut Features,
        _tokens: &[String],
        index: usize,
        outcomes: &[String],
    ) {
        if index == 0 {
            return;
        }
        let previous = &outcomes[index - 1];
        let parts: Vec<&str> = previous.split(self.separator.as_str()).collect();

        if self.word_class {
            features.push(format!("prevPOS={}", parts[0]));
        }

        for part in &parts {
            // Descarta um eventual qualificador após o hífen (ex.: "pl-2")
            let value = part.split('-').next().unwrap_or(part);
            for (name, regex) in &self.classes {
                if regex.is_match(value) {
                    features.push(format!("{name}={value}"));
                    break;
                }
            }
        }
    }
}

/// `number` → `prevNumber`, como os nomes de feature do tagset fino.
fn feature_name(class: &str) -> String {
    let mut chars = class.chars();
    match chars.next() {
        Some(first) => format!("prev{}{}", first.to_uppercase(), chars.as_str()),
        None => "prev".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn full_config(range: usize, ngrams: bool, ngram_range: usize) -> PrevOutcomeConfig {
        PrevOutcomeConfig {
            outcomes_range: range,
            ngram_features: ngrams,
            ngram_range,
            outcome_token: false,
            outcome_token_class: false,
            mode: ShapeMode::Nerc,
        }
    }

    #[test]
    fn test_prev_outcome_offsets_and_sentinel() {
        let gen = PrevOutcomeFeature::new(full_config(3, false, 0)).unwrap();
        let tokens = toks(&["Lula", "visitou", "Paris"]);
        let outcomes = toks(&["B-PER", "O"]);

        // índice 1: min(3, 2) = 2 features de offset
        let mut features = Features::new();
        gen.create_features(&mut features, &tokens, 1, &outcomes);
        assert_eq!(features, vec!["tag-1=B-PER", "tag-2=*SB*"]);

        // índice 0: min(3, 1) = 1 feature, tudo sentinela
        let mut features = Features::new();
        gen.create_features(&mut features, &tokens, 0, &[]);
        assert_eq!(features, vec!["tag-1=*SB*"]);

        // índice 2: lookback completo dentro da sentença
        let mut features = Features::new();
        gen.create_features(&mut features, &tokens, 2, &outcomes);
        assert_eq!(features, vec!["tag-1=O", "tag-2=B-PER", "tag-3=*SB*"]);
    }

    #[test]
    fn test_prev_outcome_offset_count_property() {
        let gen = PrevOutcomeFeature::new(full_config(4, false, 0)).unwrap();
        let tokens = toks(&["a", "b", "c", "d", "e", "f"]);
        let outcomes = toks(&["O", "O", "O", "O", "O", "O"]);
        for index in 0..tokens.len() {
            let mut features = Features::new();
            gen.create_features(&mut features, &tokens, index, &outcomes);
            assert_eq!(features.len(), 4.min(index + 1));
        }
    }

    #[test]
    fn test_prev_outcome_cumulative_ngrams() {
        let gen = PrevOutcomeFeature::new(full_config(3, true, 3)).unwrap();
        let tokens = toks(&["a", "b", "c", "d"]);
        let outcomes = toks(&["B-ORG", "I-ORG", "O"]);
        let mut features = Features::new();
        gen.create_features(&mut features, &tokens, 3, &outcomes);
        assert_eq!(
            features,
            vec![
                "tag-1=O",
                "tag-2=I-ORG",
                "tag-3=B-ORG",
                "tag-2,tag-1=I-ORG,O",
                "tag-3,tag-2,tag-1=B-ORG,I-ORG,O",
            ]
        );
    }

    #[test]
    fn test_prev_outcome_ngram_range_limits_depth() {
        let gen = PrevOutcomeFeature::new(full_config(3, true, 2)).unwrap();
        let tokens = toks(&["a", "b", "c", "d"]);
        let outcomes = toks(&["B-ORG", "I-ORG", "O"]);
        let mut features = Features::new();
        gen.create_features(&mut features, &tokens, 3, &outcomes);
        // Só o bigrama cumulativo; o trigrama excede ngramRange=2
        assert!(features.contains(&"tag-2,tag-1=I-ORG,O".to_string()));
        assert!(!features.iter().any(|f| f.starts_with("tag-3,tag-2,tag-1=")));
    }

    #[test]
    fn test_prev_outcome_joint_features() {
        let mut config = full_config(2, false, 0);
        config.outcome_token = true;
        config.outcome_token_class = true;
        let gen = PrevOutcomeFeature::new(config).unwrap();
        let tokens = toks(&["Lula", "visitou"]);
        let outcomes = toks(&["B-PER"]);
        let mut features = Features::new();
        gen.create_features(&mut features, &tokens, 1, &outcomes);
        assert!(features.contains(&"po,w=B-PER,visitou".to_string()));
        assert!(features.contains(&"po,wf=B-PER,lc".to_string()));
    }

    #[test]
    fn test_prev_outcome_invalid_config() {
        assert!(PrevOutcomeFeature::new(full_config(0, false, 0)).is_err());
        assert!(PrevOutcomeFeature::new(full_config(2, true, 0)).is_err());
    }

    fn sublabel_gen() -> SublabelFeature {
        SublabelFeature::new(SublabelConfig {
            separator: ":".to_string(),
            word_class: true,
            classes: vec![
                ("number".to_string(), "pl|sg".to_string()),
                ("gender".to_string(), "m1|m2|m3|f|n".to_string()),
                ("case".to_string(), "nom|gen|dat|acc|inst|loc|voc".to_string()),
            ],
        })
        .unwrap()
    }

    #[test]
    fn test_sublabel_splits_previous_outcome() {
        let gen = sublabel_gen();
        let tokens = toks(&["domy", "stoją"]);
        let outcomes = toks(&["subst:pl:nom:m3"]);
        let mut features = Features::new();
        gen.create_features(&mut features, &tokens, 1, &outcomes);
        assert_eq!(
            features,
            vec![
                "prevPOS=subst",
                "prevNumber=pl",
                "prevCase=nom",
                "prevGender=m3",
            ]
        );
    }

    #[test]
    fn test_sublabel_nothing_at_index_zero() {
        let gen = sublabel_gen();
        let tokens = toks(&["domy"]);
        let mut features = Features::new();
        gen.create_features(&mut features, &tokens, 0, &[]);
        assert!(features.is_empty());
    }

    #[test]
    fn test_sublabel_full_match_only() {
        // "plx" não casa "pl|sg" por inteiro
        let gen = sublabel_gen();
        let tokens = toks(&["a", "b"]);
        let outcomes = toks(&["subst:plx"]);
        let mut features = Features::new();
        gen.create_features(&mut features, &tokens, 1, &outcomes);
        assert_eq!(features, vec!["prevPOS=subst"]);
    }

    #[test]
    fn test_sublabel_strips_hyphen_qualifier() {
        let gen = sublabel_gen();
        let tokens = toks(&["a", "b"]);
        let outcomes = toks(&["subst:sg-2"]);
        let mut features = Features::new();
        gen.create_features(&mut features, &tokens, 1, &outcomes);
        assert!(features.contains(&"prevNumber=sg".to_string()));
    }

    #[test]
    fn test_sublabel_invalid_config() {
        assert!(SublabelFeature::new(SublabelConfig {
            separator: String::new(),
            word_class: false,
            classes: vec![],
        })
        .is_err());
        assert!(SublabelFeature::new(SublabelConfig {
            separator: ":".to_string(),
            word_class: false,
            classes: vec![("broken".to_string(), "(".to_string())],
        })
        .is_err());
    }
}

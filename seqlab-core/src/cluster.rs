//! # Feature de Caminhos de Cluster
//!
//! Consome um recurso externo de clustering (Brown, word2vec, Clark...) que
//! expõe apenas `lookup(token) -> classe opaca`. A classe é uma string cujo
//! prefixo em comprimentos crescentes codifica uma hierarquia: prefixos
//! curtos são clusters grossos, prefixos longos são clusters finos. O gerador
//! emite uma feature por prefixo configurado.

use std::collections::HashMap;
use std::sync::Arc;

use crate::features::{suffix, FeatureGenerator, Features};

/// Recurso de clustering somente-leitura. Implementações devem ser seguras
/// para compartilhar entre threads (o mapa nunca muda após a construção).
pub trait ClusterLexicon {
    /// Classe opaca do token, ou `None` se o token não está no recurso.
    fn lookup(&self, token: &str) -> Option<&str>;
}

impl ClusterLexicon for HashMap<String, String> {
    fn lookup(&self, token: &str) -> Option<&str> {
        self.get(token).map(String::as_str)
    }
}

/// Comprimentos de prefixo padrão para caminhos de cluster de Brown.
pub const DEFAULT_PATH_LENGTHS: [usize; 4] = [4, 6, 10, 20];

/// Emite, para o token corrente, uma feature `{attr}={prefixo}` por
/// comprimento de caminho configurado:
///
/// - o primeiro prefixo é sempre emitido (truncado ao tamanho da classe);
/// - cada comprimento seguinte só é emitido se o comprimento anterior ainda
///   era menor que a classe inteira (sem prefixos duplicados);
/// - quando o token não está no recurso, emite como fallback os últimos 4
///   caracteres do próprio token, sob a mesma chave de atributo.
pub struct ClusterFeature {
    attribute: String,
    path_lengths: Vec<usize>,
    lexicon: Arc<dyn ClusterLexicon + Send + Sync>,
}

impl ClusterFeature {
    /// `attribute` é o nome do recurso (ex.: `"brown"`), usado como chave das
    /// features emitidas. `path_lengths` deve ser não-vazio e estritamente
    /// crescente.
    ///
    /// # Panics
    /// Se `path_lengths` é vazio ou não é estritamente crescente (erro de
    /// configuração programática, não de entrada do usuário).
    pub fn new(
        attribute: impl Into<String>,
        path_lengths: Vec<usize>,
        lexicon: Arc<dyn ClusterLexicon + Send + Sync>,
    ) -> Self {
        assert!(!path_lengths.is_empty(), "path_lengths não pode ser vazio");
        assert!(
            path_lengths.windows(2).all(|w| w[0] < w[1]),
            "path_lengths deve ser estritamente crescente"
        );
        Self {
            attribute: attribute.into(),
            path_lengths,
            lexicon,
        }
    }

    /// Construtor com os comprimentos padrão de Brown (4, 6, 10, 20).
    pub fn with_default_lengths(
        attribute: impl Into<String>,
        lexicon: Arc<dyn ClusterLexicon + Send + Sync>,
    ) -> Self {
        Self::new(attribute, DEFAULT_PATH_LENGTHS.to_vec(), lexicon)
    }

    /// Prefixos da classe nos comprimentos configurados, sem duplicados.
    fn path_prefixes<'a>(&self, class: &'a str) -> Vec<&'a str> {
        let class_len = class.chars().count();
        let mut prefixes = Vec::with_capacity(self.path_lengths.len());
        prefixes.push(char_prefix(class, self.path_lengths[0]));
        for window in self.path_lengths.windows(2) {
            if window[0] < class_len {
                prefixes.push(char_prefix(class, window[1]));
            }
        }
        prefixes
    }
}

impl FeatureGenerator for ClusterFeature {
    fn create_features(
        &self,
        features: &mut Features,
        tokens: &[String],
        index: usize,
        _outcomes: &[String],
    ) {
        let token = &tokens[index];
        match self.lexicon.lookup(token) {
            Some(class) => {
                for prefix in self.path_prefixes(class) {
                    features.push(format!("{}={}", self.attribute, prefix));
                }
            }
            None => {
                features.push(format!("{}={}", self.attribute, suffix(token, 4)));
            }
        }
    }
}

/// Primeiros `len` caracteres (não bytes), ou a string inteira se menor.
fn char_prefix(s: &str, len: usize) -> &str {
    match s.char_indices().nth(len) {
        Some((byte_index, _)) => &s[..byte_index],
        None => s,
    }
}

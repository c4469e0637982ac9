//! # Gazetteers e Etiquetagem por Dicionário
//!
//! Um [`Dictionary`] guarda pares `(forma de superfície, tipo)` — a forma
//! pode ter vários tokens ("nova york"). O [`DictionaryTagger`] varre uma
//! sentença contra um ou mais dicionários, emite os spans brutos de toda
//! ocorrência exata e resolve sobreposições em um conjunto final disjunto.
//!
//! A resolução de sobreposições é **por ordem de descoberta**: ordem dos
//! dicionários, depois ordem das entradas, depois ordem de varredura na
//! sentença. O primeiro span aceito bloqueia qualquer span posterior que o
//! sobreponha, independentemente de comprimento. Reordenar os dicionários
//! muda o resultado — a ordem faz parte da configuração.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cluster::ClusterLexicon;
use crate::error::ConfigError;
use crate::span::{Entity, Span};

/// Modo de comparação de tokens de um dicionário.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    /// Comparação exata.
    Sensitive,
    /// Ambos os lados são convertidos para minúsculas antes de comparar.
    Insensitive,
}

/// Gazetteer: lista ordenada de formas de superfície com seus tipos.
///
/// As entradas preservam a ordem de inserção (a ordem de descoberta dos
/// spans depende dela). Um índice auxiliar dá o caminho rápido
/// `lookup(token)` para entradas de um único token, usado pelos geradores
/// de features.
#[derive(Debug, Clone)]
pub struct Dictionary {
    case_mode: CaseMode,
    entries: Vec<(Vec<String>, String)>,
    index: HashMap<String, String>,
}

impl Dictionary {
    pub fn new(case_mode: CaseMode) -> Self {
        Self {
            case_mode,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn case_mode(&self) -> CaseMode {
        self.case_mode
    }

    /// Insere um par (forma de superfície, tipo). A forma é normalizada pelo
    /// modo do dicionário e separada em tokens por espaço em branco; formas
    /// vazias são ignoradas.
    pub fn insert(&mut self, surface: &str, label: impl Into<String>) {
        let normalized = self.normalize(surface);
        let run: Vec<String> = normalized
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if run.is_empty() {
            return;
        }
        let label = label.into();
        if run.len() == 1 {
            // A primeira entrada de um token vence no caminho rápido
            self.index.entry(run[0].clone()).or_insert_with(|| label.clone());
        }
        self.entries.push((run, label));
    }

    /// Carrega um gazetteer de um array JSON de pares
    /// `[["nova york", "LOC"], ...]`, preservando a ordem do arquivo.
    pub fn from_json(case_mode: CaseMode, json: &str) -> Result<Self, ConfigError> {
        let pairs: Vec<(String, String)> = serde_json::from_str(json)?;
        let mut dictionary = Self::new(case_mode);
        for (surface, label) in &pairs {
            dictionary.insert(surface, label);
        }
        Ok(dictionary)
    }

    /// Caminho rápido para entradas de um único token: o tipo da primeira
    /// entrada cuja forma normalizada é exatamente `token`.
    pub fn lookup(&self, token: &str) -> Option<&str> {
        self.index.get(&self.normalize(token)).map(String::as_str)
    }

    /// Pares (tokens da forma, tipo) na ordem de inserção.
    pub fn entries(&self) -> &[(Vec<String>, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn normalize(&self, s: &str) -> String {
        match self.case_mode {
            CaseMode::Sensitive => s.to_string(),
            CaseMode::Insensitive => s.to_lowercase(),
        }
    }
}

impl ClusterLexicon for Dictionary {
    fn lookup(&self, token: &str) -> Option<&str> {
        Dictionary::lookup(self, token)
    }
}

/// Etiquetador por varredura de gazetteers, em ordem fixa de prioridade.
#[derive(Debug, Clone, Default)]
pub struct DictionaryTagger {
    dictionaries: Vec<Dictionary>,
}

impl DictionaryTagger {
    /// A ordem do vetor é a ordem de prioridade na resolução de
    /// sobreposições.
    pub fn new(dictionaries: Vec<Dictionary>) -> Self {
        Self { dictionaries }
    }

    /// Spans brutos de toda ocorrência de toda entrada, em ordem de
    /// descoberta (dicionário → entrada → posição na sentença). Pode conter
    /// sobreposições e duplicatas.
    pub fn raw_spans(&self, tokens: &[String]) -> Vec<Span> {
        let mut spans = Vec::new();
        for dictionary in &self.dictionaries {
            // Normaliza a sentença uma única vez por dicionário
            let haystack: Vec<String> =
                tokens.iter().map(|t| dictionary.normalize(t)).collect();
            for (run, label) in dictionary.entries() {
                if run.len() > haystack.len() {
                    continue;
                }
                for start in 0..=haystack.len() - run.len() {
                    if haystack[start..start + run.len()] == run[..] {
                        spans.push(Span::new(start, start + run.len(), label.clone()));
                    }
                }
            }
        }
        spans
    }

    /// Resolve sobreposições mantendo a ordem de descoberta: um span é
    /// aceito somente se não sobrepõe nenhum span já aceito. O resultado é
    /// disjunto dois a dois e determinístico para as mesmas entradas.
    pub fn drop_overlapping_spans(spans: Vec<Span>) -> Vec<Span> {
        let mut accepted: Vec<Span> = Vec::with_capacity(spans.len());
        for span in spans {
            if accepted.iter().all(|kept| !kept.overlaps(&span)) {
                accepted.push(span);
            }
        }
        accepted
    }

    /// Varre a sentença e materializa as entidades do conjunto final de
    /// spans.
    pub fn tag(&self, tokens: &[String]) -> Vec<Entity> {
        let raw = self.raw_spans(tokens);
        let accepted = Self::drop_overlapping_spans(raw);
        debug!(n_spans = accepted.len(), "spans aceitos pelo gazetteer");
        accepted.iter().map(|span| span.entity(tokens)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn dict(case_mode: CaseMode, pairs: &[(&str, &str)]) -> Dictionary {
        let mut d = Dictionary::new(case_mode);
        for (surface, label) in pairs {
            d.insert(surface, *label);
        }
        d
    }

    #[test]
    fn test_multi_token_insensitive_match() {
        let tagger = DictionaryTagger::new(vec![dict(
            CaseMode::Insensitive,
            &[("new york", "LOC")],
        )]);
        let tokens = toks(&["I", "visited", "New", "York", "City"]);
        let entities = tagger.tag(&tokens);
        // "City" fica de fora: a chave tem exatamente dois tokens
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].span, Span::new(2, 4, "LOC"));
        assert_eq!(entities[0].text, "New York");
    }

    #[test]
    fn test_case_sensitive_requires_exact_tokens() {
        let tagger = DictionaryTagger::new(vec![dict(
            CaseMode::Sensitive,
            &[("New York", "LOC")],
        )]);
        assert_eq!(tagger.tag(&toks(&["new", "york"])).len(), 0);
        assert_eq!(tagger.tag(&toks(&["New", "York"])).len(), 1);
    }

    #[test]
    fn test_first_discovered_span_wins_overlap() {
        let spans = vec![Span::new(0, 3, "ORG"), Span::new(1, 2, "PER")];
        let accepted = DictionaryTagger::drop_overlapping_spans(spans);
        assert_eq!(accepted, vec![Span::new(0, 3, "ORG")]);
    }

    #[test]
    fn test_earlier_dictionary_has_priority() {
        let first = dict(CaseMode::Insensitive, &[("banco central", "ORG")]);
        let second = dict(CaseMode::Insensitive, &[("central", "LOC")]);
        let tagger = DictionaryTagger::new(vec![first, second]);
        let tokens = toks(&["Banco", "Central", "anunciou"]);
        let entities = tagger.tag(&tokens);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].span, Span::new(0, 2, "ORG"));
    }

    #[test]
    fn test_accepted_spans_are_pairwise_disjoint_and_deterministic() {
        let tagger = DictionaryTagger::new(vec![dict(
            CaseMode::Insensitive,
            &[("a b", "X"), ("b c", "Y"), ("c", "Z")],
        )]);
        let tokens = toks(&["a", "b", "c", "a", "b"]);
        let first_run = tagger.tag(&tokens);
        let second_run = tagger.tag(&tokens);
        assert_eq!(first_run, second_run);
        for (i, x) in first_run.iter().enumerate() {
            for y in &first_run[i + 1..] {
                assert!(!x.span.overlaps(&y.span));
            }
        }
        // "a b" em (0,2) e (3,5); "c" em (2,3); "b c" bloqueado por ambos
        let spans: Vec<&Span> = first_run.iter().map(|e| &e.span).collect();
        assert_eq!(
            spans,
            vec![
                &Span::new(0, 2, "X"),
                &Span::new(3, 5, "X"),
                &Span::new(2, 3, "Z"),
            ]
        );
    }

    #[test]
    fn test_single_token_lookup_fast_path() {
        let d = dict(
            CaseMode::Insensitive,
            &[("Paris", "LOC"), ("paris", "PER")],
        );
        // A primeira entrada normalizada vence o caminho rápido
        assert_eq!(d.lookup("PARIS"), Some("LOC"));
        assert_eq!(d.lookup("Londres"), None);
    }

    #[test]
    fn test_from_json_preserves_order() {
        let json = r#"[["nova york", "LOC"], ["york", "PER"]]"#;
        let d = Dictionary::from_json(CaseMode::Insensitive, json).unwrap();
        assert_eq!(d.len(), 2);
        let tagger = DictionaryTagger::new(vec![d]);
        let entities = tagger.tag(&toks(&["Nova", "York"]));
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].label, "LOC");
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        assert!(Dictionary::from_json(CaseMode::Sensitive, "{broken").is_err());
    }
}

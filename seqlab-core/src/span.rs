//! # Spans e Entidades
//!
//! Um [`Span`] delimita um intervalo semiaberto `[start, end)` de índices de
//! **tokens** (não de bytes nem de caracteres) com um rótulo de tipo. Uma
//! [`Entity`] é o span materializado: o texto coberto já fatiado e juntado.

use serde::{Deserialize, Serialize};

/// Intervalo rotulado de tokens `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl Span {
    /// # Panics
    /// Se `start >= end` — um span nunca é vazio.
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        assert!(start < end, "span vazio ou invertido: [{start}, {end})");
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    /// Quantidade de tokens cobertos.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        false // start < end é invariante de construção
    }

    /// Dois spans se sobrepõem se compartilham ao menos um token.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Texto coberto pelo span, juntando os tokens com espaço.
    ///
    /// # Panics
    /// Se o span excede `tokens.len()`.
    pub fn covered_text(&self, tokens: &[String]) -> String {
        assert!(
            self.end <= tokens.len(),
            "span [{}, {}) excede a sentença de {} tokens",
            self.start,
            self.end,
            tokens.len()
        );
        tokens[self.start..self.end].join(" ")
    }

    /// Materializa o span em uma [`Entity`] sobre a sentença dada.
    pub fn entity(&self, tokens: &[String]) -> Entity {
        Entity {
            text: self.covered_text(tokens),
            label: self.label.clone(),
            span: self.clone(),
        }
    }
}

/// Entidade nomeada (ou outro segmento tipado) extraída de uma sentença.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Texto de superfície coberto.
    pub text: String,
    /// Tipo da entidade (ex.: `PER`, `ORG`, `LOC`).
    pub label: String,
    /// Posição na sentença, em índices de token.
    pub span: Span,
}

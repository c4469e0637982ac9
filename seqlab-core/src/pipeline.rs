//! # Pipeline de Features
//!
//! Compõe uma lista ordenada e fixa de geradores em um único produtor de
//! vetores de features. A lista é construída uma vez por configuração de
//! modelo e nunca muda durante a etiquetagem; uma instância do pipeline
//! pertence a uma única thread (geradores adaptativos carregam estado por
//! documento), mas várias instâncias podem ser construídas da mesma
//! configuração estática para paralelizar por documento.

use tracing::trace;

use crate::features::{FeatureGenerator, Features};

/// Produtor de vetores de features por token, composto de geradores.
pub struct FeaturePipeline {
    generators: Vec<Box<dyn FeatureGenerator>>,
}

impl FeaturePipeline {
    /// Um pipeline sem geradores é legal e produz vetores vazios.
    pub fn new(generators: Vec<Box<dyn FeatureGenerator>>) -> Self {
        Self { generators }
    }

    /// Extrai o vetor de features do token em `index`, invocando cada
    /// gerador na ordem da lista e concatenando as saídas. A ordem só
    /// importa para reprodutibilidade do vetor, não para o modelo.
    ///
    /// `outcomes` é o histórico causal da passada corrente: precisa cobrir
    /// ao menos os índices `0..index`.
    ///
    /// # Panics
    /// Se `index >= tokens.len()` ou `outcomes.len() < index`.
    pub fn get_context(
        &self,
        index: usize,
        tokens: &[String],
        outcomes: &[String],
    ) -> Features {
        assert!(
            index < tokens.len(),
            "índice {index} fora da sentença de {} tokens",
            tokens.len()
        );
        assert!(
            outcomes.len() >= index,
            "histórico de outcomes ({}) não cobre o índice {index}",
            outcomes.len()
        );
        let mut features = Features::new();
        for generator in &self.generators {
            generator.create_features(&mut features, tokens, index, outcomes);
        }
        trace!(index, n_features = features.len(), "contexto extraído");
        features
    }

    /// Notifica todos os geradores do fim de uma sentença etiquetada, para
    /// que atualizem seu estado adaptativo por documento.
    ///
    /// # Panics
    /// Se `tokens` e `outcomes` têm tamanhos diferentes.
    pub fn update_adaptive_data(&mut self, tokens: &[String], outcomes: &[String]) {
        assert!(
            tokens.len() == outcomes.len(),
            "tokens ({}) e outcomes ({}) com tamanhos diferentes",
            tokens.len(),
            outcomes.len()
        );
        for generator in &mut self.generators {
            generator.update_adaptive_data(tokens, outcomes);
        }
    }

    /// Descarta o estado adaptativo de todos os geradores (fronteira de
    /// documento).
    pub fn clear_adaptive_data(&mut self) {
        for generator in &mut self.generators {
            generator.clear_adaptive_data();
        }
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

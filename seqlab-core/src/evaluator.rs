//! # Avaliação de Etiquetadores de Sequências
//!
//! Consome um fluxo de amostras de referência, invoca um etiquetador externo
//! e acumula métricas em dois níveis: acurácia por palavra (total e, se um
//! vocabulário de treino foi fornecido, separada em conhecida/desconhecida)
//! e precisão/cobertura/F1 por entidade.
//!
//! Os acumuladores não são thread-safe; para avaliar em paralelo, cada shard
//! usa seu próprio [`Evaluator`] e as [`EvaluationMetrics`] resultantes são
//! combinadas com [`EvaluationMetrics::merge`] (ver [`evaluate_sharded`]).

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::debug;

use crate::span::Span;

/// Rótulo aplicado a spans de referência sem tipo (corpora no formato
/// antigo), para que comparem igual à saída do etiquetador.
pub const DEFAULT_LABEL: &str = "default";

/// Etiquetador externo avaliável: recebe tokens, devolve spans.
pub trait SequenceLabeler {
    fn tag(&mut self, tokens: &[String]) -> Vec<Span>;

    /// Descarta o estado adaptativo (fronteira de documento).
    fn clear_adaptive_data(&mut self);
}

/// Uma sentença de referência: tokens, spans ouro e o sinal de fronteira de
/// documento (limpar estado adaptativo antes desta amostra).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceSample {
    pub tokens: Vec<String>,
    pub sequences: Vec<Span>,
    pub clear_adaptive_data: bool,
}

// ============================================================================
// Acumuladores
// ============================================================================

/// Média corrente incremental.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean {
    sum: f64,
    count: u64,
}

impl Mean {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// Média das observações, ou `0.0` se nada foi observado.
    pub fn mean(&self) -> f64 {
        if self.count > 0 {
            self.sum / self.count as f64
        } else {
            0.0
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Combina dois acumuladores (avaliação por shards).
    pub fn merge(&mut self, other: &Mean) {
        self.sum += other.sum;
        self.count += other.count;
    }
}

/// Acumulador de precisão/cobertura/F1 por comparação exata de conjuntos de
/// spans (início, fim e tipo idênticos).
#[derive(Debug, Clone, Copy, Default)]
pub struct FMeasure {
    selected: u64,
    target: u64,
    true_positives: u64,
}

impl FMeasure {
    /// Acumula uma sentença: `references` são os spans ouro, `predictions`
    /// os spans do etiquetador.
    pub fn update_scores(&mut self, references: &[Span], predictions: &[Span]) {
        self.true_positives += count_true_positives(references, predictions);
        self.selected += predictions.len() as u64;
        self.target += references.len() as u64;
    }

    /// Verdadeiros positivos / spans preditos, ou `0.0` se nada foi predito.
    pub fn precision(&self) -> f64 {
        if self.selected > 0 {
            self.true_positives as f64 / self.selected as f64
        } else {
            0.0
        }
    }

    /// Verdadeiros positivos / spans ouro, ou `0.0` se não há referência.
    pub fn recall(&self) -> f64 {
        if self.target > 0 {
            self.true_positives as f64 / self.target as f64
        } else {
            0.0
        }
    }

    /// Média harmônica de precisão e cobertura, ou `-1.0` quando indefinida
    /// (ambas zero).
    pub fn f_measure(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            -1.0
        }
    }

    /// Combina dois acumuladores (avaliação por shards).
    pub fn merge(&mut self, other: &FMeasure) {
        self.selected += other.selected;
        self.target += other.target;
        self.true_positives += other.true_positives;
    }
}

/// Cada span predito casa no máximo uma referência (e vice-versa):
/// duplicatas na predição não inflam a contagem.
fn count_true_positives(references: &[Span], predictions: &[Span]) -> u64 {
    let mut used = vec![false; predictions.len()];
    let mut true_positives = 0;
    for reference in references {
        for (i, prediction) in predictions.iter().enumerate() {
            if !used[i] && reference == prediction {
                used[i] = true;
                true_positives += 1;
                break;
            }
        }
    }
    true_positives
}

/// Conjunto completo de métricas de uma avaliação, combinável entre shards.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationMetrics {
    pub f_measure: FMeasure,
    pub word_accuracy: Mean,
    pub known_accuracy: Mean,
    pub unknown_accuracy: Mean,
}

impl EvaluationMetrics {
    pub fn merge(&mut self, other: &EvaluationMetrics) {
        self.f_measure.merge(&other.f_measure);
        self.word_accuracy.merge(&other.word_accuracy);
        self.known_accuracy.merge(&other.known_accuracy);
        self.unknown_accuracy.merge(&other.unknown_accuracy);
    }
}

// ============================================================================
// Avaliador
// ============================================================================

/// Avalia um [`SequenceLabeler`] contra amostras de referência.
///
/// A comparação entre referência e predição é **posicional** (índice a
/// índice nos dois vetores de spans), preservada por compatibilidade com
/// números históricos de avaliação. Desalinhamentos não derrubam a
/// avaliação: uma posição sem predição correspondente pontua 0, tornando a
/// discrepância visível nas métricas.
pub struct Evaluator<L: SequenceLabeler> {
    labeler: L,
    vocabulary: Option<HashSet<String>>,
    metrics: EvaluationMetrics,
}

impl<L: SequenceLabeler> Evaluator<L> {
    /// `vocabulary` é o conjunto de tokens vistos no treino; quando
    /// presente, cada observação de acurácia também entra no balde
    /// conhecido/desconhecido.
    pub fn new(labeler: L, vocabulary: Option<HashSet<String>>) -> Self {
        Self {
            labeler,
            vocabulary,
            metrics: EvaluationMetrics::default(),
        }
    }

    /// Avalia uma amostra e devolve a amostra **predita** (mesmos tokens,
    /// spans do etiquetador) para relatório posterior. A referência nunca é
    /// mutada.
    pub fn evaluate_sample(&mut self, reference: &SequenceSample) -> SequenceSample {
        if reference.clear_adaptive_data {
            self.labeler.clear_adaptive_data();
        }
        let predicted = self.labeler.tag(&reference.tokens);

        // Spans de referência sem tipo recebem o rótulo padrão antes de
        // qualquer comparação
        let references: Vec<Span> = reference
            .sequences
            .iter()
            .map(|span| {
                if span.label.is_empty() {
                    Span::new(span.start, span.end, DEFAULT_LABEL)
                } else {
                    span.clone()
                }
            })
            .collect();

        for (i, gold) in references.iter().enumerate() {
            let score = match predicted.get(i) {
                Some(span) if span == gold => 1.0,
                _ => 0.0,
            };
            self.metrics.word_accuracy.add(score);
            if let Some(vocabulary) = &self.vocabulary {
                // Token fora do alcance conta como desconhecido, preservando
                // conhecidas + desconhecidas == total
                let known = reference
                    .tokens
                    .get(i)
                    .is_some_and(|token| vocabulary.contains(token));
                if known {
                    self.metrics.known_accuracy.add(score);
                } else {
                    self.metrics.unknown_accuracy.add(score);
                }
            }
        }
        self.metrics.f_measure.update_scores(&references, &predicted);
        debug!(
            n_gold = references.len(),
            n_predicted = predicted.len(),
            "amostra avaliada"
        );

        SequenceSample {
            tokens: reference.tokens.clone(),
            sequences: predicted,
            clear_adaptive_data: reference.clear_adaptive_data,
        }
    }

    /// Avalia todas as amostras do iterador, em ordem.
    pub fn evaluate<'a, I>(&mut self, samples: I)
    where
        I: IntoIterator<Item = &'a SequenceSample>,
    {
        for sample in samples {
            self.evaluate_sample(sample);
        }
    }

    pub fn f_measure(&self) -> &FMeasure {
        &self.metrics.f_measure
    }

    /// Acurácia por palavra: posições corretas / posições totais.
    pub fn word_accuracy(&self) -> f64 {
        self.metrics.word_accuracy.mean()
    }

    /// Acurácia sobre tokens presentes no vocabulário de treino.
    pub fn known_word_accuracy(&self) -> f64 {
        self.metrics.known_accuracy.mean()
    }

    /// Acurácia sobre tokens fora do vocabulário de treino.
    pub fn unknown_word_accuracy(&self) -> f64 {
        self.metrics.unknown_accuracy.mean()
    }

    /// Total de observações de acurácia por palavra.
    pub fn word_count(&self) -> u64 {
        self.metrics.word_accuracy.count()
    }

    pub fn known_word_count(&self) -> u64 {
        self.metrics.known_accuracy.count()
    }

    pub fn unknown_word_count(&self) -> u64 {
        self.metrics.unknown_accuracy.count()
    }

    pub fn metrics(&self) -> &EvaluationMetrics {
        &self.metrics
    }

    pub fn into_metrics(self) -> EvaluationMetrics {
        self.metrics
    }
}

/// Avaliação paralela por shards: cada chunk de amostras recebe seu próprio
/// etiquetador (construído pela fábrica) e seu próprio acumulador; as
/// métricas são combinadas no final. A fronteira de documento deve coincidir
/// com a fronteira dos chunks para etiquetadores adaptativos.
pub fn evaluate_sharded<L, F>(
    samples: &[SequenceSample],
    chunk_size: usize,
    vocabulary: Option<&HashSet<String>>,
    make_labeler: F,
) -> EvaluationMetrics
where
    L: SequenceLabeler,
    F: Fn() -> L + Sync,
{
    assert!(chunk_size > 0, "chunk_size deve ser positivo");
    samples
        .par_chunks(chunk_size)
        .map(|chunk| {
            let mut evaluator = Evaluator::new(make_labeler(), vocabulary.cloned());
            evaluator.evaluate(chunk);
            evaluator.into_metrics()
        })
        .reduce(EvaluationMetrics::default, |mut acc, metrics| {
            acc.merge(&metrics);
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    /// Etiquetador de teste que devolve spans fixos por sentença, na ordem
    /// em que foi programado.
    struct ScriptedLabeler {
        answers: Vec<Vec<Span>>,
        next: usize,
        cleared: usize,
    }

    impl ScriptedLabeler {
        fn new(answers: Vec<Vec<Span>>) -> Self {
            Self {
                answers,
                next: 0,
                cleared: 0,
            }
        }
    }

    impl SequenceLabeler for ScriptedLabeler {
        fn tag(&mut self, _tokens: &[String]) -> Vec<Span> {
            let answer = self.answers[self.next].clone();
            self.next += 1;
            answer
        }

        fn clear_adaptive_data(&mut self) {
            self.cleared += 1;
        }
    }

    fn sample(tokens: &[&str], spans: Vec<Span>, clear: bool) -> SequenceSample {
        SequenceSample {
            tokens: toks(tokens),
            sequences: spans,
            clear_adaptive_data: clear,
        }
    }

    #[test]
    fn test_perfect_labeler_scores_one() {
        let gold = vec![Span::new(0, 2, "PER"), Span::new(4, 5, "ORG")];
        let labeler = ScriptedLabeler::new(vec![gold.clone()]);
        let mut evaluator = Evaluator::new(labeler, None);
        let reference = sample(&["John", "Smith", "works", "at", "Acme"], gold, false);
        let predicted = evaluator.evaluate_sample(&reference);

        assert_eq!(evaluator.word_accuracy(), 1.0);
        assert_eq!(evaluator.f_measure().f_measure(), 1.0);
        assert_eq!(evaluator.f_measure().precision(), 1.0);
        assert_eq!(evaluator.f_measure().recall(), 1.0);
        assert_eq!(predicted.tokens, reference.tokens);
        assert_eq!(predicted.sequences, reference.sequences);
    }

    #[test]
    fn test_accuracy_in_unit_interval_and_bucket_sum() {
        let gold = vec![Span::new(0, 1, "PER"), Span::new(2, 3, "LOC")];
        // Acerta o primeiro span, erra o segundo
        let labeler = ScriptedLabeler::new(vec![vec![
            Span::new(0, 1, "PER"),
            Span::new(2, 3, "ORG"),
        ]]);
        let vocabulary: HashSet<String> = toks(&["Maria"]).into_iter().collect();
        let mut evaluator = Evaluator::new(labeler, Some(vocabulary));
        evaluator.evaluate_sample(&sample(&["Maria", "foi", "Lisboa"], gold, false));

        assert_eq!(evaluator.word_accuracy(), 0.5);
        assert!(evaluator.word_accuracy() >= 0.0 && evaluator.word_accuracy() <= 1.0);
        assert_eq!(
            evaluator.known_word_count() + evaluator.unknown_word_count(),
            evaluator.word_count()
        );
        // "Maria" (posição 0) é conhecida e correta; "foi" (posição 1) é
        // desconhecida e incorreta
        assert_eq!(evaluator.known_word_accuracy(), 1.0);
        assert_eq!(evaluator.unknown_word_accuracy(), 0.0);
    }

    #[test]
    fn test_missing_prediction_scores_zero_without_panicking() {
        let gold = vec![Span::new(0, 1, "PER"), Span::new(2, 3, "LOC")];
        let labeler = ScriptedLabeler::new(vec![vec![Span::new(0, 1, "PER")]]);
        let mut evaluator = Evaluator::new(labeler, None);
        evaluator.evaluate_sample(&sample(&["a", "b", "c"], gold, false));
        assert_eq!(evaluator.word_accuracy(), 0.5);
        assert_eq!(evaluator.word_count(), 2);
    }

    #[test]
    fn test_empty_reference_label_normalized_to_default() {
        let gold = vec![Span::new(0, 1, "")];
        let labeler = ScriptedLabeler::new(vec![vec![Span::new(0, 1, DEFAULT_LABEL)]]);
        let mut evaluator = Evaluator::new(labeler, None);
        let reference = sample(&["Paris"], gold.clone(), false);
        evaluator.evaluate_sample(&reference);
        assert_eq!(evaluator.word_accuracy(), 1.0);
        // A amostra de referência não foi mutada
        assert_eq!(reference.sequences, gold);
    }

    #[test]
    fn test_clear_adaptive_data_forwarded() {
        let labeler = ScriptedLabeler::new(vec![vec![], vec![]]);
        let mut evaluator = Evaluator::new(labeler, None);
        evaluator.evaluate_sample(&sample(&["a"], vec![], true));
        evaluator.evaluate_sample(&sample(&["b"], vec![], false));
        assert_eq!(evaluator.labeler.cleared, 1);
    }

    #[test]
    fn test_fmeasure_duplicate_predictions_do_not_inflate() {
        let mut fmeasure = FMeasure::default();
        let gold = vec![Span::new(0, 1, "PER")];
        let predicted = vec![Span::new(0, 1, "PER"), Span::new(0, 1, "PER")];
        fmeasure.update_scores(&gold, &predicted);
        assert_eq!(fmeasure.precision(), 0.5);
        assert_eq!(fmeasure.recall(), 1.0);
    }

    #[test]
    fn test_fmeasure_undefined_sentinel() {
        let fmeasure = FMeasure::default();
        assert_eq!(fmeasure.precision(), 0.0);
        assert_eq!(fmeasure.recall(), 0.0);
        assert_eq!(fmeasure.f_measure(), -1.0);
    }

    #[test]
    fn test_merge_equals_sequential_accumulation() {
        let gold_a = vec![Span::new(0, 1, "PER")];
        let gold_b = vec![Span::new(1, 2, "LOC")];

        // Sequencial
        let labeler = ScriptedLabeler::new(vec![gold_a.clone(), vec![]]);
        let mut sequential = Evaluator::new(labeler, None);
        sequential.evaluate_sample(&sample(&["a"], gold_a.clone(), false));
        sequential.evaluate_sample(&sample(&["a", "b"], gold_b.clone(), false));

        // Dois shards combinados
        let mut shard_a = Evaluator::new(ScriptedLabeler::new(vec![gold_a.clone()]), None);
        shard_a.evaluate_sample(&sample(&["a"], gold_a, false));
        let mut shard_b = Evaluator::new(ScriptedLabeler::new(vec![vec![]]), None);
        shard_b.evaluate_sample(&sample(&["a", "b"], gold_b, false));
        let mut merged = shard_a.into_metrics();
        merged.merge(&shard_b.into_metrics());

        assert_eq!(
            merged.word_accuracy.mean(),
            sequential.metrics().word_accuracy.mean()
        );
        assert_eq!(
            merged.f_measure.f_measure(),
            sequential.metrics().f_measure.f_measure()
        );
        assert_eq!(
            merged.word_accuracy.count(),
            sequential.metrics().word_accuracy.count()
        );
    }

    #[test]
    fn test_evaluate_sharded_matches_sequential() {
        let gold = vec![Span::new(0, 1, "PER")];
        let samples: Vec<SequenceSample> = (0..8)
            .map(|_| sample(&["Maria"], gold.clone(), false))
            .collect();

        let sharded = evaluate_sharded(&samples, 2, None, || {
            ScriptedLabeler::new(vec![vec![Span::new(0, 1, "PER")]; 2])
        });
        assert_eq!(sharded.word_accuracy.mean(), 1.0);
        assert_eq!(sharded.word_accuracy.count(), 8);
        assert_eq!(sharded.f_measure.f_measure(), 1.0);
    }
}

//! # seqlab-core — Núcleo de Features e Etiquetagem Lexical
//!
//! Este crate implementa o núcleo de extração de features e etiquetagem
//! lexical de um toolkit de rotulagem de sequências (NER, POS, lematização).
//! Ele não treina nem decodifica modelos: produz os vetores de features
//! simbólicas que um modelo estatístico externo consome, etiqueta sentenças
//! contra gazetteers e avalia etiquetadores contra corpora de referência.
//!
//! ## Arquitetura do Sistema
//!
//! Os componentes, em ordem de dependência (folhas primeiro):
//!
//! 1.  **Classificadores lexicais** ([`shape`]): funções puras que mapeiam um
//!     token para uma classe de forma (`lc`, `4d`, `ac`...).
//! 2.  **Geradores de features** ([`features`], [`outcomes`], [`cluster`]):
//!     um por família de feature; cada um pode carregar estado adaptativo
//!     por documento.
//! 3.  **Pipeline de features** ([`pipeline`]): compõe uma lista ordenada de
//!     geradores em um produtor de vetores por token.
//! 4.  **Etiquetador por dicionário** ([`dictionary`]): varre gazetteers,
//!     resolve sobreposições e materializa entidades ([`span`]).
//! 5.  **Avaliador** ([`evaluator`]): acurácia por palavra (total, conhecida,
//!     desconhecida) e precisão/cobertura/F1 por entidade.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use seqlab_core::features::{TokenClassConfig, TokenClassFeature};
//! use seqlab_core::pipeline::FeaturePipeline;
//! use seqlab_core::shape::ShapeMode;
//!
//! // 1. Monta o pipeline a partir da configuração do modelo
//! let shape = TokenClassFeature::new(TokenClassConfig {
//!     mode: ShapeMode::Nerc,
//!     lowercase: false,
//!     word_and_class: false,
//! });
//! let pipeline = FeaturePipeline::new(vec![Box::new(shape)]);
//!
//! // 2. Extrai o vetor de features do primeiro token
//! let tokens: Vec<String> = ["Brasil", "venceu"].iter().map(|s| s.to_string()).collect();
//! let features = pipeline.get_context(0, &tokens, &[]);
//! assert_eq!(features, vec!["wc=ic"]);
//! ```

pub mod cluster;
pub mod dictionary;
pub mod error;
pub mod evaluator;
pub mod features;
pub mod outcomes;
pub mod pipeline;
pub mod shape;
pub mod span;

pub use dictionary::{CaseMode, Dictionary, DictionaryTagger};
pub use error::ConfigError;
pub use evaluator::{Evaluator, SequenceLabeler, SequenceSample};
pub use features::{FeatureGenerator, Features};
pub use pipeline::FeaturePipeline;
pub use shape::{shape_class, ShapeMode};
pub use span::{Entity, Span};

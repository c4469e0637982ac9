//! # Classificadores Lexicais — Classes de Forma de Token
//!
//! Funções puras que mapeiam um token para exatamente uma classe de forma
//! (shape class), avaliando um conjunto fixo de regras em ordem de prioridade:
//! a primeira regra que casar vence.
//!
//! ## Classes no modo NERC
//!
//! | Classe  | Significado                            | Exemplos          |
//! |---------|----------------------------------------|-------------------|
//! | `lc`    | apenas letras minúsculas               | casa, presidente  |
//! | `2d`    | exatamente dois dígitos                | 42, A12           |
//! | `4d`    | exatamente quatro dígitos              | 2023              |
//! | `an`    | dígitos e letras (alfanumérico)        | covid19, B52x     |
//! | `dd`    | dígitos e hífen                        | 12-3              |
//! | `ds`    | dígitos e barra                        | 12/03             |
//! | `dc`    | dígitos e vírgula                      | 1,5               |
//! | `dp`    | dígitos e ponto                        | 3.14              |
//! | `num`   | apenas dígitos                         | 123               |
//! | `sc`    | uma única letra maiúscula              | A                 |
//! | `ac`    | todas maiúsculas (pontos ignorados)    | FIFA, U.S.A       |
//! | `cp`    | maiúscula única seguida de ponto       | A.                |
//! | `ic`    | inicial maiúscula                      | Brasil            |
//! | `other` | nenhuma das anteriores                 | ;, ao-vivo        |
//!
//! O modo POS usa um subconjunto reduzido (sem `2d`/`4d` e sem o refinamento
//! dígito+pontuação): `lc`, `an`, `num`, `sc`, `ac`, `cp`, `ic`, `other`.
//!
//! A escolha do modo é feita uma única vez na configuração de cada gerador de
//! features, via [`ShapeMode`] — nenhuma comparação de strings no caminho
//! quente.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Modo de classificação de forma, selecionado na configuração do modelo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShapeMode {
    /// Conjunto completo de classes, usado em reconhecimento de entidades.
    Nerc,
    /// Conjunto reduzido, usado em etiquetagem morfossintática (POS).
    Pos,
}

impl ShapeMode {
    /// Interpreta o valor da opção `type` (`"NERC"` ou `"POS"`).
    pub fn from_option(value: &str) -> Result<Self, ConfigError> {
        match value {
            "NERC" => Ok(ShapeMode::Nerc),
            "POS" => Ok(ShapeMode::Pos),
            _ => Err(ConfigError::InvalidValue {
                key: "type",
                value: value.to_string(),
            }),
        }
    }
}

/// Contagens e flags ortográficas de um token, computadas em uma passada.
#[derive(Debug, Default)]
struct TokenPattern {
    chars: usize,
    digits: usize,
    lowercase: usize,
    uppercase: usize,
    letters: usize,
    periods: usize,
    hyphen: bool,
    slash: bool,
    comma: bool,
    first_upper: bool,
}

impl TokenPattern {
    fn recognize(token: &str) -> Self {
        let mut p = TokenPattern::default();
        for (i, c) in token.chars().enumerate() {
            p.chars += 1;
            if i == 0 && c.is_uppercase() {
                p.first_upper = true;
            }
            if c.is_numeric() {
                p.digits += 1;
            } else if c.is_alphabetic() {
                p.letters += 1;
                if c.is_lowercase() {
                    p.lowercase += 1;
                } else if c.is_uppercase() {
                    p.uppercase += 1;
                }
            } else {
                match c {
                    '.' => p.periods += 1,
                    '-' => p.hyphen = true,
                    '/' => p.slash = true,
                    ',' => p.comma = true,
                    _ => {}
                }
            }
        }
        p
    }

    /// Apenas letras minúsculas, nada mais.
    fn is_all_lowercase(&self) -> bool {
        self.chars > 0 && self.lowercase == self.chars
    }

    /// Todas as letras são maiúsculas (pelo menos duas), sem minúsculas nem
    /// dígitos; pontos são ignorados ("U.S.A" conta como all-caps).
    fn is_all_caps(&self) -> bool {
        self.uppercase >= 2
            && self.lowercase == 0
            && self.digits == 0
            && self.uppercase + self.periods == self.chars
    }

    /// Uma única letra maiúscula.
    fn is_single_cap(&self) -> bool {
        self.chars == 1 && self.uppercase == 1
    }

    /// Maiúscula única seguida de ponto ("A.").
    fn is_cap_period(&self) -> bool {
        self.chars == 2 && self.first_upper && self.uppercase == 1 && self.periods == 1
    }
}

/// Classifica a forma de um token no modo indicado.
///
/// # Exemplo
/// ```
/// use seqlab_core::shape::{shape_class, ShapeMode};
///
/// assert_eq!(shape_class("presidente", ShapeMode::Nerc), "lc");
/// assert_eq!(shape_class("2023", ShapeMode::Nerc), "4d");
/// assert_eq!(shape_class("2023", ShapeMode::Pos), "num");
/// assert_eq!(shape_class("Brasil", ShapeMode::Nerc), "ic");
/// ```
pub fn shape_class(token: &str, mode: ShapeMode) -> &'static str {
    match mode {
        ShapeMode::Nerc => shape_class_nerc(token),
        ShapeMode::Pos => shape_class_pos(token),
    }
}

fn shape_class_nerc(token: &str) -> &'static str {
    let p = TokenPattern::recognize(token);
    if p.is_all_lowercase() {
        "lc"
    } else if p.digits == 2 {
        "2d"
    } else if p.digits == 4 {
        "4d"
    } else if p.digits > 0 {
        if p.letters > 0 {
            "an"
        } else if p.hyphen {
            "dd"
        } else if p.slash {
            "ds"
        } else if p.comma {
            "dc"
        } else if p.periods > 0 {
            "dp"
        } else {
            "num"
        }
    } else if p.is_single_cap() {
        "sc"
    } else if p.is_all_caps() {
        "ac"
    } else if p.is_cap_period() {
        "cp"
    } else if p.first_upper {
        "ic"
    } else {
        "other"
    }
}

fn shape_class_pos(token: &str) -> &'static str {
    let p = TokenPattern::recognize(token);
    if p.is_all_lowercase() {
        "lc"
    } else if p.digits > 0 {
        if p.letters > 0 {
            "an"
        } else {
            "num"
        }
    } else if p.is_single_cap() {
        "sc"
    } else if p.is_all_caps() {
        "ac"
    } else if p.is_cap_period() {
        "cp"
    } else if p.first_upper {
        "ic"
    } else {
        "other"
    }
}

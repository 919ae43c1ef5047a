//! Stem recovery and form transformation over a conjugation table.
//!
//! One [`Conjugation`] serves one lookup request: a surface string declared
//! as a `(活用型, 活用形)` pair. The pair is checked at construction; stem
//! recovery runs on first use and fixes which ending path the instance
//! stays on, so irregular types with parallel spellings keep answering in
//! the spelling the surface arrived in.


use std::collections::HashMap;

use crate::grammar::{ConjugationTable, Ending, FormTable};
use crate::kana;

#[derive(Debug, thiserror::Error)]
pub enum ConjugationError {
    #[error("undefined conjugation type {conj_type}")]
    UnknownType { conj_type: String },

    #[error("undefined form {form} for conjugation type {conj_type}")]
    UnknownForm { conj_type: String, form: String },

    #[error("cannot recover a stem from vowel-shifted form {form}: the stem-final kana is lost")]
    IrreversibleForm { form: String },

    #[error("{surface} is inconsistent with the endings of {conj_type} {form}")]
    InconsistentEnding {
        surface: String,
        conj_type: String,
        form: String,
    },
}

/// One lookup request over a shared table.
#[derive(Debug)]
pub struct Conjugation<'a> {
    forms: &'a FormTable,
    surface: String,
    conj_type: String,
    source_form: String,
    path: usize,
    stem: Option<String>,
}

impl<'a> Conjugation<'a> {
    /// Declare `surface` as the `form` realization of a word of type
    /// `conj_type`. Fails fast when the pair is missing from the table;
    /// stem recovery itself is deferred until a result is needed.
    pub fn new(
        table: &'a ConjugationTable,
        surface: &str,
        conj_type: &str,
        form: &str,
    ) -> Result<Conjugation<'a>, ConjugationError> {
        let Some(forms) = table.forms_of(conj_type) else {
            return Err(ConjugationError::UnknownType {
                conj_type: conj_type.to_string(),
            });
        };
        if !forms.contains(form) {
            return Err(ConjugationError::UnknownForm {
                conj_type: conj_type.to_string(),
                form: form.to_string(),
            });
        }
        Ok(Conjugation {
            forms,
            surface: surface.to_string(),
            conj_type: conj_type.to_string(),
            source_form: form.to_string(),
            path: 0,
            stem: None,
        })
    }

    /// Recover the invariant stem, fixing the ending path on first call.
    /// Later calls return the memoized stem.
    pub fn stem(&mut self) -> Result<&str, ConjugationError> {
        self.recover()?;
        Ok(self.stem.as_deref().unwrap_or(""))
    }

    /// The ending-path index fixed by stem recovery. Stays 0 until
    /// recovery runs; dual-spelling types use 0 and 1.
    pub fn path_index(&self) -> usize {
        self.path
    }

    /// Realize `target_form` for this word, on the path discovered during
    /// stem recovery.
    pub fn transform(&mut self, target_form: &str) -> Result<String, ConjugationError> {
        self.recover()?;
        let endings = self.endings_of(target_form)?;
        let Some(ending) = endings.get(self.path) else {
            // the target form has no realization on this spelling path
            return Err(ConjugationError::InconsistentEnding {
                surface: self.surface.clone(),
                conj_type: self.conj_type.clone(),
                form: target_form.to_string(),
            });
        };
        let stem = self.stem.as_deref().unwrap_or("");
        Ok(apply(stem, ending))
    }

    /// Every form of the word's type realizable on the discovered path,
    /// as form name → surface. Forms with no entry on this path are left
    /// out rather than reported as errors.
    pub fn all_forms(&mut self) -> Result<HashMap<String, String>, ConjugationError> {
        self.recover()?;
        let forms = self.forms;
        let mut out = HashMap::with_capacity(forms.len());
        for name in forms.names() {
            match self.transform(name) {
                Ok(surface) => {
                    out.insert(name.to_string(), surface);
                }
                Err(ConjugationError::InconsistentEnding { .. }) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(out)
    }

    fn endings_of(&self, form: &str) -> Result<&'a [Ending], ConjugationError> {
        self.forms
            .get(form)
            .ok_or_else(|| ConjugationError::UnknownForm {
                conj_type: self.conj_type.clone(),
                form: form.to_string(),
            })
    }

    /// Scan the declared form's endings in table order. The first literal
    /// that suffix-matches wins; hitting a vowel-shift candidate first is a
    /// hard failure because the shifted kana cannot be undone.
    fn recover(&mut self) -> Result<(), ConjugationError> {
        if self.stem.is_some() {
            return Ok(());
        }
        let endings = self.endings_of(&self.source_form)?;
        for (idx, ending) in endings.iter().enumerate() {
            match ending {
                Ending::VowelShift(_) => {
                    return Err(ConjugationError::IrreversibleForm {
                        form: self.source_form.clone(),
                    });
                }
                Ending::Literal(suffix) => {
                    if let Some(stem) = self.surface.strip_suffix(suffix.as_str()) {
                        self.path = idx;
                        self.stem = Some(stem.to_string());
                        return Ok(());
                    }
                }
            }
        }
        Err(ConjugationError::InconsistentEnding {
            surface: self.surface.clone(),
            conj_type: self.conj_type.clone(),
            form: self.source_form.clone(),
        })
    }
}

fn apply(stem: &str, ending: &Ending) -> String {
    match ending {
        Ending::Literal(suffix) => format!("{}{}", stem, suffix),
        Ending::VowelShift(suffix) => {
            let mut chars = stem.chars();
            match chars.next_back() {
                Some(last) => {
                    let shifted = kana::e_row(last).unwrap_or(last);
                    format!("{}{}{}", chars.as_str(), shifted, suffix)
                }
                None => suffix.clone(),
            }
        }
    }
}

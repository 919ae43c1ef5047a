pub mod conjugation;
pub mod grammar;
pub mod kana;
pub mod sexp;

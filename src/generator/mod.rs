//! Geradores de dados históricos.
//!
//! Este módulo contém o trait [`HistoryGenerator`] e a implementação
//! que consulta o Gemini com saída estruturada.

mod base;
mod gemini;

pub use base::{parse_history_output, GenerationRequest, HistoryGenerator, MAX_ENTITIES};
pub use gemini::GeminiGenerator;

//! Cache em memória dos dados históricos por ano.
//!
//! As entradas são imutáveis e vivem até o fim do processo: não há
//! evicção nem expiração.

mod history;

pub use history::{CacheStats, CachedHistory, HistoryCache};

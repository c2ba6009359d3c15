//! Cache de dados históricos indexado por ano.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::types::history::HistoryData;

/// Entrada em cache.
#[derive(Debug, Clone)]
pub struct CachedHistory {
    /// Dados do ano, compartilhados com quem os leu.
    pub data: Arc<HistoryData>,

    /// Momento em que foi cacheado.
    pub cached_at: DateTime<Utc>,
}

impl CachedHistory {
    /// Cria uma nova entrada.
    pub fn new(data: HistoryData) -> Self {
        Self {
            data: Arc::new(data),
            cached_at: Utc::now(),
        }
    }
}

/// Estatísticas do cache.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Número atual de entradas.
    pub size: usize,

    /// Número de acertos (cache hits).
    pub hits: u64,

    /// Número de erros (cache misses).
    pub misses: u64,
}

impl CacheStats {
    /// Calcula a taxa de acerto.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Cache por ano, sem limite. Entradas nunca são substituídas nem removidas.
#[derive(Debug, Default)]
pub struct HistoryCache {
    entries: BTreeMap<i32, CachedHistory>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl HistoryCache {
    /// Cria um cache vazio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Busca no cache, contabilizando hit/miss.
    pub fn get(&self, year: i32) -> Option<Arc<HistoryData>> {
        match self.entries.get(&year) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(&entry.data))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Consulta sem alterar as estatísticas.
    pub fn peek(&self, year: i32) -> Option<&CachedHistory> {
        self.entries.get(&year)
    }

    /// Guarda `data` em `year` e retorna o valor mantido para o ano.
    ///
    /// Se o ano já existe, a entrada antiga é mantida e `data` é descartado.
    pub fn insert(&mut self, year: i32, data: HistoryData) -> Arc<HistoryData> {
        let entry = self
            .entries
            .entry(year)
            .or_insert_with(|| CachedHistory::new(data));
        Arc::clone(&entry.data)
    }

    /// Momento em que `year` foi cacheado, sem alterar as estatísticas.
    pub fn cached_at(&self, year: i32) -> Option<DateTime<Utc>> {
        self.peek(year).map(|entry| entry.cached_at)
    }

    /// O ano está em cache?
    pub fn contains(&self, year: i32) -> bool {
        self.entries.contains_key(&year)
    }

    /// Número de entradas.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Cache vazio?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Anos em cache, em ordem crescente.
    pub fn years(&self) -> Vec<i32> {
        self.entries.keys().copied().collect()
    }

    /// Retorna estatísticas do cache.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

//! # Iberia Chronos
//!
//! Mapa histórico da Península Ibérica, de 3000 BC a 2026 CE.
//!
//! Para cada ano, um modelo Gemini descreve as entidades políticas da região
//! (nome, cor, fronteira e descrição); o resultado é guardado em cache por ano
//! e desenhado sobre um mapa base.
//!
//! ## Módulos
//!
//! - [`types`] - Tipos compartilhados, configuração e erros
//! - [`generator`] - Geradores de dados históricos (Gemini)
//! - [`cache`] - Cache por ano dos resultados gerados
//! - [`service`] - Serviço de busca que nunca falha
//! - [`shell`] - Estado da aplicação e proteção contra respostas obsoletas
//! - [`map`] - Estilos, hit testing, tiles e exportação GeoJSON
//! - [`logging`] - Configuração do tracing
//! - `cli` - Interface de linha de comando
//! - `tui` - Explorador interativo no terminal

pub mod cache;
pub mod generator;
pub mod logging;
pub mod map;
pub mod service;
pub mod shell;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod tui;

pub use types::config::Config;
pub use types::errors::{ChronosError, ChronosResult};

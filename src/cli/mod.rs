//! Interface de linha de comando do Iberia Chronos.

pub mod commands;
pub mod interactive;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Iberia Chronos - mapa histórico da Península Ibérica.
#[derive(Parser, Debug)]
#[command(name = "iberia-chronos")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long, default_value = "chronos.toml")]
    pub config: PathBuf,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Abre o explorador interativo no terminal.
    Explore {
        /// Ano inicial (ex.: "711", "300 BC").
        #[arg(short, long, default_value = "2024", allow_hyphen_values = true)]
        year: String,
    },

    /// Mostra as entidades políticas de um ano.
    Show {
        /// Ano (ex.: "1492", "218 BC").
        #[arg(short, long, allow_hyphen_values = true)]
        year: String,

        /// Imprime o resultado como JSON.
        #[arg(long)]
        json: bool,
    },

    /// Exporta o mapa de um ano como GeoJSON.
    Export {
        /// Ano (ex.: "1492", "218 BC").
        #[arg(short, long, allow_hyphen_values = true)]
        year: String,

        /// Arquivo de saída.
        #[arg(short, long, default_value = "iberia.geojson")]
        output: PathBuf,
    },

    /// Inicializa configuração no diretório atual.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Configura opções interativamente.
    Config,

    /// Diagnostica problemas de configuração.
    Doctor,

    /// Mostra versão.
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_show() {
        let cli = Cli::try_parse_from(["iberia-chronos", "show", "--year", "300 BC", "--json"])
            .unwrap();
        match cli.command {
            Commands::Show { year, json } => {
                assert_eq!(year, "300 BC");
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_explore_default_year() {
        let cli = Cli::try_parse_from(["iberia-chronos", "explore"]).unwrap();
        assert!(matches!(cli.command, Commands::Explore { ref year } if year == "2024"));
        assert_eq!(cli.config, PathBuf::from("chronos.toml"));
    }

    #[test]
    fn test_negative_year_is_accepted() {
        let cli = Cli::try_parse_from(["iberia-chronos", "show", "--year", "-218"]).unwrap();
        assert!(matches!(cli.command, Commands::Show { ref year, .. } if year == "-218"));
    }
}

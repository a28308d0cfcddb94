//! Messages command - inspect the message catalogue

use anyhow::{anyhow, Result};
use clap::Subcommand;
use serde_json::{Map, Value};

use controlfin_core::config::Config;
use controlfin_core::i18n::{catalog, Locale};

use super::get_data_dir;

#[derive(Subcommand)]
pub enum MessageCommands {
    /// Print the message for a key
    Get {
        /// Dotted key, e.g. "import.success"
        key: String,
        /// Placeholder value NAME=VALUE (repeatable)
        #[arg(long = "param")]
        params: Vec<String>,
    },
    /// Pick the language for an Accept-Language header
    Negotiate {
        /// Header value, e.g. "pt-BR,pt;q=0.9,en;q=0.8"
        header: Option<String>,
    },
    /// List languages with a dictionary
    Languages,
}

pub fn run(lang: Option<&str>, command: MessageCommands) -> Result<()> {
    match command {
        MessageCommands::Get { key, params } => {
            let language = match lang {
                Some(lang) => lang.to_string(),
                None => Config::load(&get_data_dir()?)?.language,
            };
            let params = parse_params(&params)?;
            let params = (!params.is_empty()).then(|| Value::Object(params));
            println!(
                "{}",
                catalog().get_message(&Locale::new(language), &key, params.as_ref())
            );
        }
        MessageCommands::Negotiate { header } => {
            println!("{}", catalog().negotiate_language(header.as_deref()));
        }
        MessageCommands::Languages => {
            for code in catalog().languages() {
                println!("{}", code);
            }
        }
    }
    Ok(())
}

fn parse_params(params: &[String]) -> Result<Map<String, Value>> {
    params
        .iter()
        .map(|p| {
            let (name, value) = p
                .split_once('=')
                .ok_or_else(|| anyhow!("Invalid parameter '{}', expected NAME=VALUE", p))?;
            Ok((name.trim().to_string(), Value::String(value.to_string())))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_params() {
        let params = parse_params(&["count=3".to_string(), "file = a=b.csv".to_string()]).unwrap();
        assert_eq!(params["count"], Value::String("3".to_string()));
        assert_eq!(params["file"], Value::String(" a=b.csv".to_string()));
        assert!(parse_params(&["oops".to_string()]).is_err());
    }
}

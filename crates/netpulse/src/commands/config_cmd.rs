//! `netpulse config` -- read and write configuration values.

use netpulse_core::initialize_config;

use crate::cli::{ConfigCommand, GlobalOpts};
use crate::error::CliError;

use super::open_database;

pub async fn handle(command: ConfigCommand, global: &GlobalOpts) -> Result<(), CliError> {
    let db = open_database(global).await?;

    match command {
        ConfigCommand::Get { key } => {
            match db.config_value(&key).await? {
                Some(value) => println!("{value}"),
                None => return Err(CliError::ConfigKeyMissing { key }),
            }
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            db.set_config_value(&key, &value).await?;
            println!("{key} = {value}");
            Ok(())
        }

        ConfigCommand::Init => {
            initialize_config(&db).await?;
            println!("Seeded default collector configuration.");
            Ok(())
        }
    }
}

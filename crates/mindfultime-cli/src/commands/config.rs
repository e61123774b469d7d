use clap::Subcommand;
use mindfultime_core::Settings;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Read a setting by dotted key
    Get { key: String },
    /// Set a setting by dotted key
    Set { key: String, value: String },
    /// List all settings
    List,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let settings = Settings::load()?;
            match settings.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut settings = Settings::load()?;
            if !settings.set(&key, &value) {
                return Err(format!("cannot set '{key}' to '{value}'").into());
            }
            settings.save()?;
            println!("{key} = {value}");
        }
        ConfigAction::List => {
            let settings = Settings::load()?;
            for (key, value) in settings.entries() {
                println!("{key} = {value}");
            }
        }
    }
    Ok(())
}

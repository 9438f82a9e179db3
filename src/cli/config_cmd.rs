use anyhow::Result;

use crate::core::config::AppConfig;

pub fn init(subscription_id: Option<String>) -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() {
        eprintln!("Config file already exists at {}", path.display());
        eprintln!("Remove it first if you want to regenerate.");
        return Ok(());
    }

    let mut config = AppConfig::default();
    config.azure.subscription_id = subscription_id;

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        anyhow::bail!("Refusing to write an invalid config");
    }

    let path = config.save()?;
    println!("Generated config at {}", path.display());
    match &config.azure.subscription_id {
        Some(id) => println!("  Default subscription: {}", id),
        None => println!("  No default subscription; the Azure CLI session will be used."),
    }
    Ok(())
}

pub fn check() -> Result<()> {
    let path = AppConfig::config_path();
    if !path.exists() {
        eprintln!("No config file found at {}", path.display());
        eprintln!("Run `azcost config init` to create one.");
        return Ok(());
    }

    let config = AppConfig::load()?;
    let issues = config.validate();
    if issues.is_empty() {
        println!("Config is valid: {}", path.display());
        println!("  Endpoint:    {}", config.azure.endpoint);
        println!("  API version: {}", config.azure.api_version);
        if let Some(id) = &config.azure.subscription_id {
            println!("  Subscription: {}", id);
        }
    } else {
        eprintln!("Config issues found in {}:", path.display());
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        anyhow::bail!("{} config issue(s)", issues.len());
    }
    Ok(())
}

pub fn path() -> Result<()> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}

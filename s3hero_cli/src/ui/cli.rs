use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::debug;
use s3hero_core::{Manager, Profile, Provider};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "s3hero", version, subcommand_required = true)]
pub struct Args {
    /// Directory holding config.json (default: $S3HERO_CONFIG_DIR or ~/.s3hero)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage connection profiles
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Inspect the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Add a profile, or replace one with the same name
    Add(AddArgs),
    /// List profile names; the default is marked with `*`
    List,
    /// Show a profile (the default one when no name is given)
    Show {
        name: Option<String>,
    },
    /// Delete a profile
    Remove {
        name: String,
    },
    /// Print the default profile, or set it when a name is given
    Default {
        name: Option<String>,
    },
}

#[derive(ClapArgs, Debug)]
pub struct AddArgs {
    /// Profile name
    pub name: String,
    /// aws, cloudflare or custom
    #[arg(long, value_parser = parse_provider)]
    pub provider: Provider,
    #[arg(long)]
    pub access_key_id: String,
    #[arg(long)]
    pub secret_access_key: String,
    /// Region, e.g. `us-east-1` (use `auto` for Cloudflare R2)
    #[arg(long, default_value = "")]
    pub region: String,
    /// Endpoint URL for custom providers
    #[arg(long, default_value = "")]
    pub endpoint: String,
    /// Cloudflare account id
    #[arg(long, default_value = "")]
    pub account_id: String,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the path of the configuration file
    Path,
}

fn parse_provider(s: &str) -> Result<Provider, String> {
    s.parse()
}

pub fn run_cli(args: Args) -> Result<()> {
    let mut manager = open_manager(args.config_dir)?;

    match args.command {
        Command::Profile(cmd) => run_profile_command(cmd, &mut manager),
        Command::Config(ConfigCommand::Path) => {
            println!("{}", manager.path().display());
            Ok(())
        }
    }
}

fn open_manager(config_dir: Option<PathBuf>) -> Result<Manager> {
    match config_dir {
        Some(dir) => {
            debug!("Using config dir {:?} from --config-dir", dir);
            Manager::at_dir(&dir)
                .with_context(|| format!("failed to open profiles in {}", dir.display()))
        }
        None => Manager::new().context("failed to open profiles"),
    }
}

fn run_profile_command(cmd: ProfileCommand, manager: &mut Manager) -> Result<()> {
    match cmd {
        ProfileCommand::Add(add) => {
            let name = add.name.clone();
            let profile = Profile::new(
                add.name,
                add.provider,
                add.access_key_id,
                add.secret_access_key,
            )
            .with_region(add.region)
            .with_endpoint(add.endpoint)
            .with_account_id(add.account_id);
            manager
                .add_profile(profile)
                .with_context(|| format!("failed to add profile '{name}'"))?;
            println!("Profile '{name}' saved");
        }
        ProfileCommand::List => {
            let mut names = manager.list_profiles();
            if names.is_empty() {
                println!("No profiles configured. Add one with `s3hero profile add`.");
                return Ok(());
            }
            names.sort();
            for name in names {
                let marker = if name == manager.default_profile() { "*" } else { " " };
                println!("{marker} {name}");
            }
        }
        ProfileCommand::Show { name } => {
            let profile = manager.get_profile(name.as_deref().unwrap_or(""))?;
            print_profile(profile, profile.name == manager.default_profile());
        }
        ProfileCommand::Remove { name } => {
            manager
                .delete_profile(&name)
                .with_context(|| format!("failed to remove profile '{name}'"))?;
            println!("Profile '{name}' removed");
        }
        ProfileCommand::Default { name: None } => {
            let current = manager.default_profile();
            if current.is_empty() {
                println!("No default profile set");
            } else {
                println!("{current}");
            }
        }
        ProfileCommand::Default { name: Some(name) } => {
            manager
                .set_default(&name)
                .with_context(|| format!("failed to set default profile to '{name}'"))?;
            println!("Default profile is now '{name}'");
        }
    }
    Ok(())
}

/// Prints everything but the secret access key.
fn print_profile(profile: &Profile, is_default: bool) {
    println!("name:          {}", profile.name);
    println!("provider:      {}", profile.provider);
    println!("access key id: {}", profile.access_key_id);
    if !profile.region.is_empty() {
        println!("region:        {}", profile.region);
    }
    if let Some(account_id) = profile.account_id() {
        println!("account id:    {account_id}");
    }
    if let Some(url) = profile.endpoint_url() {
        println!("endpoint:      {url}");
    }
    println!("default:       {}", if is_default { "yes" } else { "no" });
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_profile_add() {
        let args = Args::try_parse_from([
            "s3hero",
            "profile",
            "add",
            "home",
            "--provider",
            "Cloudflare",
            "--access-key-id",
            "id",
            "--secret-access-key",
            "key",
            "--account-id",
            "acc",
        ])
        .unwrap();

        match args.command {
            Command::Profile(ProfileCommand::Add(add)) => {
                assert_eq!(add.name, "home");
                assert_eq!(add.provider, Provider::Cloudflare);
                assert_eq!(add.account_id, "acc");
                assert_eq!(add.region, "");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_provider() {
        let result = Args::try_parse_from([
            "s3hero",
            "profile",
            "add",
            "x",
            "--provider",
            "gcs",
            "--access-key-id",
            "id",
            "--secret-access-key",
            "key",
        ]);
        assert!(result.is_err());
    }

    // The only test in this binary that touches the process environment.
    #[test]
    fn config_dir_flag_beats_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let from_flag = dir.path().join("flag");
        let from_env = dir.path().join("env");

        std::env::set_var(s3hero_core::storage::CONFIG_DIR_ENV, &from_env);
        let flagged = open_manager(Some(from_flag.clone()));
        let unflagged = open_manager(None);
        std::env::remove_var(s3hero_core::storage::CONFIG_DIR_ENV);

        assert_eq!(flagged.unwrap().path(), from_flag.join("config.json"));
        assert_eq!(unflagged.unwrap().path(), from_env.join("config.json"));
    }

    #[test]
    fn add_persists_to_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = Some(dir.path().to_path_buf());
        let add = Args::try_parse_from([
            "s3hero",
            "--config-dir",
            dir.path().to_str().unwrap(),
            "profile",
            "add",
            "work",
            "--provider",
            "aws",
            "--access-key-id",
            "AKIA",
            "--secret-access-key",
            "secret",
            "--region",
            "us-east-1",
        ])
        .unwrap();
        assert_eq!(add.config_dir, config_dir);
        run_cli(add).unwrap();

        let manager = open_manager(config_dir).unwrap();
        assert_eq!(manager.default_profile(), "work");
        assert_eq!(manager.get_profile("work").unwrap().region, "us-east-1");
    }
}

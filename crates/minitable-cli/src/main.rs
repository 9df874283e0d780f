// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use minitable_store::{KvStore, StateStore};
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `minitable --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let db_path = config.db_path()?;
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let kv = KvStore::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or MINITABLE_DB_PATH",
            db_path.display()
        )
    })?;
    let mut store = StateStore::open(kv);
    if options.check_only {
        return Ok(());
    }

    if options.command.is_empty() {
        print_help();
        return Ok(());
    }

    let command = runtime::parse_command(&options.command)?;
    let output = runtime::execute(&mut store, command)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    command: Vec<String>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args: Vec<String> = args.into_iter().map(|arg| arg.as_ref().to_owned()).collect();
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
        command: Vec::new(),
    };

    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--config" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown if unknown.starts_with("--") => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
            _ => {
                // first operand starts the subcommand; the rest belongs to it
                options.command = args[index..].to_vec();
                break;
            }
        }
        index += 1;
    }

    Ok(options)
}

fn print_help() {
    println!("minitable");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config + database and exit");
    println!("  --help                   Show this help");
    println!();
    println!("commands (operate on the active table unless noted):");
    println!("  tables                                     List tables");
    println!("  use <table>                                Switch the active table");
    println!("  add-table <name>                           Create a table and switch to it");
    println!("  rename-table <name>                        Rename the active table");
    println!("  delete-table <table>                       Delete a table (the last one is kept)");
    println!("  columns                                    List columns");
    println!("  add-column <name> <type> [option ...]      Add a column (select takes options)");
    println!("  rename-column <column> <name>              Rename a column");
    println!("  remove-column <column>                     Remove a column and its cells");
    println!("  change-column-type <column> <type> [opts]  Change a column's type");
    println!("  add-row [--at <position>]                  Add a blank row");
    println!("  remove-row <row>                           Remove a row");
    println!("  duplicate-row <row>                        Copy a row below itself");
    println!("  set-cell <row> <column> <value>            Edit one cell");
    println!("  rows [query]                               Show rows (filtered, sorted)");
    println!("  sort <column>                              Sort by a column; repeat to flip");
    println!("  export [path]                              Write a JSON snapshot");
    println!("  import <path>                              Replace state from a JSON snapshot");
    println!("  theme [light|dark|toggle]                  Show or set the theme preference");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use anyhow::Result;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/minitable-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_db_path: false,
                print_example: false,
                check_only: false,
                show_help: false,
                command: Vec::new(),
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml", "tables"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        assert_eq!(options.command, vec!["tables".to_owned()]);
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_config_value() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_flag() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown flag should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(!options.print_db_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_collects_subcommand_operands_verbatim() -> Result<()> {
        let options = parse_cli_args(
            vec!["set-cell", "1", "Name", "--check"],
            default_options_path(),
        )?;
        assert!(!options.check_only, "flags after the command are operands");
        assert_eq!(
            options.command,
            vec![
                "set-cell".to_owned(),
                "1".to_owned(),
                "Name".to_owned(),
                "--check".to_owned(),
            ]
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_keeps_row_position_flags_with_the_command() -> Result<()> {
        let options = parse_cli_args(vec!["add-row", "--at", "2"], default_options_path())?;
        assert_eq!(
            options.command,
            vec!["add-row".to_owned(), "--at".to_owned(), "2".to_owned()]
        );
        Ok(())
    }
}

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};

#[derive(Debug, Clone)]
pub struct OutputFlags {
    pub json: bool,
    pub markdown: bool,
    pub pretty: bool,
}

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    pub profile: Option<String>,
    pub server: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout_ms: Option<u64>,
    pub encrypt: Option<bool>,
    pub trust_cert: Option<bool>,
    pub output: OutputFlags,
    pub verbose: u8,
    pub quiet: bool,
    pub command: CommandKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Help { all: bool, command: Option<String> },
    Compare(CompareArgs),
    Snapshot(SnapshotArgs),
    Normalize(NormalizeArgs),
    Config(ConfigArgs),
    Completions(CompletionsArgs),
}

/// Where one side of a comparison reads its catalog from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SideArgs {
    pub profile: Option<String>,
    pub connection: Option<String>,
    pub schema: Option<String>,
    pub snapshot: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompareArgs {
    pub source: SideArgs,
    pub target: SideArgs,
    pub summary: bool,
    pub show_diff: bool,
    pub max_duration_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnapshotArgs {
    pub schema: Option<String>,
    pub connection: Option<String>,
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizeArgs {
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigArgs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionsArgs {
    pub shell: Option<String>,
}

pub fn build_cli(show_all: bool) -> Command {
    let mut cmd = Command::new("schemadiff")
        .about("Detect schema drift between two SQL Server databases")
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .disable_help_subcommand(true)
        .subcommand_value_name("COMMAND");

    cmd = add_global_args(cmd);

    cmd = cmd.subcommand(command_help());

    cmd = cmd.subcommand(command_compare(show_all));
    cmd = cmd.subcommand(command_snapshot(show_all));
    cmd = cmd.subcommand(command_config(show_all));

    cmd = cmd.subcommand(command_normalize(show_all));
    cmd = cmd.subcommand(command_completions(show_all));

    cmd
}

pub fn parse_args() -> CliArgs {
    let matches = build_cli(false).get_matches();
    parse_matches(&matches)
}

fn add_global_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("config")
            .long("config")
            .value_name("PATH")
            .value_hint(ValueHint::FilePath)
            .global(true)
            .help("Override config file location"),
    )
    .arg(
        Arg::new("env-file")
            .long("env-file")
            .value_name("PATH")
            .value_hint(ValueHint::FilePath)
            .global(true)
            .help("Load environment variables from file (default: .env)"),
    )
    .arg(
        Arg::new("profile")
            .long("profile")
            .value_name("NAME")
            .global(true)
            .help("Select connection profile (default side for compare)"),
    )
    .arg(
        Arg::new("server")
            .long("server")
            .value_name("HOST")
            .global(true)
            .help("SQL Server hostname"),
    )
    .arg(
        Arg::new("port")
            .long("port")
            .value_name("PORT")
            .value_parser(clap::value_parser!(u16))
            .global(true)
            .help("SQL Server port (default: 1433)"),
    )
    .arg(
        Arg::new("database")
            .long("database")
            .value_name("NAME")
            .global(true)
            .help("Database name (default: master)"),
    )
    .arg(
        Arg::new("user")
            .long("user")
            .value_name("USER")
            .global(true)
            .help("SQL Server username"),
    )
    .arg(
        Arg::new("password")
            .long("password")
            .value_name("PASS")
            .global(true)
            .help("SQL Server password"),
    )
    .arg(
        Arg::new("timeout")
            .long("timeout")
            .value_name("MS")
            .value_parser(clap::value_parser!(u64))
            .global(true)
            .help("Connection timeout in milliseconds"),
    )
    .arg(
        Arg::new("encrypt")
            .long("encrypt")
            .value_parser(clap::value_parser!(bool))
            .global(true)
            .help("Enable connection encryption"),
    )
    .arg(
        Arg::new("trust-cert")
            .long("trust-cert")
            .value_parser(clap::value_parser!(bool))
            .global(true)
            .help("Trust server certificate"),
    )
    .arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Output as JSON"),
    )
    .arg(
        Arg::new("markdown")
            .long("markdown")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Force markdown table output"),
    )
    .arg(
        Arg::new("pretty")
            .long("pretty")
            .long("pretty-print")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Force pretty-printed table output"),
    )
    .arg(
        Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::Count)
            .global(true)
            .help("Enable debug logging"),
    )
    .arg(
        Arg::new("quiet")
            .short('q')
            .long("quiet")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Suppress non-error output"),
    )
}

fn command_help() -> Command {
    Command::new("help")
        .about("Show help for commands")
        .arg(
            Arg::new("all")
                .long("all")
                .action(ArgAction::SetTrue)
                .help("Show all commands, including advanced ones"),
        )
        .arg(Arg::new("command").value_name("COMMAND"))
}

fn command_core(
    name: &'static str,
    about: &'static str,
    aliases: &'static [&'static str],
    _show_all: bool,
) -> Command {
    let mut cmd = Command::new(name).about(about);
    for alias in aliases {
        cmd = cmd.visible_alias(*alias);
    }
    cmd
}

fn command_advanced(
    name: &'static str,
    about: &'static str,
    aliases: &'static [&'static str],
    show_all: bool,
) -> Command {
    let mut cmd = Command::new(name).about(about);
    for alias in aliases {
        cmd = cmd.visible_alias(*alias);
    }
    if !show_all {
        cmd = cmd.hide(true);
    }
    cmd
}

fn command_compare(show_all: bool) -> Command {
    let mut cmd = command_core(
        "compare",
        "Compare tables, columns, and routines of two schemas",
        &["diff"],
        show_all,
    );
    for side in ["source", "target"] {
        cmd = cmd.args(side_args(side));
    }
    cmd.arg(
        Arg::new("summary")
            .long("summary")
            .action(ArgAction::SetTrue)
            .help("Print difference counts only"),
    )
    .arg(
        Arg::new("show-diff")
            .long("show-diff")
            .action(ArgAction::SetTrue)
            .help("Show unified diffs of differing routine bodies"),
    )
    .arg(
        Arg::new("max-duration")
            .long("max-duration")
            .value_name("MS")
            .value_parser(clap::value_parser!(u64))
            .help("Abort the comparison after this many milliseconds"),
    )
}

fn side_args(side: &'static str) -> [Arg; 4] {
    let (profile, connection, schema, snapshot) = match side {
        "source" => (
            "source",
            "source-connection",
            "source-schema",
            "source-snapshot",
        ),
        _ => (
            "target",
            "target-connection",
            "target-schema",
            "target-snapshot",
        ),
    };
    [
        Arg::new(profile)
            .long(profile)
            .value_name("PROFILE")
            .help(format!("Profile for the {side} database")),
        Arg::new(connection)
            .long(connection)
            .value_name("CONN")
            .conflicts_with(snapshot)
            .help(format!("Connection string for the {side} database")),
        Arg::new(schema)
            .long(schema)
            .value_name("SCHEMA")
            .help(format!("Schema to read on the {side} side (default: dbo)")),
        Arg::new(snapshot)
            .long(snapshot)
            .value_name("PATH")
            .value_hint(ValueHint::FilePath)
            .conflicts_with(profile)
            .help(format!("Read the {side} side from a snapshot file")),
    ]
}

fn command_snapshot(show_all: bool) -> Command {
    command_core(
        "snapshot",
        "Capture one schema into a snapshot file",
        &["capture"],
        show_all,
    )
    .arg(
        Arg::new("schema")
            .long("schema")
            .value_name("SCHEMA")
            .help("Schema to capture (default: dbo)"),
    )
    .arg(
        Arg::new("connection")
            .long("connection")
            .value_name("CONN")
            .help("Connection string to capture from"),
    )
    .arg(
        Arg::new("out")
            .long("out")
            .short('o')
            .value_name("PATH")
            .value_hint(ValueHint::FilePath)
            .help("Output file (.json, .yaml, .yml; '-' for stdout)"),
    )
}

fn command_normalize(show_all: bool) -> Command {
    command_advanced(
        "normalize",
        "Print routine text the way compare sees it",
        &[],
        show_all,
    )
    .arg(
        Arg::new("file")
            .long("file")
            .value_name("PATH")
            .value_hint(ValueHint::FilePath)
            .help("Read routine text from file (default: stdin)"),
    )
}

fn command_config(show_all: bool) -> Command {
    command_core("config", "Display resolved config", &[], show_all)
}

fn command_completions(show_all: bool) -> Command {
    command_advanced("completions", "Generate shell completions", &[], show_all).arg(
        Arg::new("shell")
            .long("shell")
            .value_name("name")
            .value_parser(["bash", "zsh", "fish", "powershell", "elvish"]),
    )
}

fn parse_side(matches: &ArgMatches, side: &str) -> SideArgs {
    SideArgs {
        profile: matches.get_one::<String>(side).cloned(),
        connection: matches
            .get_one::<String>(&format!("{side}-connection"))
            .cloned(),
        schema: matches.get_one::<String>(&format!("{side}-schema")).cloned(),
        snapshot: matches
            .get_one::<String>(&format!("{side}-snapshot"))
            .map(PathBuf::from),
    }
}

fn parse_matches(matches: &ArgMatches) -> CliArgs {
    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let env_file = matches.get_one::<String>("env-file").map(PathBuf::from);
    let profile = matches.get_one::<String>("profile").cloned();
    let server = matches.get_one::<String>("server").cloned();
    let port = matches.get_one::<u16>("port").copied();
    let database = matches.get_one::<String>("database").cloned();
    let user = matches.get_one::<String>("user").cloned();
    let password = matches.get_one::<String>("password").cloned();
    let timeout_ms = matches.get_one::<u64>("timeout").copied();
    let encrypt = matches.get_one::<bool>("encrypt").copied();
    let trust_cert = matches.get_one::<bool>("trust-cert").copied();
    let output = OutputFlags {
        json: matches.get_flag("json"),
        markdown: matches.get_flag("markdown"),
        pretty: matches.get_flag("pretty"),
    };
    let verbose = matches.get_count("verbose");
    let quiet = matches.get_flag("quiet");

    let command = match matches.subcommand() {
        Some(("help", sub_m)) => CommandKind::Help {
            all: sub_m.get_flag("all"),
            command: sub_m.get_one::<String>("command").cloned(),
        },
        Some(("compare", sub_m)) => CommandKind::Compare(CompareArgs {
            source: parse_side(sub_m, "source"),
            target: parse_side(sub_m, "target"),
            summary: sub_m.get_flag("summary"),
            show_diff: sub_m.get_flag("show-diff"),
            max_duration_ms: sub_m.get_one::<u64>("max-duration").copied(),
        }),
        Some(("snapshot", sub_m)) => CommandKind::Snapshot(SnapshotArgs {
            schema: sub_m.get_one::<String>("schema").cloned(),
            connection: sub_m.get_one::<String>("connection").cloned(),
            out: sub_m.get_one::<String>("out").map(PathBuf::from),
        }),
        Some(("normalize", sub_m)) => CommandKind::Normalize(NormalizeArgs {
            file: sub_m.get_one::<String>("file").map(PathBuf::from),
        }),
        Some(("config", _)) => CommandKind::Config(ConfigArgs),
        Some(("completions", sub_m)) => CommandKind::Completions(CompletionsArgs {
            shell: sub_m.get_one::<String>("shell").cloned(),
        }),
        _ => CommandKind::Help {
            all: false,
            command: None,
        },
    };

    CliArgs {
        config_path,
        env_file,
        profile,
        server,
        port,
        database,
        user,
        password,
        timeout_ms,
        encrypt,
        trust_cert,
        output,
        verbose,
        quiet,
        command,
    }
}

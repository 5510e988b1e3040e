use clap::builder::PossibleValue;
use clap::{Arg, ArgAction, Command, crate_description, crate_name, crate_version};

pub fn build_cli() -> Command {
    let mut args = vec![
        Arg::new("log-level")
            .long("log-level")
            .value_name("LOG_LEVEL")
            .env("WEBHOOK_REGISTRAR_LOG_LEVEL")
            .default_value("info")
            .value_parser([
                PossibleValue::new("trace"),
                PossibleValue::new("debug"),
                PossibleValue::new("info"),
                PossibleValue::new("warn"),
                PossibleValue::new("error"),
            ])
            .global(true)
            .help("Log level"),
        Arg::new("log-fmt")
            .long("log-fmt")
            .value_name("LOG_FMT")
            .env("WEBHOOK_REGISTRAR_LOG_FMT")
            .default_value("text")
            .value_parser([PossibleValue::new("text"), PossibleValue::new("json")])
            .global(true)
            .help("Log output format"),
        Arg::new("log-no-color")
            .long("log-no-color")
            .env("NO_COLOR")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Disable colored output for logs"),
        Arg::new("server-ip")
            .long("server-ip")
            .value_name("ADDRESS")
            .env("WEBHOOK_REGISTRAR_SERVER_IP")
            .global(true)
            .help("Address of a controller running outside of the cluster. Registers the debug webhook configurations pointing at https://ADDRESS"),
        Arg::new("namespace")
            .long("namespace")
            .value_name("NAMESPACE")
            .env("WEBHOOK_REGISTRAR_NAMESPACE")
            .global(true)
            .help("Namespace of the controller, overrides the settings file"),
        Arg::new("settings")
            .long("settings")
            .value_name("SETTINGS_FILE")
            .env("WEBHOOK_REGISTRAR_SETTINGS")
            .global(true)
            .help("YAML file overriding the names of the objects used during registration"),
    ];
    args.sort_by(|a, b| a.get_id().cmp(b.get_id()));

    let subcommands = vec![
        Command::new("register").about("Register the webhook configurations and exit"),
        Command::new("deregister")
            .about("Remove the webhook configurations, ignoring objects that do not exist"),
        Command::new("run").about(
            "Register the webhook configurations, then remove them when SIGTERM or Ctrl-C is received",
        ),
    ];

    Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .args(args)
        .subcommands(subcommands)
}

use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

/// Built-in development signing secret. The server warns loudly when it is
/// still in use; set `APPUNTI_SECRET` in any real deployment.
pub const DEFAULT_SECRET: &str = "appunti-dev-secret-change-me";

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("appunti")
        .about("Multi-user notes service")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8000")
                .env("APPUNTI_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("dsn")
                .short('d')
                .long("dsn")
                .help("Database connection string")
                .default_value("sqlite:notes_app.db?mode=rwc")
                .env("APPUNTI_DSN")
                .global(true),
        )
        .arg(
            Arg::new("secret")
                .short('s')
                .long("secret")
                .help("Token signing secret")
                .default_value(DEFAULT_SECRET)
                .env("APPUNTI_SECRET")
                .global(true),
        )
        .arg(
            Arg::new("origin")
                .short('o')
                .long("origin")
                .help("Allowed CORS origin, repeat for multiple")
                .default_value("http://localhost:3000")
                .env("APPUNTI_ORIGIN")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("token-ttl")
                .long("token-ttl")
                .help("Access token lifetime in seconds")
                .default_value("1800")
                .env("APPUNTI_TOKEN_TTL")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("cookie-secure")
                .long("cookie-secure")
                .help("Mark the admin session cookie as Secure (HTTPS deployments)")
                .env("APPUNTI_COOKIE_SECURE")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("APPUNTI_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("create-admin")
                .about("Create an administrator account")
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .help("Administrator username")
                        .env("APPUNTI_ADMIN_USERNAME")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .long("password")
                        .help("Administrator password")
                        .env("APPUNTI_ADMIN_PASSWORD")
                        .required(true),
                ),
        )
}

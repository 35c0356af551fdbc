use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

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

pub fn validator_entropy() -> ValueParser {
    ValueParser::from(move |entropy: &str| -> std::result::Result<usize, String> {
        match entropy.parse::<usize>() {
            Ok(bytes) if bytes > 0 => Ok(bytes),
            _ => Err("entropy must be a positive number of bytes".to_string()),
        }
    })
}

fn entropy_arg() -> Arg {
    Arg::new("entropy")
        .short('e')
        .long("entropy")
        .help("Random bytes per generated token")
        .default_value("32")
        .env("TOKENAUTH_ENTROPY")
        .value_parser(validator_entropy())
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("tokenauth")
        .about("Token authentication gate")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("server")
                .about("Serve routes protected by the token gate")
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .help("Port to listen on")
                        .default_value("8080")
                        .env("TOKENAUTH_PORT")
                        .value_parser(clap::value_parser!(u16)),
                )
                .arg(
                    Arg::new("realm")
                        .short('r')
                        .long("realm")
                        .help("Realm sent in the WWW-Authenticate challenge")
                        .env("TOKENAUTH_REALM")
                        .required(true),
                )
                .arg(entropy_arg())
                .arg(
                    Arg::new("query-param")
                        .long("query-param")
                        .help("Also accept the token from this query parameter, example: access_token")
                        .env("TOKENAUTH_QUERY_PARAM"),
                )
                .arg(
                    Arg::new("credential")
                        .short('c')
                        .long("credential")
                        .help("Accepted credential as <user>=<token hash>, see the generate command")
                        .env("TOKENAUTH_CREDENTIALS")
                        .value_delimiter(',')
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("generate")
                .about("Print fresh tokens and the hashes to configure on the server")
                .arg(entropy_arg())
                .arg(
                    Arg::new("count")
                        .short('n')
                        .long("count")
                        .help("How many tokens to generate")
                        .default_value("1")
                        .value_parser(clap::value_parser!(u16).range(1..)),
                ),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("TOKENAUTH_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}

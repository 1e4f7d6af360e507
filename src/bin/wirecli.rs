/*!
# eth wire debugging tool

Decodes a captured eth payload, or prints the status message this node would
send.

## Usage

```bash
wirecli help [subcommand]
```

## Example

```bash
wirecli decode getblockhashes \
    e4a01111111111111111111111111111111111111111111111111111111111111111820800
wirecli decode 4 c3820102
wirecli status --difficulty 1000 --head aaaa --genesis bbbb
```

Settings are read from `--config` (optional) and `ETH_WIRE_*` variables.
*/
use clap::{App, Arg};
use eth_wire::{
    CommandId, Dispatcher, EthSession, Error, ProtocolConfig, ProtocolHandler, U256,
};
use tracing::{event, Level};

struct Silent;

impl ProtocolHandler for Silent {}

fn parse_command(command: &str) -> eth_wire::Result<CommandId> {
    match command.parse::<u8>() {
        Ok(id) => CommandId::from_id(id),
        Err(_) => CommandId::from_name(command)
            .ok_or_else(|| Error::Config(format!("no command named {}", command))),
    }
}

fn parse_difficulty(value: &str) -> eth_wire::Result<U256> {
    value
        .parse::<U256>()
        .map_err(|err| Error::Config(format!("difficulty: {}", err)))
}

fn parse_hex(name: &str, value: &str) -> eth_wire::Result<Vec<u8>> {
    let value = value.trim_start_matches("0x");
    hex::decode(value).map_err(|err| Error::Config(format!("{}: {}", name, err)))
}

#[tokio::main]
pub async fn main() -> eth_wire::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let command_matches = App::new("eth wire")
        .about("Decode and build eth protocol messages")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .takes_value(true)
                .global(true)
                .help("path to a settings file"),
        )
        .subcommand(
            App::new("decode")
                .about("decodes a hex encoded payload")
                .arg(
                    Arg::with_name("command")
                        .required(true)
                        .index(1)
                        .help("command name or id"),
                )
                .arg(
                    Arg::with_name("payload")
                        .required(true)
                        .index(2)
                        .help("payload bytes as hex"),
                ),
        )
        .subcommand(
            App::new("status")
                .about("prints the status message for the given chain state")
                .arg(
                    Arg::with_name("difficulty")
                        .short("d")
                        .long("difficulty")
                        .takes_value(true)
                        .required(true)
                        .help("total chain difficulty"),
                )
                .arg(
                    Arg::with_name("head")
                        .long("head")
                        .takes_value(true)
                        .required(true)
                        .help("chain head hash as hex"),
                )
                .arg(
                    Arg::with_name("genesis")
                        .short("g")
                        .long("genesis")
                        .takes_value(true)
                        .required(true)
                        .help("genesis hash as hex"),
                ),
        )
        .get_matches();

    let protocol_config = ProtocolConfig::load(command_matches.value_of("config"))?;
    event!(Level::DEBUG, "{:?}", protocol_config);

    if let Some(matches) = command_matches.subcommand_matches("decode") {
        let command = parse_command(matches.value_of("command").unwrap_or_default())?;
        let payload = parse_hex("payload", matches.value_of("payload").unwrap_or_default())?;
        let message = Dispatcher::new(protocol_config.clone())
            .dispatch(command as u8, &payload)
            .await?;
        println!("{}: {:#?}", command.name(), message);
    }
    if let Some(matches) = command_matches.subcommand_matches("status") {
        let difficulty = parse_difficulty(matches.value_of("difficulty").unwrap_or_default())?;
        let head = parse_hex("head", matches.value_of("head").unwrap_or_default())?;
        let genesis = parse_hex("genesis", matches.value_of("genesis").unwrap_or_default())?;
        let mut session = EthSession::new("cli", protocol_config, 0, Silent);
        if let Some((wire_id, payload)) = session.send_status(difficulty, &head, &genesis)? {
            println!("{} {}", wire_id, hex::encode(payload));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("newblock").unwrap(), CommandId::NewBlock);
        assert_eq!(parse_command("4").unwrap(), CommandId::BlockHashes);
        assert!(matches!(parse_command("hello"), Err(Error::Config(_))));
        assert_eq!(parse_command("9"), Err(Error::UnknownCommand(9)));
    }

    #[test]
    fn test_bad_arguments_are_config_errors() {
        assert_eq!(parse_hex("head", "0xaabb").unwrap(), vec![0xaa, 0xbb]);
        assert!(matches!(parse_hex("head", "zz"), Err(Error::Config(_))));
        assert!(matches!(parse_difficulty("lots"), Err(Error::Config(_))));
        assert_eq!(parse_difficulty("1000").unwrap(), U256::from(1000u64));
        let wide = parse_difficulty("340282366920938463463374607431768211456").unwrap();
        assert_eq!(wide, U256::from(u128::MAX) + U256::from(1u8));
    }
}

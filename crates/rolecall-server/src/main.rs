use clap::Parser;
use rolecall::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "rolecall-server")]
#[command(version, about = "Deals unique roles to the members of a room")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "ROLECALL_BIND", default_value = "0.0.0.0:8000")]
    bind: String,

    /// Members required before the host may start
    #[arg(long, env = "ROLECALL_MIN_PLAYERS", default_value_t = 1)]
    min_players: usize,

    /// Basic flavor: no explicit leave, no destroy
    #[arg(long, env = "ROLECALL_BASIC")]
    basic: bool,
}

impl Args {
    fn room_config(&self) -> RoomConfig {
        let base = if self.basic {
            RoomConfig::basic()
        } else {
            RoomConfig::default()
        };
        RoomConfig {
            min_players_to_start: self.min_players,
            ..base
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), RolecallError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.room_config();
    tracing::info!(
        bind = %args.bind,
        min_players = config.start_threshold(),
        allow_disband = config.allow_disband,
        "starting rolecall"
    );

    let server = RolecallServer::builder()
        .bind(&args.bind)
        .room_config(config)
        .build()
        .await?;
    server.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["rolecall-server"]);
        assert_eq!(args.bind, "0.0.0.0:8000");
        assert_eq!(args.room_config(), RoomConfig::default());
    }

    #[test]
    fn test_basic_flag_disables_disband() {
        let args = Args::parse_from(["rolecall-server", "--basic", "--min-players", "3"]);
        let config = args.room_config();
        assert!(!config.allow_disband);
        assert_eq!(config.min_players_to_start, 3);
    }
}

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "rowenum",
    about = "rowenum — persisted enums backed by table rows",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Declare every enum in the config, creating missing tables and rows.
    Sync {
        /// Path to the enums.toml declaration file
        #[arg(short, long, default_value = "enums.toml")]
        config: String,
    },
    /// List the members of one enum type.
    ///
    /// Declares the type first, so required rows missing from the store
    /// are created before listing.
    List {
        #[arg(short, long, default_value = "enums.toml")]
        config: String,
        /// Enum type name, as declared in the config
        type_name: String,
        /// Include inactive (legacy) members
        #[arg(short, long)]
        all: bool,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Print the constant identifier a member name is exposed under.
    Constant {
        name: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rowenum=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sync { config } => commands::sync::sync(&config),
        Commands::List {
            config,
            type_name,
            all,
            format,
        } => commands::list::list(&config, &type_name, all, &format),
        Commands::Constant { name } => {
            println!("{}", rowenum::constant_identifier(&name));
            Ok(())
        }
    }
}

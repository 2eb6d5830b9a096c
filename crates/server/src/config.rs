use std::path::PathBuf;

use clap::Parser;

/// Command-line configuration for the treebase server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "treebase",
    about = "Browse and edit a remote JSON store from your browser"
)]
pub struct Args {
    /// Remote store base URL (e.g. https://myapp.example-db.com)
    #[arg(short, long)]
    pub database: String,

    /// Service account JSON file used to mint access tokens
    #[arg(short = 's', long)]
    pub service_account: Option<PathBuf>,

    /// Static access token for the store REST API, used only when no
    /// service account is given
    #[arg(short, long)]
    pub token: Option<String>,

    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: String,

    /// Directory holding the built web UI
    #[arg(long, default_value = "build")]
    pub web_dir: PathBuf,

    /// Reject DELETE requests instead of forwarding them
    #[arg(long)]
    pub disable_delete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_invocation_parses() {
        let args = Args::parse_from(["treebase", "--database", "https://db.example.com"]);
        assert_eq!(args.database, "https://db.example.com");
        assert_eq!(args.port, 8080);
        assert!(args.service_account.is_none());
        assert!(!args.disable_delete);
    }

    #[test]
    fn short_flags_parse() {
        let args = Args::parse_from([
            "treebase",
            "-d",
            "https://db.example.com",
            "-t",
            "secret",
            "--disable-delete",
        ]);
        assert_eq!(args.token.as_deref(), Some("secret"));
        assert!(args.disable_delete);
    }
}

mod content;
mod media;

#[cfg(any(target_arch = "wasm32", test))]
mod gallery;
#[cfg(any(target_arch = "wasm32", test))]
mod lightbox;
#[cfg(any(target_arch = "wasm32", test))]
mod location;
#[cfg(any(target_arch = "wasm32", test))]
mod transport;

#[cfg(target_arch = "wasm32")]
mod frontend;
#[cfg(target_arch = "wasm32")]
mod lightbox_view;

#[cfg(not(target_arch = "wasm32"))]
mod logging;
#[cfg(not(target_arch = "wasm32"))]
mod serve;
#[cfg(not(target_arch = "wasm32"))]
mod sync;

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use crate::{logging, serve, sync};
    use clap::{Parser, Subcommand};
    use std::path::PathBuf;

    /// Tooling for the portfolio site. The site itself is built with `trunk build --release`.
    #[derive(Debug, Parser)]
    #[command(version, about)]
    pub struct Cli {
        #[command(subcommand)]
        command: Command,
    }

    #[derive(Debug, Subcommand)]
    enum Command {
        /// Serve the built site with deep-link fallback to index.html.
        Serve {
            #[arg(long, env = "PORT", default_value_t = 8080)]
            port: u16,
            #[arg(long, env = "DIST_DIR", default_value = "dist")]
            dist: PathBuf,
        },
        /// Rebuild `portfolio.images` in the data file from the image folders.
        Sync {
            #[arg(long, env = "IMAGE_DIR", default_value = "assets/images")]
            images: PathBuf,
            #[arg(long, env = "DATA_FILE", default_value = "data/portfolio.json")]
            data: PathBuf,
        },
        /// Validate the data file and log per-category counts.
        Check {
            #[arg(long, env = "DATA_FILE", default_value = "data/portfolio.json")]
            data: PathBuf,
        },
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let cli = Cli::parse();
        logging::init(logging::parse_log_level(
            std::env::var("LOG_LEVEL").ok().as_deref(),
        ));

        match cli.command {
            Command::Serve { port, dist } => {
                let runtime = tokio::runtime::Runtime::new()?;
                runtime.block_on(serve::run(serve::ServeConfig {
                    port,
                    dist_dir: dist,
                }))
            }
            Command::Sync { images, data } => {
                sync::sync_portfolio(&images, &data)?;
                Ok(())
            }
            Command::Check { data } => {
                sync::check_portfolio(&data)?;
                Ok(())
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use clap::CommandFactory;

        #[test]
        fn cli_definition_is_consistent() {
            Cli::command().debug_assert();
        }

        #[test]
        fn serve_flags_override_defaults() {
            let cli = Cli::try_parse_from(["photo-portfolio", "serve", "--port", "9000", "--dist", "out"])
                .expect("valid arguments");

            match cli.command {
                Command::Serve { port, dist } => {
                    assert_eq!(port, 9000);
                    assert_eq!(dist, PathBuf::from("out"));
                }
                other => panic!("unexpected command: {other:?}"),
            }
        }

        #[test]
        fn unknown_subcommand_is_rejected() {
            assert!(Cli::try_parse_from(["photo-portfolio", "deploy"]).is_err());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(error) = cli::run() {
        logging::log_event(
            log::Level::Error,
            "command_failed",
            serde_json::json!({ "error": error.to_string() }),
        );
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    frontend::run();
}

use clap::{ArgAction, Parser};
use colored::Colorize;
use std::process::ExitCode;

mod aws_sso;
mod catalog;
mod config;
mod error;
mod logging;
mod login;
#[cfg(test)]
mod mock;
mod start_url;
mod token_cache;

use aws_sso::{Options, SSO};
use catalog::SsoConnector;
use login::AwsCli;

/// Build AWS config file from SSO login
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// SSO start URL, e.g. my-org.awsapps.com/start
    #[arg(value_name = "START_URL")]
    start_url: String,

    /// Default region to add to profiles
    #[arg(short = 'r', long = "region", default_value = "us-east-1")]
    default_region: String,

    /// Overwrite config if it already exists
    #[arg(short, long)]
    force: bool,

    /// SSO region
    #[arg(long, default_value = "us-east-1")]
    sso_region: String,

    /// SSO session name
    #[arg(long = "sso-session", default_value = "default")]
    sso_session: String,

    /// Increase diagnostic output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

async fn run(args: Args) -> error::Result<()> {
    let options = Options {
        config_file: config::default_config_file()?,
        start_url: args.start_url,
        sso_session_name: args.sso_session,
        sso_region: args.sso_region,
        default_region: args.default_region,
        force: args.force,
    };
    tracing::debug!(?options, "starting");
    let sso = SSO::new(options, AwsCli::locate(), SsoConnector);
    let profiles = sso.update_config().await?;
    println!("Done, {} profiles written", profiles.len());
    Ok(())
}

fn render_error(err: &error::Error) -> String {
    format!("error: {err}").red().to_string()
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", render_error(&err));
            ExitCode::FAILURE
        }
    }
}

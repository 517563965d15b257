use clap::Parser;
use log::error;
use std::process::ExitCode;
use wxbot::commands::{dispatch, Cli};
use wxbot::WxBot;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let bot = match WxBot::new().await {
        Ok(bot) => bot,
        Err(e) => {
            error!("Failed to start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let reply = dispatch(&bot, &cli.user, cli.command).await;
    println!("{reply}");
    ExitCode::SUCCESS
}

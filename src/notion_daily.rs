use daily_cli::daily_cli_opts::DailyCliOpts;

#[tokio::main]
async fn main() {
    if let Err(e) = DailyCliOpts::process_args().await {
        eprintln!("{e:?}");
    }
}

use health_cli::health_cli_opts::HealthCliOpts;

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = HealthCliOpts::process_args().await {
        println!("Error: {e}");
        std::process::exit(1);
    }
}

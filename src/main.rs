use clap::Parser;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = enphase_home::cli::Cli::parse();
    enphase_home::init_logging(cli.verbose);
    let exit_code = enphase_home::run(cli).await;
    std::process::exit(exit_code);
}

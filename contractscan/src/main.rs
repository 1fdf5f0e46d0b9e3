use anyhow::Error;
use contractscan_lib::api::explorer::ExplorerClient;
use contractscan_lib::config::Config;
use contractscan_lib::harvest;
use contractscan_lib::harvest::Harvester;
use simplelog::*;

fn main() -> Result<(), Error> {
    TermLogger::init(
        LevelFilter::Info,
        ConfigBuilder::new()
            .add_filter_allow_str("contractscan")
            .set_time_format_str("[%d.%m.%Y; %T]")
            .build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let config = Config::default();
    let explorer = ExplorerClient::new(&config)?;

    let harvester = Harvester::new(&explorer, config.rate_limit_delay);
    let results = harvester.run(&config.contracts, &mut std::io::stdout())?;

    // Nothing is written unless every contract was processed
    harvest::save(&results, &config.output_path)?;
    println!("\nContract information saved to {}", config.output_path.display());

    print!("\n{}", harvest::summary(config.contracts.len(), &results));
    Ok(())
}

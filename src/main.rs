use ebscost::aws::{
    CredentialSource, DescribeVolumesFile, Ec2VolumeClient, InventoryInput, PricingClient,
    VolumeSource,
};
use ebscost::billing::{build_report, region_display_name};
use ebscost::cli::Cli;
use ebscost::config::Config;
use ebscost::error::AppError;
use ebscost::ui::{render, OutputFormat, RenderOptions};
use ebscost::utils::init_logging;
use tracing::debug;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    // Handle configuration commands
    if cli.init {
        return Config::init();
    }

    if cli.print {
        let config = Config::load().unwrap_or_else(|_| Config::default());
        return config.print();
    }

    if cli.check {
        let config = Config::load()?;
        config.check()?;
        println!("✓ Configuration valid");
        return Ok(());
    }

    let region = cli
        .region
        .clone()
        .ok_or_else(|| AppError::Config("a region is required".to_string()))?;

    // Reject unknown regions before any network call
    region_display_name(&region)?;

    let config = Config::load()?;
    config.check()?;

    let source = CredentialSource {
        explicit: cli.explicit_keys(),
        profile: cli.profile.clone().unwrap_or_else(|| config.aws.profile.clone()),
        explicit_profile: cli.profile.is_some(),
        credentials_file: None,
    };
    let credentials = source.resolve()?;

    let endpoint = url::Url::parse(&config.pricing.endpoint)
        .map_err(|e| AppError::Config(format!("pricing.endpoint: {}", e)))?;
    let client = PricingClient::new(
        endpoint,
        config.pricing.signing_region.clone(),
        credentials.clone(),
        config.pricing.timeout(),
    )?;

    let volumes: Box<dyn VolumeSource> = match &cli.volumes {
        Some(arg) => Box::new(DescribeVolumesFile::new(InventoryInput::from_arg(arg))),
        None => {
            let ec2_endpoint = match &config.aws.ec2_endpoint {
                Some(endpoint) => url::Url::parse(endpoint)
                    .map_err(|e| AppError::Config(format!("aws.ec2_endpoint: {}", e)))?,
                None => Ec2VolumeClient::regional_endpoint(&region)?,
            };
            Box::new(Ec2VolumeClient::new(
                ec2_endpoint,
                region.clone(),
                credentials,
                config.pricing.timeout(),
            )?)
        }
    };
    let records = volumes.list_volumes().await?;
    debug!(volumes = records.len(), "volume inventory loaded");

    let report = build_report(&region, &records, &client, config.pricing.timeout()).await?;

    let format = if cli.json {
        OutputFormat::Json
    } else if cli.verbose {
        OutputFormat::Verbose
    } else {
        OutputFormat::Summary
    };
    let options = RenderOptions {
        format,
        color: config.report.color && !cli.no_color,
    };
    print!("{}", render(&report, options)?);

    Ok(())
}

use crate::advisory;
use crate::config::{load_config, AppConfig};
use crate::input_parameters::{input_schema, InputParameters, InputRecord};
use crate::prediction_service::load_model;
use crate::water_advisor::WaterAdvisor;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level CLI interface for the crop water advisor
#[derive(Parser, Debug)]
#[command(
    name = "cropwater",
    version,
    about = "Predict optimal crop water requirements and suggest water-saving measures"
)]
pub struct Cli {
    /// Configuration file (defaults to ./cropwater.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Model artifact, overriding model.path from the configuration
    #[arg(long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Predict the water requirement and print suggestions
    Predict {
        #[command(flatten)]
        inputs: InputArgs,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run only the advisory rules (no model needed)
    Advise {
        #[command(flatten)]
        inputs: InputArgs,
        #[arg(long)]
        json: bool,
    },

    /// Print accepted categories, numeric domains and feature column order
    Schema,

    /// Serve the HTTP API
    Serve {
        /// Host/IP to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },
}

/// The twelve request inputs, with the input form defaults.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Sandy, Clay, Loamy, Silty or Peaty
    #[arg(long, default_value = "Sandy")]
    pub soil_type: String,
    /// Rice, Wheat, Maize, Soybean or Cotton
    #[arg(long, default_value = "Rice")]
    pub crop_type: String,
    /// Seedling, Vegetative, Flowering or Fruiting
    #[arg(long, default_value = "Seedling")]
    pub growth_stage: String,
    /// Drip, Sprinkler, Flood or Manual
    #[arg(long, default_value = "Drip")]
    pub irrigation_method: String,
    /// °C, 15.0 to 40.0
    #[arg(long, default_value_t = 25.0)]
    pub temperature: f64,
    /// %, 20.0 to 100.0
    #[arg(long, default_value_t = 50.0)]
    pub humidity: f64,
    /// m/s, 0.5 to 15.0
    #[arg(long, default_value_t = 5.0)]
    pub wind_speed: f64,
    /// mm/day, 1.0 to 10.0
    #[arg(long, default_value_t = 5.0)]
    pub evapotranspiration: f64,
    /// mm, 0.0 to 200.0
    #[arg(long, default_value_t = 50.0)]
    pub rainfall: f64,
    /// %, 5.0 to 40.0
    #[arg(long, default_value_t = 20.0)]
    pub soil_moisture: f64,
    /// %, 10.0 to 50.0
    #[arg(long, default_value_t = 30.0)]
    pub water_retention: f64,
    /// 1 (poor) to 5 (excellent)
    #[arg(long, default_value_t = 3)]
    pub drainage_properties: i64,
}

impl From<InputArgs> for InputRecord {
    fn from(args: InputArgs) -> Self {
        InputRecord {
            soil_type: args.soil_type,
            crop_type: args.crop_type,
            growth_stage: args.growth_stage,
            irrigation_method: args.irrigation_method,
            temperature: args.temperature,
            humidity: args.humidity,
            wind_speed: args.wind_speed,
            evapotranspiration: args.evapotranspiration,
            rainfall: args.rainfall,
            soil_moisture: args.soil_moisture,
            water_retention: args.water_retention,
            drainage_properties: args.drainage_properties,
        }
    }
}

impl InputArgs {
    pub fn to_parameters(&self) -> anyhow::Result<InputParameters> {
        let record = InputRecord::from(self.clone());
        InputParameters::try_from(record).context("Invalid input parameters")
    }
}

/// Resolve configuration with CLI overrides applied.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = load_config(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(model) = &cli.model {
        config.model.path = model.clone();
    }
    Ok(config)
}

/// Load the model once and build the advisor. Any failure here is fatal.
pub fn startup(config: &AppConfig) -> anyhow::Result<Arc<WaterAdvisor>> {
    let model = load_model(&config.model.path).map_err(|e| {
        tracing::error!("Model startup failed: {e}");
        anyhow::Error::new(e).context(
            "Model file not available. Ensure the model artifact exists at the configured path.",
        )
    })?;

    Ok(Arc::new(
        WaterAdvisor::new(model).with_domain_recheck(config.validation.recheck_domains),
    ))
}

pub fn dispatch(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Predict { inputs, json } => {
            let params = inputs.to_parameters()?;
            let advisor = startup(&config)?;
            let report = advisor.advise(&params)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
            }
        }
        Commands::Advise { inputs, json } => {
            let params = inputs.to_parameters()?;
            let advisory = advisory::evaluate(&params);

            if json {
                println!("{}", serde_json::to_string_pretty(&advisory)?);
            } else {
                for line in advisory.lines() {
                    if advisory.is_balanced() {
                        println!("{line}");
                    } else {
                        println!("- {line}");
                    }
                }
            }
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&input_schema())?);
        }
        Commands::Serve { host, port } => {
            let advisor = startup(&config)?;
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);

            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to build Tokio runtime")?;
            rt.block_on(crate::web::serve(advisor, &host, port))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::{IrrigationMethod, SoilType};

    #[test]
    fn test_predict_defaults_match_input_form() {
        let cli = Cli::try_parse_from(["cropwater", "predict"]).unwrap();
        match cli.command {
            Commands::Predict { inputs, json } => {
                assert!(!json);
                assert_eq!(inputs.to_parameters().unwrap(), InputParameters::default());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_flags_override_inputs() {
        let cli = Cli::try_parse_from([
            "cropwater",
            "--model",
            "m.json",
            "advise",
            "--soil-type",
            "peaty",
            "--irrigation-method",
            "Flood",
            "--drainage-properties",
            "1",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.model.as_deref(), Some("m.json"));

        match cli.command {
            Commands::Advise { inputs, json } => {
                assert!(json);
                let params = inputs.to_parameters().unwrap();
                assert_eq!(params.soil_type, SoilType::Peaty);
                assert_eq!(params.irrigation_method, IrrigationMethod::Flood);
                assert_eq!(params.drainage_properties.value(), 1);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_out_of_domain_flag_is_rejected() {
        let cli = Cli::try_parse_from(["cropwater", "advise", "--humidity", "5"]).unwrap();
        match cli.command {
            Commands::Advise { inputs, .. } => assert!(inputs.to_parameters().is_err()),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_startup_fails_fast_on_missing_model() {
        let mut config = AppConfig::default();
        config.model.path = "missing/dir/model.onnx".to_string();
        let err = startup(&config).err().unwrap();
        assert!(format!("{err:#}").contains("Model file not found"));
    }
}

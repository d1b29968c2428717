//! Device license commands.

use clap::{Args, Subcommand};

use daghbas_core::error::AppError;
use daghbas_service::ServiceContainer;

use crate::output::{self, OutputFormat};

/// Arguments for license commands
#[derive(Debug, Args)]
pub struct LicenseArgs {
    /// License subcommand
    #[command(subcommand)]
    pub command: LicenseCommand,
}

/// License subcommands
#[derive(Debug, Subcommand)]
pub enum LicenseCommand {
    /// Activate a device and print its license token
    Activate {
        /// Device ID
        #[arg(short, long)]
        device_id: String,
        /// Customer name
        #[arg(short, long)]
        customer: String,
        /// Installer master key
        #[arg(long, env = "DAGHBAS_MASTER_KEY", hide_env_values = true)]
        master_key: String,
    },
    /// Check a license token against its device
    Validate {
        /// Device ID
        #[arg(short, long)]
        device_id: String,
        /// License token
        #[arg(short, long)]
        token: String,
    },
    /// Deactivate a device
    Deactivate {
        /// Device ID
        #[arg(short, long)]
        device_id: String,
        /// Installer master key
        #[arg(long, env = "DAGHBAS_MASTER_KEY", hide_env_values = true)]
        master_key: String,
    },
}

/// Execute license commands
pub async fn execute(
    args: &LicenseArgs,
    services: &ServiceContainer,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        LicenseCommand::Activate {
            device_id,
            customer,
            master_key,
        } => {
            let activation = services
                .licenses
                .activate(device_id, customer, master_key)
                .await?;
            match format {
                OutputFormat::Json => output::print_json(&activation),
                OutputFormat::Table => {
                    output::print_success(&format!("Device {} activated", activation.device_id));
                    output::print_kv("License", &activation.license_token);
                }
            }
        }
        LicenseCommand::Validate { device_id, token } => {
            let verdict = services.licenses.validate(device_id, token).await;
            match format {
                OutputFormat::Json => output::print_json(&verdict),
                OutputFormat::Table => {
                    output::print_kv("Valid", &verdict.valid.to_string());
                    output::print_kv("Message", &verdict.message);
                }
            }
            if !verdict.valid {
                return Err(AppError::license(verdict.message));
            }
        }
        LicenseCommand::Deactivate {
            device_id,
            master_key,
        } => {
            services.licenses.deactivate(device_id, master_key).await?;
            output::print_success(&format!("Device {device_id} deactivated"));
        }
    }
    Ok(())
}

use anyhow::Error;
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use log::info;
use std::{ffi::OsString, path::PathBuf};
use tokio::task::spawn_blocking;

use apple_health_parser::apple_health_extractor::AppleHealthExtractor;
use google_fit_lib::{
    data_source_registrar::{DataSourceRegistrar, WeightSourceDescriptor},
    google_fit_client::GoogleFitClient,
    google_oauth::{ConsolePrompt, GoogleOAuth},
    weight_importer::WeightImporter,
};
use health_lib::health_config::{flag_or_config, HealthConfig};

#[derive(Parser, Debug, PartialEq, Eq)]
#[command(version, about = "Move Apple Health weight records into Google Fit")]
pub struct HealthCliOpts {
    #[command(subcommand)]
    pub command: Option<HealthCommand>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum HealthCommand {
    /// Parse an Apple Health export into a `Date,Weight` csv file
    Parse {
        /// Output file
        #[arg(short, long)]
        out: PathBuf,
        /// Apple Health XML file to parse
        #[arg(short = 'i', long)]
        xml_file: PathBuf,
    },
    /// Upload a `Date,Weight` csv file to Google Fit
    Import {
        /// Google client id, falls back to `GOOGLE_CLIENT_ID`
        #[arg(short, long)]
        client_id: Option<String>,
        /// Google client secret, falls back to `GOOGLE_CLIENT_SECRET`
        #[arg(short = 's', long)]
        client_secret: Option<String>,
        /// Google project number, falls back to `GOOGLE_PROJECT_NUMBER`
        #[arg(short, long)]
        project_number: Option<String>,
        /// Input csv file
        #[arg(short, long)]
        input: PathBuf,
    },
}

impl HealthCliOpts {
    /// `Ok(None)` when there is no command to run, either because none was
    /// given or because it isn't one we know.
    pub fn parse_command<I, T>(args: I) -> Result<Option<HealthCommand>, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(opts) => Ok(opts.command),
            Err(e) if e.kind() == ErrorKind::InvalidSubcommand => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// # Errors
    /// Return error if the selected command fails
    pub async fn process_args() -> Result<(), Error> {
        let command = Self::parse_command(std::env::args_os()).unwrap_or_else(|e| e.exit());
        match command {
            Some(command) => command.run().await,
            None => {
                Self::command().print_help()?;
                Ok(())
            }
        }
    }
}

impl HealthCommand {
    /// # Errors
    /// Return error if extraction or import fails
    pub async fn run(self) -> Result<(), Error> {
        match self {
            Self::Parse { out, xml_file } => {
                let summary = spawn_blocking(move || {
                    AppleHealthExtractor::new().extract_file(&xml_file, &out)
                })
                .await??;
                println!(
                    "wrote {} rows from {} records",
                    summary.rows_written, summary.records_seen
                );
            }
            Self::Import {
                client_id,
                client_secret,
                project_number,
                input,
            } => {
                let config = HealthConfig::get_config(None)?;
                let client_id = flag_or_config(
                    client_id.map(Into::into),
                    config.google_client_id.as_ref(),
                    "GOOGLE_CLIENT_ID",
                )?;
                let client_secret = flag_or_config(
                    client_secret.map(Into::into),
                    config.google_client_secret.as_ref(),
                    "GOOGLE_CLIENT_SECRET",
                )?;
                let project_number = flag_or_config(
                    project_number.map(Into::into),
                    config.google_project_number.as_ref(),
                    "GOOGLE_PROJECT_NUMBER",
                )?;

                // validate the whole file before asking for authorization
                let importer = WeightImporter::from_csv_file(&input)?;
                info!("{} samples to upload", importer.samples().len());

                let oauth = GoogleOAuth::new(&config, client_id, client_secret)?;
                let token = oauth.authorize(&ConsolePrompt).await?;
                let client = GoogleFitClient::new(config.google_fit_api_url.as_str(), token)?;

                let registrar = DataSourceRegistrar::new(
                    WeightSourceDescriptor::from_config(&config),
                    project_number,
                );
                let data_source = registrar.ensure_data_source(&client).await?;
                let summary = importer.upload(&client, &data_source).await?;
                println!(
                    "uploaded {} points to dataset {}",
                    summary.points, summary.dataset_id
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;
    use std::path::PathBuf;

    use crate::health_cli_opts::{HealthCliOpts, HealthCommand};

    const BIN: &str = "apple-health-google-fit";

    #[test]
    fn test_parse_command() {
        let command =
            HealthCliOpts::parse_command([BIN, "parse", "-o", "weight.csv", "-i", "export.xml"])
                .unwrap();
        assert_eq!(
            command,
            Some(HealthCommand::Parse {
                out: PathBuf::from("weight.csv"),
                xml_file: PathBuf::from("export.xml"),
            })
        );

        let command = HealthCliOpts::parse_command([
            BIN,
            "parse",
            "--out",
            "weight.csv",
            "--xml-file",
            "export.xml",
        ])
        .unwrap();
        assert!(matches!(command, Some(HealthCommand::Parse { .. })));
    }

    #[test]
    fn test_import_command() {
        let command = HealthCliOpts::parse_command([
            BIN,
            "import",
            "-c",
            "client-id",
            "-s",
            "secret",
            "-p",
            "123456789012",
            "-i",
            "weight.csv",
        ])
        .unwrap();
        assert_eq!(
            command,
            Some(HealthCommand::Import {
                client_id: Some("client-id".into()),
                client_secret: Some("secret".into()),
                project_number: Some("123456789012".into()),
                input: PathBuf::from("weight.csv"),
            })
        );

        let command = HealthCliOpts::parse_command([BIN, "import", "--input", "weight.csv"]).unwrap();
        assert_eq!(
            command,
            Some(HealthCommand::Import {
                client_id: None,
                client_secret: None,
                project_number: None,
                input: PathBuf::from("weight.csv"),
            })
        );
    }

    #[test]
    fn test_missing_or_unknown_command() {
        assert_eq!(HealthCliOpts::parse_command([BIN]).unwrap(), None);
        assert_eq!(HealthCliOpts::parse_command([BIN, "bogus"]).unwrap(), None);
    }

    #[test]
    fn test_missing_required_flag() {
        let err = HealthCliOpts::parse_command([BIN, "parse", "-o", "weight.csv"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        HealthCliOpts::command().debug_assert();
    }
}

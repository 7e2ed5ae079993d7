use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use funnel_core::{DueDateKind, FieldUpdate};
use funnel_logging::LogDestination;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "funnel_app", version, about = "Jewelry lead funnel: collect reference images and contact details")]
pub struct Cli {
    /// Path to a ron config file (default ./funnel.ron).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Directory holding the submission log.
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,
    /// Log destination: terminal, file or both.
    #[arg(long, global = true)]
    pub log: Option<LogDestination>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one funnel session and store the submission.
    Submit(SubmitArgs),
    /// Print the stored submission log as JSON.
    List {
        /// Include the encoded images instead of their sizes.
        #[arg(long)]
        with_images: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    /// Image picked from files (repeatable).
    #[arg(long = "image", value_name = "PATH")]
    pub images: Vec<PathBuf>,
    /// Image taken with the camera (repeatable).
    #[arg(long = "camera", value_name = "PATH")]
    pub camera: Vec<PathBuf>,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long, default_value_t = 0)]
    pub budget_lower: u64,
    #[arg(long, default_value_t = 0)]
    pub budget_upper: u64,
    /// immediate, within_week, within_month or specific.
    #[arg(long, default_value = "immediate")]
    pub due: DueDateKind,
    #[arg(long)]
    pub specific_date: Option<String>,
}

impl SubmitArgs {
    /// Form edits in the order the funnel steps ask for them.
    pub fn field_updates(&self) -> Vec<FieldUpdate> {
        vec![
            FieldUpdate::FirstName(self.first_name.clone()),
            FieldUpdate::LastName(self.last_name.clone()),
            FieldUpdate::PhoneNumber(self.phone.clone()),
            FieldUpdate::BudgetLower(self.budget_lower),
            FieldUpdate::BudgetUpper(self.budget_upper),
            FieldUpdate::DueDate(self.due),
            FieldUpdate::SpecificDate(self.specific_date.clone()),
        ]
    }
}

impl Cli {
    /// Command-line flags win over the config file.
    pub fn apply_overrides(&self, mut config: AppConfig) -> AppConfig {
        if let Some(dir) = &self.store_dir {
            config.store_dir = dir.clone();
        }
        if let Some(log) = self.log {
            config.log = log.to_string();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use crate::config::AppConfig;
    use clap::Parser;
    use funnel_core::{DueDateKind, FieldUpdate};
    use funnel_logging::LogDestination;
    use std::path::PathBuf;

    #[test]
    fn submit_arguments_map_to_field_updates() {
        let cli = Cli::try_parse_from([
            "funnel_app",
            "submit",
            "--image",
            "a.jpg",
            "--image",
            "b.png",
            "--camera",
            "c.jpg",
            "--first-name",
            "Dana",
            "--last-name",
            "Levi",
            "--phone",
            "0501234567",
            "--budget-lower",
            "5000",
            "--budget-upper",
            "10000",
            "--due",
            "week",
        ])
        .unwrap();

        let Command::Submit(args) = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(args.images, vec![PathBuf::from("a.jpg"), PathBuf::from("b.png")]);
        assert_eq!(args.camera, vec![PathBuf::from("c.jpg")]);
        assert_eq!(args.due, DueDateKind::WithinWeek);
        let updates = args.field_updates();
        assert_eq!(updates.len(), 7);
        assert_eq!(updates[3], FieldUpdate::BudgetLower(5000));
        assert_eq!(updates[6], FieldUpdate::SpecificDate(None));
    }

    #[test]
    fn unknown_due_date_is_rejected() {
        let result = Cli::try_parse_from([
            "funnel_app",
            "submit",
            "--first-name",
            "a",
            "--last-name",
            "b",
            "--phone",
            "c",
            "--due",
            "someday",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_override_config() {
        let cli = Cli::try_parse_from([
            "funnel_app",
            "list",
            "--store-dir",
            "/srv/leads",
            "--log",
            "file",
        ])
        .unwrap();
        let config = cli.apply_overrides(AppConfig::default());
        assert_eq!(config.store_dir, PathBuf::from("/srv/leads"));
        assert_eq!(config.log_destination(), LogDestination::File);
    }
}

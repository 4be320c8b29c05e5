use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde_json::json;

use crate::config::Settings;
use crate::handlers::api::{self, ApiResponse, BookingVariant};
use crate::models::slot::DATE_FORMAT;
use crate::runtime;

#[derive(Parser)]
#[command(name = "tuningScheduler", about = "Piano tuning slot finder and booking API")]
pub struct Cli {
    /// KEY=VALUE config file, falls back to CONFIG_FILE
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the slots that would be offered to an address
    Slots {
        postcode: String,
        /// Only offer dates after this one (YYYY-MM-DD)
        #[arg(long)]
        after: Option<NaiveDate>,
    },
    /// Book a slot directly
    Book {
        date: String,
        time: String,
        customer_name: String,
        address: String,
        phone: String,
        /// Quote the price in the confirmation
        #[arg(long)]
        direct: bool,
    },
}

pub async fn cli(mut settings: Settings, command: Commands) {
    match command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                settings.port = port;
            }
            runtime::run_api(settings).await;
        }
        Commands::Slots { postcode, after } => {
            let state = runtime::build_state(&settings);
            let mut body = json!({ "postcode": postcode });
            if let Some(after) = after {
                body["last_offered_date"] = json!(after.format(DATE_FORMAT).to_string());
            }
            let today = today(&settings);
            let response =
                api::check_availability(&state, Some("application/json"), body.to_string().as_bytes(), today)
                    .await;
            print_response(&response);
        }
        Commands::Book {
            date,
            time,
            customer_name,
            address,
            phone,
            direct,
        } => {
            let state = runtime::build_state(&settings);
            let body = json!({
                "date": date,
                "time": time,
                "customer_name": customer_name,
                "address": address,
                "phone": phone,
            });
            let variant = if direct {
                BookingVariant::Direct
            } else {
                BookingVariant::Standard
            };
            let today = today(&settings);
            let response = api::create_booking(
                &state,
                variant,
                Some("application/json"),
                body.to_string().as_bytes(),
                today,
            )
            .await;
            print_response(&response);
        }
    }
}

fn today(settings: &Settings) -> NaiveDate {
    Utc::now().with_timezone(&settings.rules.timezone).date_naive()
}

fn print_response(response: &ApiResponse) {
    let body = serde_json::to_string_pretty(&response.body).unwrap_or_else(|_| response.body.to_string());
    if response.status.is_success() {
        println!("{}", body);
    } else {
        eprintln!("{} {}", response.status, body);
    }
}

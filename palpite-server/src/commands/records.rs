use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use dialoguer::Confirm;
use palpite_core::storage::{NumberSetStore, PaymentStore};
use palpite_core::{PalpiteError, PaymentStatus, RecordStore, Result, Storage};

#[derive(Subcommand)]
pub enum RecordCommands {
    /// List payments, newest first
    Payments,
    /// List number sets, newest first
    Numbers {
        /// Maximum number of rows
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Show a number set and its payment
    Show {
        /// Number set ID
        id: String,
    },
    /// Delete every payment and number set
    Purge {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn handle_records_command(cmd: RecordCommands, storage: &Storage) -> Result<()> {
    match cmd {
        RecordCommands::Payments => {
            let store = PaymentStore::new(storage);
            let payments = store.list_payments().await?;

            if payments.is_empty() {
                println!("No payments found.");
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["ID", "Payer", "Price", "Status", "Created", "Confirmed"]);

            for payment in &payments {
                table.add_row(vec![
                    payment.id.clone(),
                    payment.payer.clone(),
                    format!("R$ {}", payment.price),
                    payment.status.as_str().to_string(),
                    payment.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    payment
                        .confirmed_at
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ]);
            }

            println!("{}", table);
            println!(
                "Pending: {}  Confirmed: {}",
                store.count_by_status(PaymentStatus::Pending).await?,
                store.count_by_status(PaymentStatus::Confirmed).await?
            );
        }

        RecordCommands::Numbers { limit } => {
            let records = NumberSetStore::new(storage).list_number_sets(limit).await?;

            if records.is_empty() {
                println!("No number sets found.");
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["ID", "Kind", "Numbers", "Created"]);

            for record in records {
                table.add_row(vec![
                    record.id,
                    if record.paid { "premium" } else { "free" }.to_string(),
                    record.numbers.to_string(),
                    record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                ]);
            }

            println!("{}", table);
        }

        RecordCommands::Show { id } => {
            let record = storage
                .get_number_set(&id)
                .await?
                .ok_or_else(|| PalpiteError::NumberSetNotFound { id: id.clone() })?;

            println!("Number Set:");
            println!("  ID: {}", record.id);
            println!("  Kind: {}", if record.paid { "premium" } else { "free" });
            println!("  Numbers: {}", record.numbers);
            println!("  Created: {}", record.created_at);

            if let Some(payment_id) = record.payment_id {
                println!();
                match storage.get_payment(&payment_id).await? {
                    Some(payment) => {
                        println!("Payment:");
                        println!("  ID: {}", payment.id);
                        println!("  Price: R$ {}", payment.price);
                        println!("  Status: {}", payment.status.as_str());
                        if let Some(confirmed_at) = payment.confirmed_at {
                            println!("  Confirmed: {}", confirmed_at);
                        }
                    }
                    None => println!("Payment {} is missing", payment_id),
                }
            }
        }

        RecordCommands::Purge { force } => {
            if !force {
                let confirm = Confirm::new()
                    .with_prompt("Delete all payments and number sets? This action cannot be undone.")
                    .default(false)
                    .interact()?;

                if !confirm {
                    println!("Purge cancelled.");
                    return Ok(());
                }
            }

            let (payments, number_sets) = storage.purge().await?;
            println!(
                "Deleted {} payments and {} number sets.",
                payments, number_sets
            );
        }
    }

    Ok(())
}

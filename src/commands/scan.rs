use std::sync::Arc;

use chrono::Local;
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::runtime;
use crate::config::Config;
use fitscan_core::scan::ScanCommand as SessionCommand;
use fitscan_core::{
    GeminiClient, NutritionGoals, NutritionLedger, ProductLookupClient, ScanDriver, ScanEvent,
    ScanMode, ScanSession, ScanUpdate, SuggestionOutcome, SuggestionRefresher,
};

#[derive(Args)]
pub struct ScanCommand {
    /// Barcodes to scan; read one per line from stdin when omitted
    pub barcodes: Vec<String>,

    /// Keep the scanner armed between items
    #[arg(long)]
    pub continuous: bool,

    /// Ask for a meal and snack suggestion once scanning finishes
    #[arg(long)]
    pub suggest: bool,
}

impl ScanCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let client = ProductLookupClient::new(config.nutrition_db.lookup_config()?);
        // Fail before scanning rather than after
        let generator = if self.suggest {
            Some(GeminiClient::new(config.generative.gemini_config()?))
        } else {
            None
        };
        let mode = if self.continuous {
            ScanMode::Continuous
        } else {
            config.scan_mode.value
        };
        let goals = config.goals.value;

        runtime()?.block_on(self.scan(client, generator, mode, goals))
    }

    async fn scan(
        &self,
        client: ProductLookupClient,
        generator: Option<GeminiClient>,
        mode: ScanMode,
        goals: NutritionGoals,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let ledger = NutritionLedger::new();
        let session = ScanSession::new(ledger.clone(), mode);
        tracing::debug!(session = %session.id(), %mode, "Scan session started");

        let (commands, command_rx) = mpsc::channel(16);
        let (update_tx, mut updates) = mpsc::channel(16);
        let driver =
            tokio::spawn(ScanDriver::new(session, Arc::new(client)).run(command_rx, update_tx));

        // The terminal stands in for the camera, so permission is implicit
        commands.send(SessionCommand::GrantPermission).await?;

        if self.barcodes.is_empty() {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                scan_one(&commands, &mut updates, &line, &ledger, &goals).await?;
            }
        } else {
            for barcode in &self.barcodes {
                scan_one(&commands, &mut updates, barcode, &ledger, &goals).await?;
            }
        }

        drop(commands);
        let session = driver.await?;

        println!();
        println!("Scanned {} item(s)", session.items().len());
        for item in session.items() {
            println!(
                "  {}  {:<14} {}",
                item.scanned_at.with_timezone(&Local).format("%H:%M:%S"),
                item.barcode,
                item.product
            );
        }
        println!();
        println!("Total: {}", ledger.snapshot());
        print!("{}", ledger.progress(&goals));

        if let Some(generator) = generator {
            println!();
            let refresher = SuggestionRefresher::new(generator);
            match refresher.refresh(&ledger.progress(&goals)).await {
                SuggestionOutcome::Ready(set) => {
                    println!("Suggestions");
                    print!("{}", set);
                }
                SuggestionOutcome::Unavailable(reason) => {
                    println!("Suggestions unavailable: {}", reason);
                }
            }
        }

        Ok(())
    }
}

/// Arms the scanner, feeds one decode and waits for the result notice.
async fn scan_one(
    commands: &mpsc::Sender<SessionCommand>,
    updates: &mut mpsc::Receiver<ScanUpdate>,
    barcode: &str,
    ledger: &NutritionLedger,
    goals: &NutritionGoals,
) -> Result<(), Box<dyn std::error::Error>> {
    let barcode = barcode.trim();
    if barcode.is_empty() {
        return Ok(());
    }

    commands.send(SessionCommand::Start).await?;
    commands
        .send(SessionCommand::Decode(ScanEvent::barcode(barcode)))
        .await?;

    let notice = loop {
        match updates.recv().await {
            Some(ScanUpdate::Finished(notice)) => break notice,
            Some(ScanUpdate::Rejected(e)) => return Err(e.into()),
            Some(other) => tracing::debug!(?other, "Scan update"),
            None => return Err("scan driver stopped unexpectedly".into()),
        }
    };

    println!("{}", notice);
    if notice.is_success() {
        let progress = ledger.progress(goals);
        println!(
            "  Calories today: {} / {} kcal ({:.1}%)",
            progress.calories.consumed,
            progress.calories.goal,
            progress.calories.percent()
        );
    }

    commands.send(SessionCommand::Dismiss).await?;
    Ok(())
}

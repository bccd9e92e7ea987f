//! Savings circle rotation demo.
//!
//! Creates a private circle, admits members, collects every period's
//! contributions and pays each member once in join order, printing the
//! payout schedule and the reconciled treasury along the way.
//!
//! Usage: `circle-rotation-demo [accounting.toml]`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use circle_accounting::{due_date, RotationTotals};
use circle_service::{CircleError, CircleService};
use circle_store::{InMemoryCircleStorage, RecordStore};
use circle_types::{AccountingConfig, GroupDraft, GroupSettings, JoinCredentials, UserId};
use colored::Colorize;

const MONTHLY_AMOUNT: u64 = 10_000;
const MEMBERS: u32 = 6;

fn header(title: &str) {
    println!();
    println!("{}", "═".repeat(64).cyan());
    println!("  {}", title.cyan().bold());
    println!("{}", "═".repeat(64).cyan());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AccountingConfig::load(config_path.as_deref())
        .context("loading accounting config")?;
    config.validate().context("validating accounting config")?;

    let storage = Arc::new(InMemoryCircleStorage::new());
    let service = CircleService::new(Arc::clone(&storage), config);

    // ── Setup ───────────────────────────────────────────────────────
    header("Create a private circle");

    let first_due = NaiveDate::from_ymd_opt(2026, 1, 31).context("first due date")?;
    let creator = UserId::generate();
    let group = service
        .create_group(
            creator,
            GroupDraft::new(
                "Harbour street ajo",
                GroupSettings::Private {
                    secret_code: "HARBOUR-26".into(),
                },
                MONTHLY_AMOUNT,
                MEMBERS,
                first_due,
            )
            .with_description("Neighbours saving towards school fees"),
        )
        .await?;
    println!(
        "  group {} · {} per month · {} seats · treasury window {}",
        group.id.to_string().yellow(),
        group.monthly_amount,
        group.max_members,
        group.treasury_window
    );

    match service
        .join_group(
            &group.id,
            &UserId::generate(),
            &JoinCredentials::with_code("harbour-26"),
        )
        .await
    {
        Err(CircleError::Admission(reason)) => {
            println!("  wrong-case code rejected: {}", reason.to_string().red())
        }
        other => anyhow::bail!("expected a rejected join, got {other:?}"),
    }

    let mut users = vec![creator];
    for _ in 1..MEMBERS {
        let user = UserId::generate();
        let member = service
            .join_group(&group.id, &user, &JoinCredentials::with_code("HARBOUR-26"))
            .await?;
        println!("  joined with payout order {}", member.payout_order);
        users.push(user);
    }

    // ── Schedule ────────────────────────────────────────────────────
    header("Payout schedule");

    let schedule = service.payout_schedule(&group.id).await?;
    for (index, breakdown) in schedule.iter().enumerate() {
        println!(
            "  #{:<2} base {:>8} + interest {:>6} = {}",
            index + 1,
            breakdown.base_amount,
            breakdown.interest_amount,
            breakdown.total_amount.to_string().green()
        );
    }
    let totals = RotationTotals::from_schedule(&schedule);
    println!(
        "  rotation pays {} ({} interest)",
        totals.total_amount.to_string().bold(),
        totals.interest_amount
    );

    // ── Rotation ────────────────────────────────────────────────────
    header("Run the rotation");

    for period in 1..=MEMBERS {
        let due = due_date(first_due, period).context("period due date")?;
        let reminders = service
            .members_due_reminder(&group.id, period, due - Duration::days(2))
            .await?;
        println!(
            "  period {period} due {due}: {} reminder(s)",
            reminders.len()
        );

        for user in &users {
            service
                .record_contribution(
                    &group.id,
                    user,
                    period,
                    MONTHLY_AMOUNT,
                    format!("tx-{period}-{user}"),
                )
                .await?;
        }

        let event = service
            .record_payout(&group.id, format!("payout-{period}"))
            .await?;
        println!(
            "  paid order {} → {}",
            event.payout_order,
            event.breakdown.total_amount.to_string().green()
        );
    }

    // ── Treasury ────────────────────────────────────────────────────
    header("Treasury");

    let snapshot = service.treasury_snapshot(&group.id).await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    let balance = snapshot.balance();
    let shown = if balance >= 0 {
        balance.to_string().green()
    } else {
        balance.to_string().red()
    };
    println!("  balance after rotation: {shown}");

    let final_state = service.group(&group.id).await?;
    println!("  status: {}", final_state.status.to_string().bold());
    println!(
        "  ledger entries: {} · chain intact: {}",
        storage.entries().await?.len(),
        storage.verify_chain().await?
    );

    Ok(())
}

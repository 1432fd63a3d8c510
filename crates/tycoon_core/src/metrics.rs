//! Snapshot metrics computed from `GameState`.
//!
//! `compute_metrics(&GameState, &GameContent) -> MetricsSnapshot` samples the
//! player's gauges for time-series analysis. No state mutation, no randomness.

use crate::{compute_stats, GameContent, GameState, PlayerTier};
use serde::Serialize;
use std::io::Write;

/// Current schema version. Bump when fields are added, removed or reordered.
const METRICS_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub tick: u64,
    pub metrics_version: u32,
    pub day: u32,

    // Wallet
    pub money: f64,
    pub shadow_credits: f64,
    pub loan_debt: f64,
    pub credit_score: i32,
    pub unpaid_bills: u32,
    pub unpaid_bill_total: f64,

    // Career
    pub reputation: i64,
    pub tier: PlayerTier,
    pub xp: u64,
    pub perks_unlocked: u32,
    pub achievements_unlocked: u32,

    // Rig
    pub energy: f64,
    pub temperature: f64,
    pub is_overheating: bool,
    pub click_power: f64,
    pub auto_code: f64,
    pub bug_chance: f64,
    pub inventory_count: u32,
    pub equipped_count: u32,
    pub stolen_count: u32,
    pub avg_durability: f64,
    pub broken_count: u32,

    // Output
    pub lines_of_code: f64,
    pub total_bugs: u64,
    pub active_project_progress: f64,
    pub released_projects: u32,
    pub hourly_revenue: f64,

    // Risk
    pub global_heat: f64,
    pub trace_percent: f64,
    pub successful_hacks: u32,
    pub hack_streak: u32,

    // World
    pub avg_market_trend: f64,
    pub unread_emails: u32,
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

pub fn compute_metrics(state: &GameState, content: &GameContent) -> MetricsSnapshot {
    let player = &state.player;
    let stats = compute_stats(
        &player.equipped,
        &player.inventory,
        &player.unlocked_perks,
        content,
    );

    let unpaid: Vec<_> = state.finance.bills.iter().filter(|b| !b.paid).collect();
    let unpaid_bill_total = unpaid.iter().map(|b| b.amount).sum();

    let avg_durability = if player.inventory.is_empty() {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let n = player.inventory.len() as f64;
        player.inventory.iter().map(|i| i.durability).sum::<f64>() / n
    };

    let active_project_progress = player
        .active_project
        .as_ref()
        .filter(|p| p.target_lines > 0.0)
        .map_or(0.0, |p| (p.progress / p.target_lines).min(1.0));

    #[allow(clippy::cast_precision_loss)]
    let avg_market_trend = if state.market.trends.is_empty() {
        1.0
    } else {
        state.market.trends.values().sum::<f64>() / state.market.trends.len() as f64
    };

    MetricsSnapshot {
        tick: state.meta.tick,
        metrics_version: METRICS_VERSION,
        day: state.clock.day,

        money: player.money,
        shadow_credits: player.shadow_credits,
        loan_debt: state.finance.loan_debt,
        credit_score: state.finance.credit_score,
        unpaid_bills: count(unpaid.len()),
        unpaid_bill_total,

        reputation: player.reputation,
        tier: player.tier,
        xp: player.xp,
        perks_unlocked: count(player.unlocked_perks.len()),
        achievements_unlocked: count(player.achievements.len()),

        energy: player.energy,
        temperature: player.temperature,
        is_overheating: player.is_overheating,
        click_power: stats.click_power,
        auto_code: stats.auto_code,
        bug_chance: stats.bug_chance,
        inventory_count: count(player.inventory.len()),
        equipped_count: count(player.equipped.len()),
        stolen_count: count(player.inventory.iter().filter(|i| i.is_stolen).count()),
        avg_durability,
        broken_count: count(
            player
                .inventory
                .iter()
                .filter(|i| crate::wear::is_broken(i))
                .count(),
        ),

        lines_of_code: player.lines_of_code,
        total_bugs: player.total_bugs,
        active_project_progress,
        released_projects: count(player.released_projects.len()),
        hourly_revenue: player.released_projects.iter().map(|p| p.base_revenue).sum(),

        global_heat: state.risk.global_heat,
        trace_percent: state.risk.trace_percent,
        successful_hacks: player.hack_stats.successful_hacks,
        hack_streak: player.hack_stats.streak,

        avg_market_trend,
        unread_emails: count(state.inbox.emails.iter().filter(|e| !e.read).count()),
    }
}

fn tier_label(tier: PlayerTier) -> &'static str {
    match tier {
        PlayerTier::Trainee => "trainee",
        PlayerTier::Junior => "junior",
        PlayerTier::Mid => "mid",
        PlayerTier::Senior => "senior",
        PlayerTier::Lead => "lead",
        PlayerTier::Architect => "architect",
    }
}

/// Write the CSV header row for metrics.
pub fn write_metrics_header(writer: &mut impl std::io::Write) -> std::io::Result<()> {
    writeln!(
        writer,
        "tick,metrics_version,day,\
         money,shadow_credits,loan_debt,credit_score,unpaid_bills,unpaid_bill_total,\
         reputation,tier,xp,perks_unlocked,achievements_unlocked,\
         energy,temperature,is_overheating,click_power,auto_code,bug_chance,\
         inventory_count,equipped_count,stolen_count,avg_durability,broken_count,\
         lines_of_code,total_bugs,active_project_progress,released_projects,hourly_revenue,\
         global_heat,trace_percent,successful_hacks,hack_streak,\
         avg_market_trend,unread_emails"
    )
}

/// Append a single metrics snapshot as a CSV row.
pub fn append_metrics_row(
    writer: &mut impl std::io::Write,
    snapshot: &MetricsSnapshot,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "{},{},{},{:.2},{:.2},{:.2},{},{},{:.2},{},{},{},{},{},{:.2},{:.2},{},{},{},{:.4},{},{},{},{:.2},{},{:.1},{},{:.3},{},{:.3},{:.2},{:.2},{},{},{:.3},{}",
        snapshot.tick,
        snapshot.metrics_version,
        snapshot.day,
        snapshot.money,
        snapshot.shadow_credits,
        snapshot.loan_debt,
        snapshot.credit_score,
        snapshot.unpaid_bills,
        snapshot.unpaid_bill_total,
        snapshot.reputation,
        tier_label(snapshot.tier),
        snapshot.xp,
        snapshot.perks_unlocked,
        snapshot.achievements_unlocked,
        snapshot.energy,
        snapshot.temperature,
        snapshot.is_overheating,
        snapshot.click_power,
        snapshot.auto_code,
        snapshot.bug_chance,
        snapshot.inventory_count,
        snapshot.equipped_count,
        snapshot.stolen_count,
        snapshot.avg_durability,
        snapshot.broken_count,
        snapshot.lines_of_code,
        snapshot.total_bugs,
        snapshot.active_project_progress,
        snapshot.released_projects,
        snapshot.hourly_revenue,
        snapshot.global_heat,
        snapshot.trace_percent,
        snapshot.successful_hacks,
        snapshot.hack_streak,
        snapshot.avg_market_trend,
        snapshot.unread_emails,
    )
}

/// Write a collection of snapshots to a CSV file.
pub fn write_metrics_csv(path: &str, snapshots: &[MetricsSnapshot]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_metrics_header(&mut file)?;
    for snapshot in snapshots {
        append_metrics_row(&mut file, snapshot)?;
    }
    Ok(())
}

/// Maximum data rows per CSV file before rotating to a new file.
const MAX_ROWS_PER_FILE: usize = 50_000;

/// Rotating metrics CSV writer. Splits into numbered files
/// (`metrics_000.csv`, `metrics_001.csv`, ...) after [`MAX_ROWS_PER_FILE`] rows each.
pub struct MetricsFileWriter {
    run_dir: std::path::PathBuf,
    file_index: u32,
    rows_in_current_file: usize,
    writer: std::io::BufWriter<std::fs::File>,
}

impl MetricsFileWriter {
    pub fn new(run_dir: std::path::PathBuf) -> std::io::Result<Self> {
        let writer = open_csv_file(&run_dir, 0)?;
        Ok(Self {
            run_dir,
            file_index: 0,
            rows_in_current_file: 0,
            writer,
        })
    }

    pub fn write_row(&mut self, snapshot: &MetricsSnapshot) -> std::io::Result<()> {
        if self.rows_in_current_file >= MAX_ROWS_PER_FILE {
            self.writer.flush()?;
            self.file_index += 1;
            self.writer = open_csv_file(&self.run_dir, self.file_index)?;
            self.rows_in_current_file = 0;
        }
        append_metrics_row(&mut self.writer, snapshot)?;
        self.rows_in_current_file += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

fn open_csv_file(
    run_dir: &std::path::Path,
    index: u32,
) -> std::io::Result<std::io::BufWriter<std::fs::File>> {
    let path = run_dir.join(format!("metrics_{index:03}.csv"));
    let mut writer = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_metrics_header(&mut writer)?;
    Ok(writer)
}

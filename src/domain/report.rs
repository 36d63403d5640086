//! Texts sent to the operator chat over the course of a broadcast.

use crate::domain::broadcast::{BroadcastTally, ProgressReport};

pub fn usage_text(command: &str) -> String {
    format!("❌ Please provide a message to broadcast.\n\nUsage: {command} <message>")
}

pub fn retrieval_error_text() -> &'static str {
    "❌ Error retrieving recipients"
}

pub fn no_recipients_text() -> &'static str {
    "ℹ️ No recipients found"
}

pub fn starting_text(total: usize) -> String {
    format!("📤 Starting broadcast to {total} recipients...")
}

pub fn progress_text(report: &ProgressReport) -> String {
    format!(
        "📤 Broadcasting progress:\n\
         • Total recipients: {}\n\
         • Sent: {}\n\
         • Failed: {}\n\
         • Progress: {}/{} ({:.1}%)",
        report.total,
        report.sent,
        report.failed,
        report.processed,
        report.total,
        report.percent,
    )
}

pub fn completion_text(tally: &BroadcastTally) -> String {
    format!("✅ Broadcast completed!\n\n{}", results_block(tally))
}

/// Summary for a run stopped between recipients.
pub fn cancelled_text(tally: &BroadcastTally) -> String {
    format!(
        "⚠️ Broadcast cancelled!\n\n{}\n• Processed: {}/{}",
        results_block(tally),
        tally.processed(),
        tally.total(),
    )
}

fn results_block(tally: &BroadcastTally) -> String {
    format!(
        "📊 Results:\n\
         • Total recipients: {}\n\
         • Successfully sent: {}\n\
         • Failed: {}\n\
         • Success rate: {:.1}%",
        tally.total(),
        tally.sent(),
        tally.failed(),
        tally.success_rate().unwrap_or_default(),
    )
}

//! Step and mailbox rendering for text and JSON-lines output.

use crate::cli::Format;
use crate::runner::{MailboxReport, Outcome, StepReport};

pub fn print_step(format: Format, report: &StepReport) {
    match format {
        Format::Json => print_json(report),
        Format::Text => println!("{}", step_line(report)),
    }
}

pub fn print_mailboxes(format: Format, mailboxes: &[MailboxReport]) {
    match format {
        Format::Json => {
            for mailbox in mailboxes {
                print_json(mailbox);
            }
        }
        Format::Text => {
            println!();
            println!("Mailboxes:");
            for mailbox in mailboxes {
                for line in mailbox_lines(mailbox) {
                    println!("{}", line);
                }
            }
        }
    }
}

fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{}", line),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}

fn step_line(report: &StepReport) -> String {
    match &report.outcome {
        Outcome::Ok { summary, .. } => {
            format!("{:>3}. {:<14} ok        {}", report.step, report.op, summary)
        }
        Outcome::ExpectedError { kind, message } => format!(
            "{:>3}. {:<14} expected  {} ({})",
            report.step, report.op, kind, message
        ),
    }
}

fn mailbox_lines(mailbox: &MailboxReport) -> Vec<String> {
    let mut lines = vec![format!(
        "  {} ({}): {} notification(s), {} unread",
        mailbox.member,
        mailbox.name,
        mailbox.notifications.len(),
        mailbox.unread
    )];
    for n in &mailbox.notifications {
        let marker = if n.read { ' ' } else { '*' };
        lines.push(format!("    {} [{}] {}: {}", marker, n.kind, n.title, n.message));
    }
    lines
}

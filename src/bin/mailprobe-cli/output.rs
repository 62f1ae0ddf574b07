use anyhow::Result;
#[cfg(not(feature = "with-serde"))]
use anyhow::bail;

use mailprobe::{MxStatus, NormalizedEmail, VerificationResult};

use crate::args::Format;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
struct VerifyPayload<'a> {
    email: &'a str,
    #[cfg_attr(feature = "with-serde", serde(flatten))]
    result: &'a VerificationResult,
}

#[cfg(feature = "with-serde")]
fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn print_json<T>(_value: &T) -> Result<()> {
    bail!("--format json requires the 'with-serde' feature");
}

pub fn normalized(row: &NormalizedEmail, format: Format) -> Result<()> {
    match format {
        Format::Human => {
            if row.valid {
                println!("[OK]      {}", row.original);
            } else {
                println!("[INVALID] {} :: {}", row.original, row.reasons.join("; "));
            }
            Ok(())
        }
        Format::Json => print_json(row),
    }
}

pub fn mx(domain: &str, status: &MxStatus, format: Format) -> Result<()> {
    match format {
        Format::Human => {
            match status {
                MxStatus::Records(records) => {
                    println!("MX records for {domain}:");
                    for record in records {
                        println!("  {:>5} {}", record.priority, record.host);
                    }
                }
                MxStatus::NoRecords => println!("{domain}: no MX records"),
            }
            Ok(())
        }
        Format::Json => print_json(status),
    }
}

pub fn verification(email: &str, result: &VerificationResult, format: Format) -> Result<()> {
    match format {
        Format::Human => {
            print_human(email, result);
            Ok(())
        }
        Format::Json => print_json(&VerifyPayload { email, result }),
    }
}

fn print_human(email: &str, result: &VerificationResult) {
    let valid = match result.valid {
        Some(true) => "yes",
        Some(false) => "no",
        None => "unknown",
    };
    println!("{email}: {} (valid: {valid})", result.status);
    if let Some(host) = &result.smtp_host_tried {
        println!("Host:    {host}");
    }
    if let Some(code) = result.smtp_code {
        println!(
            "Reply:   {code} {}",
            result.smtp_message.as_deref().unwrap_or_default()
        );
    }
    if let Some(reason) = &result.reason {
        println!("Reason:  {reason}");
    }
    for attempt in &result.attempts {
        println!(
            "[{}] {} -> {}",
            attempt.priority, attempt.host, attempt.outcome.classification
        );
        for event in &attempt.outcome.transcript {
            println!("    {event}");
        }
    }
}

//! Operator command handlers.
//!
//! Exit codes: 0 success (including an idempotent re-ban), 1 operational
//! failure, 3 when the named target is not in the state the command
//! expects. Usage errors exit 2 via clap before any of this runs.

use std::net::IpAddr;
use std::process::ExitCode;
use warden_dns_domain::{
    BlockOutcome, Config, DeleteOutcome, SortField, SourceRecord, UnblockOutcome,
};

use crate::di::UseCases;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NO_TARGET: u8 = 3;

async fn open_use_cases(config: &Config) -> Result<UseCases, ExitCode> {
    match UseCases::init(config).await {
        Ok(use_cases) => Ok(use_cases),
        Err(e) => {
            eprintln!("Failed to open reputation database: {e}");
            Err(ExitCode::from(EXIT_FAILURE))
        }
    }
}

pub async fn ban(config: &Config, ip: IpAddr, reason_words: Vec<String>) -> ExitCode {
    let use_cases = match open_use_cases(config).await {
        Ok(u) => u,
        Err(code) => return code,
    };

    let reason = if reason_words.is_empty() {
        None
    } else {
        Some(reason_words.join(" "))
    };

    match use_cases.block.execute(ip, reason.clone()).await {
        Ok(BlockOutcome::Blocked) => {
            match reason {
                Some(reason) => println!("Blocked {ip} (reason: {reason})"),
                None => println!("Blocked {ip}"),
            }
            ExitCode::SUCCESS
        }
        Ok(BlockOutcome::AlreadyBlocked { reason }) => {
            println!(
                "{ip} is already blocked (reason: {})",
                reason.as_deref().unwrap_or("-")
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to block {ip}: {e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

pub async fn unban(config: &Config, ip: IpAddr) -> ExitCode {
    let use_cases = match open_use_cases(config).await {
        Ok(u) => u,
        Err(code) => return code,
    };

    match use_cases.unblock.execute(ip).await {
        Ok(UnblockOutcome::Unblocked { previous_reason }) => {
            println!(
                "Unblocked {ip} (was: {})",
                previous_reason.as_deref().unwrap_or("-")
            );
            ExitCode::SUCCESS
        }
        Ok(UnblockOutcome::NotBlocked) => {
            println!("{ip} is not blocked");
            ExitCode::from(EXIT_NO_TARGET)
        }
        Err(e) => {
            eprintln!("Failed to unblock {ip}: {e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

pub async fn delete(config: &Config, ip: IpAddr) -> ExitCode {
    let use_cases = match open_use_cases(config).await {
        Ok(u) => u,
        Err(code) => return code,
    };

    match use_cases.delete.execute(ip).await {
        Ok(DeleteOutcome::Deleted { memo }) => {
            println!("Deleted {ip} (memo: {})", memo.as_deref().unwrap_or("-"));
            ExitCode::SUCCESS
        }
        Ok(DeleteOutcome::NotFound) => {
            println!("No record for {ip}");
            ExitCode::from(EXIT_NO_TARGET)
        }
        Err(e) => {
            eprintln!("Failed to delete {ip}: {e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

pub async fn show(config: &Config, ip: IpAddr) -> ExitCode {
    let use_cases = match open_use_cases(config).await {
        Ok(u) => u,
        Err(code) => return code,
    };

    match use_cases.get.execute(ip).await {
        Ok(Some(record)) => {
            println!("{}", format_record(&record));
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("No record for {ip}");
            ExitCode::from(EXIT_NO_TARGET)
        }
        Err(e) => {
            eprintln!("Failed to look up {ip}: {e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

pub async fn recent(config: &Config, field: SortField, limit: u32) -> ExitCode {
    let use_cases = match open_use_cases(config).await {
        Ok(u) => u,
        Err(code) => return code,
    };

    match use_cases.recent.execute(field, limit).await {
        Ok(records) => {
            for record in &records {
                println!("{}", format_record(record));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to list records: {e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Ensure the config file exists, then hand it to the operator's editor.
pub fn edit_config(path_override: Option<&str>, config: &Config) -> ExitCode {
    let path = path_override
        .map(str::to_string)
        .or_else(Config::config_path)
        .unwrap_or_else(|| "/etc/warden-dns/config.toml".to_string());

    if !std::path::Path::new(&path).exists() {
        if let Err(e) = config.save(&path) {
            eprintln!("Failed to create {path}: {e}");
            return ExitCode::from(EXIT_FAILURE);
        }
        println!("Created {path}");
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());
    match std::process::Command::new(&editor).arg(&path).status() {
        Ok(status) if status.success() => ExitCode::SUCCESS,
        Ok(status) => {
            eprintln!("{editor} exited with {status}");
            ExitCode::from(EXIT_FAILURE)
        }
        Err(e) => {
            eprintln!("Failed to launch {editor}: {e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn format_record(record: &SourceRecord) -> String {
    format!(
        "id: {}, ip: {}, memo: {}, server: {}, hits: {}, last seen: {}, blocked: {}",
        record.id.unwrap_or(0),
        record.ip,
        record.memo.as_deref().unwrap_or("-"),
        record.server.as_deref().unwrap_or("-"),
        record.hit_count,
        record
            .last_seen_local()
            .or_else(|| record.last_seen.clone())
            .unwrap_or_else(|| "-".to_string()),
        if record.blocked { "yes" } else { "no" },
    )
}

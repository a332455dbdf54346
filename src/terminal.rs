use std::io::{self, Write};

use crossterm::style::Stylize;

use crate::errors::{Phase, VerifyProgress};
use crate::playlist::ChannelEntry;
use crate::probe::ProbeOutcome;
use crate::reconcile::{CurateCommand, Decider, Notice, RepairChoice};

pub fn banner() {
    let line = "=".repeat(70);
    println!("{}", line.as_str().cyan().bold());
    println!("{}", "      M3U Playlist Validator, Repairer & Editor".cyan().bold());
    println!("{}", line.as_str().cyan().bold());
    println!("\nThis tool verifies, repairs and lets you edit your M3U playlist.\n");
}

pub fn phase_banner(phase: Phase) {
    println!("\n{}", format!("--- {} ---", phase).cyan().bold());
}

pub fn verify_line(progress: &VerifyProgress, outcome: ProbeOutcome) {
    let verdict = if outcome.is_ok() {
        "OK".green()
    } else {
        "FAILED".red()
    };
    println!("{} {}", progress.to_message(), verdict);
}

fn read_line() -> String {
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().read_line(&mut line);
    line.trim().to_string()
}

/// Ask a yes/no question; anything but y/yes is a no.
pub fn confirm(question: &str) -> bool {
    print!("{} (y/n): ", question);
    matches!(read_line().to_lowercase().as_str(), "y" | "yes")
}

/// Prompt for a value, offering the remembered one as the default.
pub fn prompt_with_default(question: &str, default: Option<&str>) -> String {
    match default {
        Some(value) if !value.is_empty() => {
            print!("{} [{}]:\n> ", question, value.dark_grey());
            let answer = read_line();
            if answer.is_empty() {
                value.to_string()
            } else {
                answer
            }
        }
        _ => {
            print!("{}:\n> ", question);
            read_line()
        }
    }
}

/// Let the operator narrow the donor pool to some of its groups.
/// Empty or malformed input selects everything, matching the repair
/// tool's "bad selection searches all channels" behavior.
pub fn choose_search_groups(groups: &[String]) -> Vec<String> {
    println!("\n{}", "--- Donor groups to search ---".cyan());
    for (i, group) in groups.iter().enumerate() {
        println!("  [{}] {}", i + 1, group);
    }
    print!("\nGroup numbers to search, comma-separated (Enter for all):\n> ");
    let answer = read_line();
    if answer.is_empty() {
        return groups.to_vec();
    }
    let mut selected = Vec::new();
    for token in answer.split(',') {
        match token.trim().parse::<usize>() {
            Ok(n) if n >= 1 && n <= groups.len() => selected.push(groups[n - 1].clone()),
            _ => {
                println!("{}", "Bad selection, searching all groups.".red());
                return groups.to_vec();
            }
        }
    }
    selected
}

/// Interactive decision collaborator over stdin/stdout. Malformed input is
/// reported and re-prompted here; the driver only ever sees well-formed
/// decisions.
#[derive(Debug, Default)]
pub struct TerminalDecider;

impl Decider for TerminalDecider {
    fn choose_replacement(
        &mut self,
        target: &ChannelEntry,
        candidates: &[&ChannelEntry],
    ) -> RepairChoice {
        println!(
            "\n{} {}",
            "--- Repairing channel:".cyan(),
            target.name.as_str().bold()
        );
        for (i, candidate) in candidates.iter().enumerate() {
            println!("  [{}] {} ({})", i + 1, candidate.name, candidate.group);
        }
        loop {
            print!("\nPick a number to test, 'm' for more candidates, 's' to skip:\n> ");
            let answer = read_line().to_lowercase();
            match answer.as_str() {
                "m" => return RepairChoice::More,
                "s" => return RepairChoice::Skip,
                _ => match answer.parse::<usize>() {
                    Ok(n) if n >= 1 && n <= candidates.len() => {
                        return RepairChoice::Select(n - 1)
                    }
                    _ => println!("{}", "Invalid option.".red()),
                },
            }
        }
    }

    fn choose_group(&mut self, groups: &[String]) -> Option<usize> {
        println!("\n{}", "--- Pick a group to browse ---".cyan());
        for (i, group) in groups.iter().enumerate() {
            println!("  [{}] {}", i + 1, group);
        }
        loop {
            print!("\nGroup number (0 to finish):\n> ");
            match read_line().parse::<usize>() {
                Ok(0) => return None,
                Ok(n) if n <= groups.len() => return Some(n - 1),
                _ => println!("{}", "Invalid selection.".red()),
            }
        }
    }

    fn choose_additions(&mut self, entries: &[&ChannelEntry]) -> Vec<usize> {
        for (i, entry) in entries.iter().enumerate() {
            println!("  [{}] {}", i + 1, entry.name);
        }
        loop {
            print!("\nChannel numbers to add, comma-separated (Enter for none):\n> ");
            let answer = read_line();
            if answer.is_empty() {
                return Vec::new();
            }
            let parsed: Option<Vec<usize>> = answer
                .split(',')
                .map(|tok| match tok.trim().parse::<usize>() {
                    Ok(n) if n >= 1 && n <= entries.len() => Some(n - 1),
                    _ => None,
                })
                .collect();
            match parsed {
                Some(picks) => return picks,
                None => println!("{}", "Invalid selection.".red()),
            }
        }
    }

    fn curate(&mut self, entries: &[ChannelEntry]) -> CurateCommand {
        println!("\n{}", "--- Playlist editor ---".cyan());
        println!("Commands: [l]ist, [m]ove <from> <to>, [d]elete <n>, [g] save and exit");
        loop {
            print!("> ");
            let input = read_line().to_lowercase();
            let parts: Vec<&str> = input.split_whitespace().collect();
            match parts.as_slice() {
                ["l"] => {
                    for (i, entry) in entries.iter().enumerate() {
                        println!("  [{}] {}", i + 1, entry.name);
                    }
                    return CurateCommand::List;
                }
                ["m", from, to] => match (from.parse(), to.parse()) {
                    (Ok(from), Ok(to)) => return CurateCommand::Move(from, to),
                    _ => println!("{}", "Bad numbers, check them and retry.".red()),
                },
                ["d", pos] => match pos.parse() {
                    Ok(pos) => return CurateCommand::Delete(pos),
                    Err(_) => println!("{}", "Bad number.".red()),
                },
                ["g"] | ["done"] => {
                    println!("{}", "Order saved.".green());
                    return CurateCommand::Done;
                }
                [] => continue,
                _ => println!("{}", "Unknown command.".red()),
            }
        }
    }

    fn notify(&mut self, note: Notice<'_>) {
        match note {
            Notice::CandidateLive(c) => {
                println!("{} '{}'", "Works! Channel repaired with".green(), c.name)
            }
            Notice::CandidateDead(c) => {
                println!("{} '{}'", "This link failed too:".red(), c.name)
            }
            Notice::NoCandidatesLeft => {
                println!("{}", "No more possible replacements found.".red())
            }
            Notice::Added(c) => println!("{} {}", "Added:".green(), c.name),
            Notice::AlreadyPresent(c) => println!("{} {}", "Already present:".yellow(), c.name),
            Notice::Moved { name, to } => {
                println!("{}", format!("Moved '{}' to position {}", name, to).as_str().green())
            }
            Notice::Deleted { name } => println!("{} {}", "Deleted:".red(), name),
            Notice::BadPosition => println!("{}", "Position out of range.".red()),
        }
    }
}

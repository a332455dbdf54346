use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use revive_iptv_lib::config::RunConfig;
use revive_iptv_lib::errors::{Phase, ReviveError, VerifyProgress};
use revive_iptv_lib::matcher::Ranker;
use revive_iptv_lib::playlist::{self, ChannelEntry};
use revive_iptv_lib::probe::{fetch_playlist, HttpProber};
use revive_iptv_lib::reconcile::Reconciler;
use revive_iptv_lib::terminal::{self, TerminalDecider};

#[derive(Parser, Debug)]
#[command(version, about = "Verify, repair and curate M3U playlists", long_about = None)]
struct Args {
    /// URL of the playlist to verify (prompted for if omitted)
    #[arg(short, long)]
    playlist: Option<String>,

    /// Donor playlist URL to draw replacement channels from
    #[arg(short, long)]
    donor: Option<String>,

    /// Where to write the final playlist
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Per-probe timeout in seconds
    #[arg(long, default_value_t = 8)]
    timeout: u64,

    /// How many probes run in parallel during verification
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// Normalize channel names (case, quality tags) before ranking
    #[arg(long)]
    normalize: bool,

    /// Non-interactive: verify and save, skipping the optional phases
    #[arg(short = 'y', long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    let mut config = RunConfig::load().unwrap_or_default();

    if !args.yes {
        terminal::banner();
    }

    let playlist_url = match &args.playlist {
        Some(url) => url.clone(),
        None if args.yes => anyhow::bail!("--yes requires --playlist"),
        None => terminal::prompt_with_default(
            "Enter the URL of your M3U playlist",
            config.playlist_url.as_deref(),
        ),
    };
    config.remember_playlist(&playlist_url);

    let prober = HttpProber::new(Duration::from_secs(args.timeout));
    let text = fetch_playlist(prober.client(), &playlist_url).await?;
    let entries = playlist::parse(&text);
    if entries.is_empty() {
        return Err(ReviveError::EmptyPlaylist(playlist_url).into());
    }
    println!("Found {} channels.", entries.len());

    let mut rec = Reconciler::new(entries);
    let mut decider = TerminalDecider;

    // Phase 1: probe everything, report in playlist order.
    terminal::phase_banner(Phase::Verifying);
    let total = rec.entries().len();
    rec.verify(&prober, args.concurrency, |i, entry, outcome| {
        terminal::verify_line(&VerifyProgress::new(i + 1, total, &entry.name), outcome);
    })
    .await;

    if rec.failed().is_empty() {
        println!("\nAll channels are up.");
    } else {
        println!("\n{} channels failed:", rec.failed().len());
        for &i in rec.failed() {
            println!("  - {}", rec.entries()[i].name);
        }
    }

    // Phase 2: interactive repair against a donor playlist.
    let mut donor_pool: Vec<ChannelEntry> = Vec::new();
    if !rec.failed().is_empty() && !args.yes && terminal::confirm("\nStart interactive repair?") {
        terminal::phase_banner(Phase::Repairing);
        let donor_url = match &args.donor {
            Some(url) => url.clone(),
            None => terminal::prompt_with_default(
                "Enter the URL of the donor M3U playlist",
                config.donor_url.as_deref(),
            ),
        };
        config.remember_donor(&donor_url);

        match fetch_playlist(prober.client(), &donor_url).await {
            Ok(donor_text) => {
                donor_pool = playlist::parse(&donor_text);
                println!("Donor playlist has {} channels.", donor_pool.len());
                let groups = playlist::group_titles(&donor_pool);
                let selected = terminal::choose_search_groups(&groups);
                let search_pool: Vec<ChannelEntry> = donor_pool
                    .iter()
                    .filter(|c| selected.contains(&c.group))
                    .cloned()
                    .collect();

                let ranker = Ranker::new(args.normalize);
                let repaired = rec.repair(&search_pool, &ranker, &prober, &mut decider).await;
                println!(
                    "\nRepaired {} of {} failed channels.",
                    repaired,
                    rec.failed().len()
                );
            }
            // A failed donor fetch only cancels repair; the verified
            // playlist is still worth saving.
            Err(e) => println!("Could not load donor playlist: {}", e),
        }
    }

    // Phase 3: append donor channels by group.
    if !donor_pool.is_empty()
        && !args.yes
        && terminal::confirm("\nAdd new channels from the donor playlist?")
    {
        terminal::phase_banner(Phase::Extending);
        rec.extend(&donor_pool, &mut decider);
    }

    // Phase 4: reorder / delete.
    if !args.yes
        && terminal::confirm(&format!(
            "\nOrganize the final playlist ({} channels)?",
            rec.entries().len()
        ))
    {
        terminal::phase_banner(Phase::Organizing);
        rec.organize(&mut decider);
    }

    // Phase 5: save.
    if args.yes
        || terminal::confirm(&format!(
            "\nSave the final playlist ({} channels)?",
            rec.entries().len()
        ))
    {
        terminal::phase_banner(Phase::Saving);
        let default_output = args
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .or_else(|| config.output_path.clone())
            .unwrap_or_else(|| derived_output_name(&playlist_url));
        let output = if args.yes {
            default_output
        } else {
            terminal::prompt_with_default("Output file", Some(&default_output))
        };
        config.remember_output(&output);

        let final_text = rec.render();
        std::fs::write(&output, &final_text).map_err(|source| ReviveError::WriteFailed {
            path: output.clone(),
            source,
        })?;
        println!(
            "Saved {} channels to {} ({} repaired, {} still dead).",
            rec.entries().len(),
            output,
            rec.repaired_count(),
            rec.unrepaired_count()
        );
    }

    println!("\nDone.");
    Ok(())
}

/// `<basename>_revived.m3u` derived from the source URL, or a timestamped
/// name when the URL has no usable path component.
fn derived_output_name(playlist_url: &str) -> String {
    let basename = playlist_url
        .rsplit('/')
        .next()
        .and_then(|last| last.split('?').next())
        .filter(|name| !name.is_empty());
    match basename {
        Some(name) => {
            let stem = name
                .strip_suffix(".m3u8")
                .or_else(|| name.strip_suffix(".m3u"))
                .unwrap_or(name);
            format!("{}_revived.m3u", stem)
        }
        None => format!("playlist_{}_revived.m3u", chrono::Utc::now().timestamp()),
    }
}

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect, Client};

use revive_iptv_lib::probe::{classify, BROWSER_USER_AGENT};

/// Probe a single stream URL and show what the engine would make of it:
/// the raw response per hop plus the final live/dead classification.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = match std::env::args().nth(1) {
        Some(url) => url,
        None => {
            eprintln!("usage: diagnose_url <stream-url>");
            std::process::exit(2);
        }
    };
    println!("Diagnosing stream URL: {}", url);

    // First pass without following redirects, to see the chain itself.
    let client = Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .timeout(Duration::from_secs(10))
        .redirect(redirect::Policy::none())
        .build()?;

    match client.get(&url).send().await {
        Ok(resp) => {
            println!("Status: {}", resp.status());
            println!("Headers:");
            for (k, v) in resp.headers() {
                println!("  {}: {:?}", k, v);
            }
            if resp.status().is_redirection() {
                if let Some(loc) = resp.headers().get("location").and_then(|l| l.to_str().ok()) {
                    println!("-> Redirects to: {}", loc);
                }
            }
        }
        Err(e) => println!("Request failed: {}", e),
    }

    // Second pass the way the verifier sees it: redirects followed.
    let follower = Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .timeout(Duration::from_secs(10))
        .build()?;

    match follower.get(&url).send().await {
        Ok(resp) => {
            let content_type = resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let outcome = classify(resp.status().as_u16(), content_type.as_deref());
            println!(
                "\nFinal: {} ({}) -> classified {:?}",
                resp.status(),
                content_type.as_deref().unwrap_or("no content-type"),
                outcome
            );
        }
        Err(e) => println!("\nFinal request failed: {} -> classified Failed", e),
    }

    Ok(())
}

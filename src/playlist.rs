use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Group label used when an #EXTINF line carries no group-title attribute.
pub const UNGROUPED: &str = "Ungrouped";

/// Header line emitted at the top of every serialized playlist.
pub const M3U_HEADER: &str = "#EXTM3U";

/// Liveness classification of a channel entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EntryStatus {
    #[default]
    Untested,
    Ok,
    Failed,
}

/// One channel of a playlist: the #EXTINF descriptor line plus its URL.
///
/// `raw_extinf` is the descriptor line exactly as it appeared in the input.
/// It is never regenerated from the parsed fields, so unknown attributes
/// survive a parse/serialize round trip byte for byte.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub tvg_id: String,
    pub group: String,
    pub name: String,
    pub url: String,
    pub raw_extinf: String,
    #[serde(default)]
    pub status: EntryStatus,
    #[serde(default)]
    pub replacement_url: Option<String>,
}

impl ChannelEntry {
    /// URL that should appear in the final playlist: the verified
    /// replacement when one was accepted, the original otherwise.
    pub fn effective_url(&self) -> &str {
        self.replacement_url.as_deref().unwrap_or(&self.url)
    }
}

// Same shape the reference tooling matches: optional tvg-id and group-title
// in any attribute position, display name after the last comma.
static EXTINF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^#EXTINF:-1(?:.*?tvg-id="([^"]*)")?(?:.*?group-title="([^"]*)")?.*?,(.*)$"#)
        .expect("extinf regex is valid")
});

/// Parse M3U text into channel entries, in file order.
///
/// Lenient by design: a descriptor line whose next non-blank line is not a
/// URL produces no entry at all, and anything else (comments, the #EXTM3U
/// header, stray text) is skipped. A broken block never aborts the parse.
pub fn parse(text: &str) -> Vec<ChannelEntry> {
    let lines: Vec<&str> = text.lines().collect();
    let mut entries = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let line = line.trim();
        if !line.starts_with("#EXTINF") {
            continue;
        }
        let Some(caps) = EXTINF_RE.captures(line) else {
            continue;
        };
        let Some(url_line) = next_url_line(&lines, i + 1) else {
            continue;
        };
        entries.push(ChannelEntry {
            tvg_id: caps.get(1).map(|m| m.as_str()).unwrap_or("").to_string(),
            group: caps
                .get(2)
                .map(|m| m.as_str())
                .filter(|g| !g.is_empty())
                .unwrap_or(UNGROUPED)
                .to_string(),
            name: caps.get(3).map(|m| m.as_str().trim()).unwrap_or("").to_string(),
            url: url_line.to_string(),
            raw_extinf: line.to_string(),
            status: EntryStatus::Untested,
            replacement_url: None,
        });
    }

    entries
}

/// The URL belonging to a descriptor is the first non-blank line after it,
/// and only if that line is an http(s) address.
fn next_url_line<'a>(lines: &[&'a str], from: usize) -> Option<&'a str> {
    for line in lines.iter().skip(from) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        return line.starts_with("http").then_some(line);
    }
    None
}

/// Render entries back to M3U text in the given order.
///
/// Each entry contributes its original descriptor line unchanged, followed
/// by its effective URL. Running the output through `parse` and
/// serializing again yields the identical string.
pub fn serialize(entries: &[ChannelEntry]) -> String {
    let mut out = Vec::with_capacity(entries.len() * 2 + 1);
    out.push(M3U_HEADER);
    for entry in entries {
        out.push(&entry.raw_extinf);
        out.push(entry.effective_url());
    }
    out.join("\n")
}

/// Distinct group titles present in a pool, sorted, deduplicated.
pub fn group_titles(entries: &[ChannelEntry]) -> Vec<String> {
    let mut groups: Vec<String> = entries.iter().map(|e| e.group.clone()).collect();
    groups.sort();
    groups.dedup();
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "#EXTM3U\n#EXTINF:-1 tvg-id=\"news.one\" group-title=\"News\",Channel One\nhttp://example.com/one.ts\n#EXTINF:-1,Bare Channel\nhttp://example.com/bare.m3u8\n";

    #[test]
    fn test_parse_attributes() {
        let entries = parse(SAMPLE);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].tvg_id, "news.one");
        assert_eq!(entries[0].group, "News");
        assert_eq!(entries[0].name, "Channel One");
        assert_eq!(entries[0].url, "http://example.com/one.ts");
    }

    #[test]
    fn test_parse_defaults() {
        let entries = parse(SAMPLE);
        assert_eq!(entries[1].tvg_id, "");
        assert_eq!(entries[1].group, UNGROUPED);
        assert_eq!(entries[1].name, "Bare Channel");
    }

    #[test]
    fn test_descriptor_without_url_is_dropped() {
        let text = "#EXTINF:-1,Orphan\n#EXTINF:-1,Paired\nhttp://example.com/ok.ts\n";
        let entries = parse(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Paired");
    }

    #[test]
    fn test_blank_line_between_descriptor_and_url() {
        let text = "#EXTINF:-1,Gapped\n\nhttp://example.com/gap.ts\n";
        let entries = parse(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "http://example.com/gap.ts");
    }

    #[test]
    fn test_unknown_attributes_survive_round_trip() {
        let text = "#EXTINF:-1 tvg-logo=\"http://logo\" group-title=\"Kids\",Cartoons\nhttp://example.com/kids.ts";
        let entries = parse(text);
        let out = serialize(&entries);
        assert!(out.contains("tvg-logo=\"http://logo\""));
        assert_eq!(out, format!("{}\n{}", M3U_HEADER, text));
    }

    #[test]
    fn test_serialize_parse_fixed_point() {
        let once = serialize(&parse(SAMPLE));
        let twice = serialize(&parse(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_duplicates_preserved() {
        let text = "#EXTINF:-1,Dup\nhttp://example.com/dup.ts\n#EXTINF:-1,Dup\nhttp://example.com/dup.ts\n";
        let entries = parse(text);
        assert_eq!(entries.len(), 2);
        let out = serialize(&entries);
        assert_eq!(out.matches("http://example.com/dup.ts").count(), 2);
    }

    #[test]
    fn test_replacement_url_substituted() {
        let mut entries = parse(SAMPLE);
        entries[0].replacement_url = Some("http://mirror.example/one.ts".to_string());
        let out = serialize(&entries);
        assert!(out.contains("http://mirror.example/one.ts"));
        assert!(!out.contains("http://example.com/one.ts"));
    }

    #[test]
    fn test_group_titles_sorted_unique() {
        let text = "#EXTINF:-1 group-title=\"B\",One\nhttp://x/1\n#EXTINF:-1 group-title=\"A\",Two\nhttp://x/2\n#EXTINF:-1 group-title=\"B\",Three\nhttp://x/3\n";
        assert_eq!(group_titles(&parse(text)), vec!["A".to_string(), "B".to_string()]);
    }
}
